//! Remote paths and names.

/// Source checkout, rebuilt on every deploy. Must not end with '/'.
pub const PROJECT_FOLDER: &str = "/var/www/meetup-facebook-bot";

/// systemd unit name.
pub const SERVICE_NAME: &str = "meetup-facebook-bot.service";

pub const DHPARAM_PATH: &str = "/etc/ssl/certs/dhparam.pem";
pub const SSL_PARAMS_PATH: &str = "/etc/nginx/snippets/ssl-params.conf";
pub const LOG_PATH: &str = "/var/log/meetup-facebook-bot";
pub const DATA_FOLDER: &str = "/var/lib/meetup-facebook-bot";

/// Port the bot listens on behind nginx.
pub const BOT_PORT: u16 = 8000;

/// Job that restarts nginx so renewed certificates are picked up.
pub const NGINX_RESTART_JOB: &str = "0 */12 * * * systemctl restart nginx";

/// Where and what to deploy.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    /// ssh target, `user@host`.
    pub host: String,
    /// Git repository URL.
    pub repository_url: String,
    /// Source checkout folder.
    pub project_folder: String,
    /// Domain served by nginx; asked for during bootstrap.
    pub domain_name: Option<String>,
}

impl DeploySettings {
    /// Settings for `host`, building from `repository_url` with the
    /// default folders.
    pub fn new(host: impl Into<String>, repository_url: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            repository_url: repository_url.into(),
            project_folder: PROJECT_FOLDER.to_string(),
            domain_name: None,
        }
    }

    /// Remote login user (the part before '@', or "root").
    pub fn user(&self) -> &str {
        self.host.split_once('@').map(|(user, _)| user).unwrap_or("root")
    }

    /// Remote host name without the user.
    pub fn hostname(&self) -> &str {
        self.host.split_once('@').map(|(_, host)| host).unwrap_or(&self.host)
    }

    /// Folder that survives redeploys: environment file.
    pub fn permanent_folder(&self) -> String {
        format!("{}.permanent", self.project_folder)
    }

    pub fn env_file_path(&self) -> String {
        format!("{}/meetup-facebook-bot.env", self.permanent_folder())
    }

    pub fn binary_path(&self) -> String {
        format!("{}/target/release/meetup-bot", self.project_folder)
    }

    pub fn database_path(&self) -> String {
        format!("{}/bot.db", DATA_FOLDER)
    }

    pub fn database_url(&self) -> String {
        format!("sqlite://{}", self.database_path())
    }

    pub fn service_file_path(&self) -> String {
        format!("/etc/systemd/system/{}", SERVICE_NAME)
    }

    /// Certificate folder certbot creates for the domain.
    pub fn letsencrypt_folder(&self, domain: &str) -> String {
        format!("/etc/letsencrypt/live/{}", domain)
    }

    /// Remote path of a toolchain binary installed by rustup.
    pub fn toolchain_bin(&self, tool: &str) -> String {
        let home = if self.user() == "root" {
            "/root".to_string()
        } else {
            format!("/home/{}", self.user())
        };
        format!("{}/.cargo/bin/{}", home, tool)
    }

    pub fn cargo_path(&self) -> String {
        self.toolchain_bin("cargo")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO: &str = "https://git.example.org/meetup-bot.git";

    #[test]
    fn test_user_and_hostname() {
        let settings = DeploySettings::new("deploy@meetup-bot.me", REPO);
        assert_eq!(settings.user(), "deploy");
        assert_eq!(settings.hostname(), "meetup-bot.me");

        let bare = DeploySettings::new("meetup-bot.me", REPO);
        assert_eq!(bare.user(), "root");
        assert_eq!(bare.hostname(), "meetup-bot.me");
    }

    #[test]
    fn test_derived_paths() {
        let settings = DeploySettings::new("deploy@example.org", REPO);
        assert_eq!(settings.permanent_folder(), "/var/www/meetup-facebook-bot.permanent");
        assert_eq!(
            settings.env_file_path(),
            "/var/www/meetup-facebook-bot.permanent/meetup-facebook-bot.env"
        );
        assert_eq!(settings.database_url(), "sqlite:///var/lib/meetup-facebook-bot/bot.db");
        assert_eq!(settings.cargo_path(), "/home/deploy/.cargo/bin/cargo");
        assert_eq!(
            settings.letsencrypt_folder("example.org"),
            "/etc/letsencrypt/live/example.org"
        );
    }

    #[test]
    fn test_repository_is_the_one_given() {
        let settings = DeploySettings::new("deploy@example.org", REPO);
        assert_eq!(settings.repository_url, REPO);

        let other = DeploySettings::new("deploy@example.org", "git@example.org:fork/bot.git");
        assert_eq!(other.repository_url, "git@example.org:fork/bot.git");
    }

    #[test]
    fn test_root_cargo_path() {
        assert_eq!(DeploySettings::new("root@h", REPO).cargo_path(), "/root/.cargo/bin/cargo");
    }
}
