//! Provisioning steps and the tasks built from them.

use serde::Serialize;
use tracing::{debug, info};

use crate::prompt::Prompter;
use crate::settings::{
    DeploySettings, BOT_PORT, DATA_FOLDER, DHPARAM_PATH, LOG_PATH, NGINX_RESTART_JOB,
    SERVICE_NAME, SSL_PARAMS_PATH,
};
use crate::shell::{shell_quote, warn_on_failure, RemoteShell};
use crate::templates::{NginxContext, ServiceContext, Templates};
use crate::{DeployError, Result};

/// Default branch deployed when none is given.
pub const DEFAULT_BRANCH: &str = "master";

/// Variables written to the bot's environment file, in prompt order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvVars {
    #[serde(rename = "DATABASE_URL")]
    pub database_url: Option<String>,
    #[serde(rename = "PAGE_ID")]
    pub page_id: Option<String>,
    #[serde(rename = "ACCESS_TOKEN")]
    pub access_token: Option<String>,
    #[serde(rename = "VERIFY_TOKEN")]
    pub verify_token: Option<String>,
}

impl EnvVars {
    pub const NAMES: [&'static str; 4] = ["DATABASE_URL", "PAGE_ID", "ACCESS_TOKEN", "VERIFY_TOKEN"];

    /// Values already present in the operator's environment.
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            database_url: read("DATABASE_URL"),
            page_id: read("PAGE_ID"),
            access_token: read("ACCESS_TOKEN"),
            verify_token: read("VERIFY_TOKEN"),
        }
    }

    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "DATABASE_URL" => Some(&mut self.database_url),
            "PAGE_ID" => Some(&mut self.page_id),
            "ACCESS_TOKEN" => Some(&mut self.access_token),
            "VERIFY_TOKEN" => Some(&mut self.verify_token),
            _ => None,
        }
    }
}

/// Runs provisioning steps against one host.
pub struct Deployer<'p, S, P: ?Sized> {
    shell: S,
    prompter: &'p mut P,
    settings: DeploySettings,
    templates: Templates,
    env: EnvVars,
}

impl<'p, S: RemoteShell, P: Prompter + ?Sized> Deployer<'p, S, P> {
    pub fn new(shell: S, prompter: &'p mut P, settings: DeploySettings) -> Result<Self> {
        Ok(Self {
            shell,
            prompter,
            settings,
            templates: Templates::new()?,
            env: EnvVars::default(),
        })
    }

    /// Seeds the values offered when prompting for environment variables.
    pub fn with_env(mut self, env: EnvVars) -> Self {
        self.env = env;
        self
    }

    pub fn settings(&self) -> &DeploySettings {
        &self.settings
    }

    pub fn env(&self) -> &EnvVars {
        &self.env
    }

    // ==================== Tasks ====================

    /// Provisions a fresh host and starts the bot.
    pub fn bootstrap(&mut self, branch: &str) -> Result<()> {
        info!(host = %self.settings.host, branch, "bootstrapping");
        let default_domain = self.settings.hostname().to_string();
        let domain = self
            .prompter
            .prompt("Enter your domain name: ", Some(&default_domain))?;
        self.settings.domain_name = Some(domain);

        self.create_permanent_folder()?;
        self.create_log_folder()?;
        self.create_data_folder()?;
        if self.env.database_url.is_none() {
            self.env.database_url = Some(self.settings.database_url());
        }
        self.renew_env_file()?;
        self.install_build_tools()?;
        self.fetch_sources_from_repo(branch)?;
        self.build_release()?;
        self.install_nginx()?;
        self.configure_letsencrypt_if_necessary()?;
        self.add_nginx_reload_crontab_job()?;
        self.configure_nginx_if_necessary()?;
        self.setup_ufw()?;
        self.create_service_file()?;
        self.start_systemctl_service(SERVICE_NAME)?;
        self.start_systemctl_service("nginx")?;
        self.run_setup_scripts()?;
        self.status()?;
        Ok(())
    }

    /// Rebuilds `branch` and restarts the service.
    pub fn deploy(&mut self, branch: &str) -> Result<()> {
        let update_toolchain = self.prompter.confirm("Update Rust toolchain?", false)?;
        info!(branch, "deploying");

        self.fetch_sources_from_repo(branch)?;
        if update_toolchain {
            self.shell
                .run(&format!("{} update stable", self.settings.toolchain_bin("rustup")))?;
        }
        self.build_release()?;
        self.start_systemctl_service(SERVICE_NAME)?;
        self.start_systemctl_service("nginx")?;
        self.status()?;
        Ok(())
    }

    /// Prints the systemd status of the bot.
    pub fn status(&mut self) -> Result<()> {
        let output = self
            .shell
            .try_sudo(&format!("systemctl status --no-pager {}", SERVICE_NAME))?;
        println!("{}", output.stdout);
        if !output.success {
            println!("{}", output.stderr);
        }
        Ok(())
    }

    /// Replaces the database with the example schedule.
    pub fn reset_db(&mut self) -> Result<()> {
        self.shell.sudo(&format!("systemctl stop {}", SERVICE_NAME))?;
        self.shell
            .sudo(&format!("rm -f {}", shell_quote(&self.settings.database_path())))?;
        if self.env.database_url.is_none() {
            self.env.database_url = Some(self.settings.database_url());
        }
        self.fill_database_with_example_data()?;
        self.shell.sudo(&format!("systemctl start {}", SERVICE_NAME))?;
        Ok(())
    }

    /// Re-prompts for the environment and rewrites the env file.
    pub fn renew_env(&mut self) -> Result<()> {
        if self.env.database_url.is_none() {
            self.env.database_url = Some(self.settings.database_url());
        }
        self.renew_env_file()?;
        self.shell.sudo(&format!("systemctl restart {}", SERVICE_NAME))?;
        Ok(())
    }

    // ==================== Steps ====================

    pub fn create_permanent_folder(&mut self) -> Result<()> {
        self.shell
            .sudo(&format!("mkdir -p {}", shell_quote(&self.settings.permanent_folder())))?;
        Ok(())
    }

    pub fn create_log_folder(&mut self) -> Result<()> {
        self.shell.sudo(&format!("mkdir -m 777 -p {}", LOG_PATH))?;
        Ok(())
    }

    /// Data folder for the SQLite database, owned by the service user.
    pub fn create_data_folder(&mut self) -> Result<()> {
        self.shell.sudo(&format!(
            "mkdir -p {} && chown {} {}",
            DATA_FOLDER,
            shell_quote(self.settings.user()),
            DATA_FOLDER
        ))?;
        Ok(())
    }

    /// Asks for every environment variable that is unset, or set and the
    /// operator wants to change.
    pub fn prompt_for_environment_variables(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            let current = self.env.slot(name).and_then(|slot| slot.clone());
            let change = match current {
                None => true,
                Some(_) => self
                    .prompter
                    .confirm(&format!("{} is set. Change it?", name), false)?,
            };
            if change {
                let value = self.prompter.prompt(&format!("Enter {}: ", name), None)?;
                if let Some(slot) = self.env.slot(name) {
                    *slot = Some(value);
                }
            }
        }
        Ok(())
    }

    /// Renders the env file into the permanent folder.
    pub fn renew_env_file(&mut self) -> Result<()> {
        self.prompt_for_environment_variables(&EnvVars::NAMES)?;

        let mut context = serde_json::to_value(&self.env)
            .map_err(|e| DeployError::Template(format!("cannot serialize environment: {}", e)))?;
        if let Some(map) = context.as_object_mut() {
            map.insert("bot_host".into(), "127.0.0.1".into());
            map.insert("bot_port".into(), BOT_PORT.into());
            map.insert("rust_log".into(), "meetup_bot=info,tower_http=warn".into());
        }
        let rendered = self.templates.bot_env(&context)?;
        let dest = self.settings.env_file_path();
        self.shell.upload(&rendered, &dest)?;
        self.shell.sudo(&format!("chmod 600 {}", shell_quote(&dest)))?;
        info!(path = %dest, "environment file written");
        Ok(())
    }

    pub fn install_build_tools(&mut self) -> Result<()> {
        self.shell.sudo("apt-get update")?;
        self.shell
            .sudo("apt-get install -y build-essential pkg-config git curl")?;
        if self.shell.exists(&self.settings.cargo_path())? {
            println!("Rust toolchain found, skipping rustup install");
            return Ok(());
        }
        self.shell.run(
            "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y --profile minimal",
        )?;
        Ok(())
    }

    /// Fresh single-branch clone of the repository.
    pub fn fetch_sources_from_repo(&mut self, branch: &str) -> Result<()> {
        let folder = shell_quote(&self.settings.project_folder);
        if self.shell.exists(&self.settings.project_folder)? {
            println!("Removing the following directory: {}", self.settings.project_folder);
            self.shell.sudo(&format!("rm -rf {}", folder))?;
        }
        self.shell.sudo(&format!(
            "git clone {} {} --branch {} --single-branch",
            shell_quote(&self.settings.repository_url),
            folder,
            shell_quote(branch)
        ))?;
        self.shell
            .sudo(&format!("chown -R {} {}", shell_quote(self.settings.user()), folder))?;
        Ok(())
    }

    pub fn build_release(&mut self) -> Result<()> {
        info!("building release binary");
        self.shell.run(&format!(
            "cd {} && {} build --release -p meetup-bot",
            shell_quote(&self.settings.project_folder),
            self.settings.cargo_path()
        ))?;
        Ok(())
    }

    pub fn install_nginx(&mut self) -> Result<()> {
        self.shell.sudo("apt-get update")?;
        self.shell.sudo("apt-get install -y nginx certbot ufw")?;
        Ok(())
    }

    pub fn create_dhparam_if_necessary(&mut self) -> Result<()> {
        if self.shell.exists(DHPARAM_PATH)? {
            println!("dhparam file exists, skipping this step");
            return Ok(());
        }
        self.shell
            .sudo(&format!("openssl dhparam -out {} 2048", DHPARAM_PATH))?;
        Ok(())
    }

    pub fn create_ssl_params_if_necessary(&mut self) -> Result<()> {
        self.create_dhparam_if_necessary()?;
        if self.shell.exists(SSL_PARAMS_PATH)? {
            println!("Not creating ssl-params.conf, already exists");
            return Ok(());
        }
        let rendered = self.templates.ssl_params(DHPARAM_PATH)?;
        self.shell.sudo("mkdir -p /etc/nginx/snippets")?;
        self.shell.upload(&rendered, SSL_PARAMS_PATH)?;
        Ok(())
    }

    /// Obtains a certificate with certbot unless one is already live.
    pub fn configure_letsencrypt_if_necessary(&mut self) -> Result<()> {
        self.create_ssl_params_if_necessary()?;
        let domain = self.domain_name();
        let folder = self.settings.letsencrypt_folder(&domain);
        println!("Assuming letsencrypt folder is {}", folder);
        if self.shell.exists(&folder)? {
            println!("letsencrypt folder found, skipping letsencrypt setup");
            return Ok(());
        }

        // certbot --standalone needs port 80
        let stop = self.shell.try_sudo("systemctl stop nginx")?;
        warn_on_failure("stop nginx", &stop);
        self.shell.sudo(&format!(
            "certbot certonly --standalone --non-interactive --agree-tos \
             --register-unsafely-without-email -d {}",
            shell_quote(&domain)
        ))?;
        Ok(())
    }

    /// Restarts nginx periodically so renewed certificates are served.
    pub fn add_nginx_reload_crontab_job(&mut self) -> Result<()> {
        if self.shell.contains("/etc/crontab", NGINX_RESTART_JOB)? {
            println!("already added restart job to crontab, won't add again");
            return Ok(());
        }
        self.shell.sudo(&format!(
            "echo {} >> /etc/crontab",
            shell_quote(NGINX_RESTART_JOB)
        ))?;
        Ok(())
    }

    pub fn configure_nginx_if_necessary(&mut self) -> Result<()> {
        let domain = self.domain_name();
        let available = format!("/etc/nginx/sites-available/{}", domain);
        if self.shell.exists(&available)? {
            println!("nginx config found, not creating another one");
        } else {
            let folder = self.settings.letsencrypt_folder(&domain);
            let fullchain = format!("{}/fullchain.pem", folder);
            let privkey = format!("{}/privkey.pem", folder);
            let rendered = self.templates.nginx_site(&NginxContext {
                domain: &domain,
                fullchain_path: &fullchain,
                privkey_path: &privkey,
                ssl_params_path: SSL_PARAMS_PATH,
                log_path: LOG_PATH,
                bot_port: BOT_PORT,
            })?;
            self.shell.upload(&rendered, &available)?;
        }
        let enabled = format!("/etc/nginx/sites-enabled/{}", domain);
        self.shell.sudo(&format!(
            "ln -sf {} {}",
            shell_quote(&available),
            shell_quote(&enabled)
        ))?;
        Ok(())
    }

    pub fn setup_ufw(&mut self) -> Result<()> {
        self.shell.sudo("ufw allow 'Nginx Full'")?;
        self.shell.sudo("ufw allow OpenSSH")?;
        self.shell.sudo("echo y | ufw enable")?;
        Ok(())
    }

    pub fn create_service_file(&mut self) -> Result<()> {
        let env_file = self.settings.env_file_path();
        let binary = self.settings.binary_path();
        let rendered = self.templates.bot_service(&ServiceContext {
            user: self.settings.user(),
            work_dir: &self.settings.project_folder,
            env_file_path: &env_file,
            binary_path: &binary,
            log_path: LOG_PATH,
        })?;
        self.shell.upload(&rendered, &self.settings.service_file_path())?;
        Ok(())
    }

    pub fn start_systemctl_service(&mut self, service: &str) -> Result<()> {
        debug!(service, "restarting service");
        self.shell.sudo("systemctl daemon-reload")?;
        self.shell.sudo(&format!("systemctl enable {}", service))?;
        self.shell.sudo(&format!("systemctl restart {}", service))?;
        Ok(())
    }

    pub fn run_setup_scripts(&mut self) -> Result<()> {
        self.fill_database_with_example_data()?;
        self.set_start_button()
    }

    pub fn fill_database_with_example_data(&mut self) -> Result<()> {
        self.prompt_for_environment_variables(&["DATABASE_URL"])?;
        let vars = [("DATABASE_URL", self.env.database_url.clone())];
        self.run_setup_script("seed", &vars)
    }

    pub fn set_start_button(&mut self) -> Result<()> {
        self.prompt_for_environment_variables(&["ACCESS_TOKEN"])?;
        let vars = [("ACCESS_TOKEN", self.env.access_token.clone())];
        self.run_setup_script("set-start-button", &vars)
    }

    /// Runs a `meetup-bot` subcommand on the host with `vars` exported.
    fn run_setup_script(&mut self, subcommand: &str, vars: &[(&str, Option<String>)]) -> Result<()> {
        let assignments: Vec<String> = vars
            .iter()
            .filter_map(|(name, value)| {
                value
                    .as_deref()
                    .map(|value| format!("{}={}", name, shell_quote(value)))
            })
            .collect();
        self.shell.run(&format!(
            "cd {} && {} {} {}",
            shell_quote(&self.settings.project_folder),
            assignments.join(" "),
            self.settings.binary_path(),
            subcommand
        ))?;
        Ok(())
    }

    fn domain_name(&self) -> String {
        self.settings
            .domain_name
            .clone()
            .unwrap_or_else(|| self.settings.hostname().to_string())
    }
}
