//! Remote command execution.

use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use tracing::{debug, trace, warn};

use crate::{DeployError, Result};

/// Result of a remote command that was allowed to fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs commands on the target host.
pub trait RemoteShell {
    /// Runs `command` as the login user. Fails on a non-zero exit.
    fn run(&self, command: &str) -> Result<String>;

    /// Runs `command` as root. Fails on a non-zero exit.
    fn sudo(&self, command: &str) -> Result<String>;

    /// Runs `command` as root and reports the outcome instead of failing.
    fn try_sudo(&self, command: &str) -> Result<CommandOutput>;

    /// Writes `contents` to `dest`, owned by root.
    fn upload(&self, contents: &str, dest: &str) -> Result<()>;

    /// Whether `path` exists on the host.
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.try_sudo(&format!("test -e {}", shell_quote(path)))?.success)
    }

    /// Whether the file at `path` contains the exact line `text`.
    fn contains(&self, path: &str, text: &str) -> Result<bool> {
        let command = format!("grep -qxF {} {}", shell_quote(text), shell_quote(path));
        Ok(self.try_sudo(&command)?.success)
    }
}

/// Quotes `value` for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@=,+".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Wraps `command` so it runs under `sudo`, reading the password from stdin.
pub fn sudo_command(command: &str) -> String {
    format!("sudo -S -p '' bash -c {}", shell_quote(command))
}

/// Writes stdin to a private temp file and prints its path.
pub const STAGE_UPLOAD: &str = "umask 077; t=$(mktemp) && cat > \"$t\" && echo \"$t\"";

/// Moves a staged upload into place, owned by root.
pub fn install_staged(staging: &str, dest: &str) -> String {
    format!(
        "mv {} {} && chown root:root {}",
        shell_quote(staging),
        shell_quote(dest),
        shell_quote(dest)
    )
}

/// Shell over the system `ssh` client.
#[derive(Debug, Clone)]
pub struct SshShell {
    target: String,
    sudo_password: Option<String>,
}

impl SshShell {
    /// Creates a shell for `target` (`user@host`).
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            sudo_password: None,
        }
    }

    /// Password fed to `sudo -S`.
    pub fn with_sudo_password(mut self, password: impl Into<String>) -> Self {
        self.sudo_password = Some(password.into());
        self
    }

    /// Check if ssh is available in PATH.
    pub fn is_available() -> bool {
        Command::new("which")
            .arg("ssh")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Arguments passed to `ssh` for `remote_command`.
    pub fn ssh_args(&self, remote_command: &str) -> Vec<String> {
        vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            self.target.clone(),
            remote_command.to_string(),
        ]
    }

    fn exec(&self, remote_command: &str, stdin: Option<&str>) -> Result<Output> {
        trace!(target = %self.target, command = %remote_command, "running remote command");
        let mut child = Command::new("ssh")
            .args(self.ssh_args(remote_command))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut pipe) = child.stdin.take() {
            if let Some(input) = stdin {
                pipe.write_all(input.as_bytes())?;
            }
        }

        let output = child.wait_with_output()?;
        trace!(status = %output.status, "remote command completed");
        Ok(output)
    }

    fn password_line(&self) -> String {
        format!("{}\n", self.sudo_password.as_deref().unwrap_or_default())
    }

    fn checked(command: &str, output: Output) -> Result<String> {
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(DeployError::CommandFailed {
                command: command.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl RemoteShell for SshShell {
    fn run(&self, command: &str) -> Result<String> {
        debug!(command, "run");
        let output = self.exec(command, None)?;
        Self::checked(command, output)
    }

    fn sudo(&self, command: &str) -> Result<String> {
        debug!(command, "sudo");
        let output = self.exec(&sudo_command(command), Some(&self.password_line()))?;
        Self::checked(command, output)
    }

    fn try_sudo(&self, command: &str) -> Result<CommandOutput> {
        let output = self.exec(&sudo_command(command), Some(&self.password_line()))?;
        let result = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };
        if !result.success {
            debug!(command, stderr = %result.stderr, "command failed");
        }
        Ok(result)
    }

    fn upload(&self, contents: &str, dest: &str) -> Result<()> {
        debug!(dest, bytes = contents.len(), "upload");
        let output = self.exec(STAGE_UPLOAD, Some(contents))?;
        let staging = Self::checked(STAGE_UPLOAD, output)?.trim().to_string();
        if staging.is_empty() {
            return Err(DeployError::CommandFailed {
                command: STAGE_UPLOAD.to_string(),
                stderr: "mktemp printed no path".to_string(),
            });
        }
        self.sudo(&install_staged(&staging, dest))?;
        Ok(())
    }
}

/// Shell that records commands instead of running them.
///
/// Existence checks answer from the configured paths and lines, so the
/// same task flow can be previewed with `--dry-run` or asserted in tests.
#[derive(Debug, Default)]
pub struct DryRunShell {
    commands: RefCell<Vec<String>>,
    existing: HashSet<String>,
    lines: HashSet<(String, String)>,
    echo: bool,
}

impl DryRunShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints each command to stdout as it is recorded.
    pub fn echoing(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Marks `path` as present on the host.
    pub fn with_existing(mut self, path: impl Into<String>) -> Self {
        self.existing.insert(path.into());
        self
    }

    /// Marks the file at `path` as containing `line`.
    pub fn with_line(mut self, path: impl Into<String>, line: impl Into<String>) -> Self {
        self.lines.insert((path.into(), line.into()));
        self
    }

    /// Commands recorded so far.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Whether any recorded command contains `fragment`.
    pub fn ran(&self, fragment: &str) -> bool {
        self.commands.borrow().iter().any(|c| c.contains(fragment))
    }

    fn record(&self, entry: String) {
        if self.echo {
            println!("{}", entry);
        }
        self.commands.borrow_mut().push(entry);
    }
}

impl RemoteShell for DryRunShell {
    fn run(&self, command: &str) -> Result<String> {
        self.record(format!("run: {}", command));
        Ok(String::new())
    }

    fn sudo(&self, command: &str) -> Result<String> {
        self.record(format!("sudo: {}", command));
        Ok(String::new())
    }

    fn try_sudo(&self, command: &str) -> Result<CommandOutput> {
        self.record(format!("sudo: {}", command));
        Ok(CommandOutput {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    fn upload(&self, contents: &str, dest: &str) -> Result<()> {
        self.record(format!("upload: {} ({} bytes)", dest, contents.len()));
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.existing.contains(path))
    }

    fn contains(&self, path: &str, text: &str) -> Result<bool> {
        Ok(self.lines.contains(&(path.to_string(), text.to_string())))
    }
}

impl<S: RemoteShell + ?Sized> RemoteShell for &S {
    fn run(&self, command: &str) -> Result<String> {
        (**self).run(command)
    }

    fn sudo(&self, command: &str) -> Result<String> {
        (**self).sudo(command)
    }

    fn try_sudo(&self, command: &str) -> Result<CommandOutput> {
        (**self).try_sudo(command)
    }

    fn upload(&self, contents: &str, dest: &str) -> Result<()> {
        (**self).upload(contents, dest)
    }

    fn exists(&self, path: &str) -> Result<bool> {
        (**self).exists(path)
    }

    fn contains(&self, path: &str, text: &str) -> Result<bool> {
        (**self).contains(path, text)
    }
}

/// Logs a failed optional step and carries on.
pub(crate) fn warn_on_failure(step: &str, output: &CommandOutput) {
    if !output.success {
        warn!(step, stderr = %output.stderr, "step failed, continuing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/var/www/bot"), "/var/www/bot");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("0 */12 * * *"), "'0 */12 * * *'");
    }

    #[test]
    fn test_sudo_command_wraps_in_bash() {
        assert_eq!(
            sudo_command("apt-get update && apt-get upgrade -y"),
            "sudo -S -p '' bash -c 'apt-get update && apt-get upgrade -y'"
        );
    }

    #[test]
    fn test_upload_stages_privately() {
        assert!(STAGE_UPLOAD.starts_with("umask 077;"));
        assert!(STAGE_UPLOAD.contains("t=$(mktemp)"));
        assert!(!STAGE_UPLOAD.contains("/tmp/"));
        assert_eq!(
            install_staged("/tmp/tmp.Ab12", "/var/www/bot.permanent/bot.env"),
            "mv /tmp/tmp.Ab12 /var/www/bot.permanent/bot.env && chown root:root /var/www/bot.permanent/bot.env"
        );
    }

    #[test]
    fn test_ssh_args() {
        let shell = SshShell::new("deploy@example.org");
        let args = shell.ssh_args("uptime");
        assert_eq!(args, vec!["-o", "BatchMode=yes", "deploy@example.org", "uptime"]);
    }

    #[test]
    fn test_dry_run_records_commands() {
        let shell = DryRunShell::new();
        shell.run("whoami").unwrap();
        shell.sudo("systemctl restart nginx").unwrap();
        shell.upload("hello", "/etc/motd").unwrap();

        assert_eq!(
            shell.commands(),
            vec![
                "run: whoami",
                "sudo: systemctl restart nginx",
                "upload: /etc/motd (5 bytes)",
            ]
        );
        assert!(shell.ran("restart nginx"));
        assert!(!shell.ran("reboot"));
    }

    #[test]
    fn test_dry_run_existence() {
        let shell = DryRunShell::new()
            .with_existing("/etc/ssl/certs/dhparam.pem")
            .with_line("/etc/crontab", "job");

        assert!(shell.exists("/etc/ssl/certs/dhparam.pem").unwrap());
        assert!(!shell.exists("/nope").unwrap());
        assert!(shell.contains("/etc/crontab", "job").unwrap());
        assert!(!shell.contains("/etc/crontab", "other").unwrap());
    }
}
