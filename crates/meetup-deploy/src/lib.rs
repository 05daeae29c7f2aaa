//! Remote provisioning for the meetup bot.
//!
//! This crate drives a fresh Ubuntu host into a running bot deployment:
//! - Folders for the build, the environment file, the database and logs
//! - Build tools, the Rust toolchain and a release build of `meetup-bot`
//! - TLS certificates, nginx and the firewall
//! - A systemd unit for the bot
//! - Example data and the Messenger "Get Started" button
//!
//! Every remote command goes through [`RemoteShell`]. [`SshShell`] runs
//! them over `ssh`; [`DryRunShell`] only prints and records them.
//!
//! # Example
//!
//! ```no_run
//! use meetup_deploy::{Deployer, DeploySettings, RustylinePrompter, SshShell};
//!
//! let settings = DeploySettings::new(
//!     "deploy@meetup-bot.example",
//!     "https://git.example.org/meetup-bot.git",
//! );
//! let shell = SshShell::new(&settings.host).with_sudo_password("secret");
//! let mut prompter = RustylinePrompter::new().unwrap();
//!
//! let mut deployer = Deployer::new(&shell, &mut prompter, settings).unwrap();
//! deployer.status().unwrap();
//! ```

pub mod deployer;
pub mod error;
pub mod prompt;
pub mod settings;
pub mod shell;
pub mod templates;

pub use deployer::{Deployer, EnvVars, DEFAULT_BRANCH};
pub use error::{DeployError, Result};
pub use prompt::{Prompter, RustylinePrompter};
#[cfg(any(test, feature = "testing"))]
pub use prompt::ScriptedPrompter;
pub use settings::DeploySettings;
pub use shell::{shell_quote, CommandOutput, DryRunShell, RemoteShell, SshShell};
pub use templates::Templates;
