//! Deployment CLI for the meetup bot.
//!
//! ```bash
//! export MEETUP_DEPLOY_REPO=https://git.example.org/meetup-bot.git
//! meetup-deploy --host deploy@meetup-bot.example bootstrap --branch master
//! meetup-deploy --host deploy@meetup-bot.example --dry-run deploy
//! ```

use clap::{Parser, Subcommand};
use meetup_deploy::{
    DeployError, DeploySettings, Deployer, DryRunShell, EnvVars, Prompter, RemoteShell,
    RustylinePrompter, SshShell, DEFAULT_BRANCH,
};
use tracing_subscriber::EnvFilter;

/// Provision and deploy the meetup bot over SSH
#[derive(Parser, Debug)]
#[command(name = "meetup-deploy")]
#[command(version, about = "Provision and deploy the meetup bot over SSH")]
struct Cli {
    /// Target host as user@host
    #[arg(long, env = "MEETUP_DEPLOY_HOST")]
    host: String,

    /// Git repository holding this workspace
    #[arg(long, env = "MEETUP_DEPLOY_REPO")]
    repo: String,

    /// Print remote commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision a fresh host and start the bot
    Bootstrap {
        #[arg(long, default_value = DEFAULT_BRANCH)]
        branch: String,
    },
    /// Rebuild a branch and restart the bot
    Deploy {
        #[arg(long, default_value = DEFAULT_BRANCH)]
        branch: String,
    },
    /// Show the service status
    Status,
    /// Replace the database with the example schedule
    ResetDb,
    /// Rewrite the bot's environment file
    RenewEnv,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "meetup_deploy=info",
        1 => "meetup_deploy=debug",
        _ => "meetup_deploy=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = DeploySettings::new(&cli.host, &cli.repo);
    let mut prompter = RustylinePrompter::new()?;

    if cli.dry_run {
        let shell = DryRunShell::new().echoing();
        run(&cli.command, &shell, &mut prompter, settings)?;
        return Ok(());
    }

    if !SshShell::is_available() {
        return Err(DeployError::SshNotFound.into());
    }
    let password = prompter.password(&format!("sudo password for {}: ", cli.host))?;
    let shell = SshShell::new(&cli.host).with_sudo_password(password);
    run(&cli.command, &shell, &mut prompter, settings)?;
    Ok(())
}

fn run<S: RemoteShell>(
    command: &Commands,
    shell: S,
    prompter: &mut RustylinePrompter,
    settings: DeploySettings,
) -> meetup_deploy::Result<()> {
    let mut deployer = Deployer::new(shell, prompter, settings)?.with_env(EnvVars::from_env());

    match command {
        Commands::Bootstrap { branch } => deployer.bootstrap(branch),
        Commands::Deploy { branch } => {
            println!("OK, deploying branch {}", branch);
            deployer.deploy(branch)
        }
        Commands::Status => deployer.status(),
        Commands::ResetDb => deployer.reset_db(),
        Commands::RenewEnv => deployer.renew_env(),
    }
}
