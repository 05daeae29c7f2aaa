//! Meetup bot binary.
//!
//! Start the webhook server with:
//! ```bash
//! ACCESS_TOKEN=xxx VERIFY_TOKEN=yyy DATABASE_URL=sqlite://bot.db cargo run -p meetup-bot -- serve
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use meetup_bot::config::DEFAULT_START_PAYLOAD;
use meetup_bot::{serve, BotConfig, BotState};
use meetup_messenger::{GraphClient, DEFAULT_GRAPH_URL};
use meetup_store::Database;
use tracing_subscriber::EnvFilter;

/// Messenger bot for the meetup schedule
#[derive(Parser, Debug)]
#[command(name = "meetup-bot")]
#[command(version, about = "Messenger bot for the meetup schedule")]
struct Cli {
    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook server
    Serve {
        /// Address to bind
        #[arg(long, env = "BOT_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(short, long, env = "BOT_PORT", default_value = "8000")]
        port: u16,

        /// Database location (sqlite://<path> or a path)
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,

        /// Page access token for the Send API
        #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,

        /// Token expected during webhook verification
        #[arg(long, env = "VERIFY_TOKEN", hide_env_values = true)]
        verify_token: String,

        /// Only handle entries for this page
        #[arg(long, env = "PAGE_ID")]
        page_id: Option<String>,

        /// Graph API base URL
        #[arg(long, env = "GRAPH_API_URL", default_value = DEFAULT_GRAPH_URL)]
        graph_url: String,
    },

    /// Replace the database contents with the example schedule
    Seed {
        /// Database location (sqlite://<path> or a path)
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },

    /// Configure the Messenger "Get Started" button
    SetStartButton {
        /// Page access token for the Send API
        #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,

        /// Postback payload sent when the button is pressed
        #[arg(long, default_value = DEFAULT_START_PAYLOAD)]
        payload: String,

        /// Graph API base URL
        #[arg(long, env = "GRAPH_API_URL", default_value = DEFAULT_GRAPH_URL)]
        graph_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local overrides first, then .env
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "meetup_bot=info,meetup_messenger=info,meetup_store=warn,tower_http=warn",
        1 => "meetup_bot=debug,meetup_messenger=debug,meetup_store=info,tower_http=info",
        2 => "meetup_bot=trace,meetup_messenger=trace,meetup_store=debug,tower_http=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            database_url,
            access_token,
            verify_token,
            page_id,
            graph_url,
        } => {
            let db = Database::open_url(&database_url)?;
            db.initialize()?;

            let config = BotConfig::new(verify_token)
                .with_bind(host, port)
                .with_page_id(page_id)
                .with_graph_url(graph_url);
            let client = GraphClient::with_base_url(access_token, &config.graph_url)?;

            let state = BotState::new(config.clone(), db, Arc::new(client));
            serve(&config, state).await?;
        }
        Commands::Seed { database_url } => {
            let db = Database::open_url(&database_url)?;
            let count = db.seed_example_data()?;
            println!("Installed {} example talks", count);
        }
        Commands::SetStartButton {
            access_token,
            payload,
            graph_url,
        } => {
            let client = GraphClient::with_base_url(access_token, &graph_url)?;
            client.set_get_started_button(&payload).await?;
            println!("Get Started button set (payload: {})", payload);
        }
    }

    Ok(())
}
