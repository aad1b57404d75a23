pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "wellness")]
#[command(about = "Virtual Wellness CLI - staff console for clients and appointments")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Client roster")]
    Clients {
        #[command(subcommand)]
        cmd: commands::clients::ClientCommands,
    },

    #[command(about = "Schedule, list and manage appointments")]
    Appointments {
        #[command(subcommand)]
        cmd: commands::appointments::AppointmentCommands,
    },

    #[command(about = "Summary cards, recent clients and upcoming appointments")]
    Dashboard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Clients { cmd } => commands::clients::handle(cmd, output_format).await,
        Commands::Appointments { cmd } => commands::appointments::handle(cmd, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
    }
}
