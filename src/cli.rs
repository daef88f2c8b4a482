use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "acbot")]
#[command(author, version, about = "Telegram bot for Aalto Cocktail memberships and events", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Scrape the event list once and print it as JSON
    RefreshEvents,

    /// Print the member list as CSV
    ExportMembers {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
