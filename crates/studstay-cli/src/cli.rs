use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Normalize StudStay listing image references")]
pub struct Args {
    /// Path to KDL storage config
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize a raw `images` field and print one URL per line
    Normalize {
        /// File holding the raw field (JSON or plain text); stdin if omitted
        input: Option<PathBuf>,
    },
    /// Print the images of one listing record or an array of them
    Listing {
        /// JSON file of listing rows; stdin if omitted
        input: Option<PathBuf>,

        /// Only print the feed card image
        #[arg(long)]
        card: bool,
    },
}
