pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pantry-chef")]
#[command(about = "Pantry Chef - recipe recommendations grounded in your recipe collection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the recommendation server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Embed recipes from a JSON file into the recipe collection
    Ingest {
        /// JSON array of {"id", "document", "metadata"} objects
        input: PathBuf,
    },

    /// Print the number of records in the recipe collection
    Count,

    /// Ask a running server for a recommendation
    Recommend {
        /// Ingredients on hand (comma separated)
        #[arg(required = true, value_delimiter = ',')]
        ingredients: Vec<String>,

        /// Dietary or equipment constraints
        #[arg(short, long)]
        constraints: Option<String>,

        /// Server base URL
        #[arg(long, env = "SERVER_URL", default_value = "http://127.0.0.1:8000")]
        server: String,
    },

    /// Show the health of a running server
    Status {
        /// Server base URL
        #[arg(long, env = "SERVER_URL", default_value = "http://127.0.0.1:8000")]
        server: String,
    },
}
