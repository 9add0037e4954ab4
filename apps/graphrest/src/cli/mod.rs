//! # graphrest CLI Module
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `status` - Show node and relationship counts
//! - `schema` - Validate the config file and list exposed types
//! - `init` - Initialize a new database
//! - `compact` - Reclaim free space in the database file

mod commands;

use clap::{Parser, Subcommand};
use graphrest::error::AppError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// graphrest - graph nodes and relationships as HTTP resources
#[derive(Parser, Debug)]
#[command(name = "graphrest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file
    #[arg(short = 'c', long, global = true, default_value = "graphrest.toml")]
    pub config: PathBuf,

    /// Path to the graph database
    #[arg(short = 'D', long, global = true, default_value = "graphrest.redb")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Base URI for generated links (overrides the config file)
        #[arg(long)]
        public_base: Option<String>,
    },

    /// Show node and relationship counts
    Status,

    /// Validate the config file and list exposed types
    Schema,

    /// Initialize a new empty database
    Init {
        /// Replace an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// Reclaim free space in the database file
    Compact,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let backend = cli.backend.as_str();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            public_base,
        }) => {
            let overrides = ServerOverrides {
                host,
                port,
                public_base,
            };
            cmd_serve(&cli.config, &cli.database, backend, overrides).await
        }
        Some(Commands::Status) => cmd_status(&cli.database, backend, json_mode),
        Some(Commands::Schema) => cmd_schema(&cli.config, json_mode),
        Some(Commands::Init { force }) => cmd_init(&cli.database, backend, force),
        Some(Commands::Compact) => cmd_compact(&cli.database, backend),
        None => cmd_status(&cli.database, backend, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn serve_overrides_parse() {
        let cli = Cli::parse_from([
            "graphrest",
            "--config",
            "people.toml",
            "serve",
            "--port",
            "4567",
        ]);

        assert_eq!(cli.config, PathBuf::from("people.toml"));
        match cli.command {
            Some(Commands::Serve { host, port, .. }) => {
                assert_eq!(host, None);
                assert_eq!(port, Some(4567));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn defaults_to_redb_backend() {
        let cli = Cli::parse_from(["graphrest", "status"]);

        assert_eq!(cli.backend, "redb");
        assert_eq!(cli.database, PathBuf::from("graphrest.redb"));
        assert!(!cli.json_mode);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["graphrest", "init", "--force", "-B", "memory"]);

        assert_eq!(cli.backend, "memory");
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
    }
}
