//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// ReparaYa marketplace backend
#[derive(Parser, Debug)]
#[command(name = "reparaya")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Insert the default service categories
    Seed,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Roll back applied migrations
    Down {
        /// How many migrations to roll back
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        steps: u32,
    },
    /// Show migration status
    Status,
    /// Drop every table and re-run all migrations
    Fresh {
        /// Load the default category tree afterwards
        #[arg(long)]
        seed: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_migrate_status() {
        let cli = Cli::try_parse_from(["reparaya", "migrate", "status"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Status
            })
        ));
    }

    #[test]
    fn test_parse_serve_with_global_verbose() {
        let cli = Cli::try_parse_from(["reparaya", "serve", "--port", "8080", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, 8080),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_migrate_down_steps() {
        let cli = Cli::try_parse_from(["reparaya", "migrate", "down", "--steps", "2"]).unwrap();
        match cli.command {
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Down { steps },
            }) => assert_eq!(steps, 2),
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["reparaya", "migrate", "down", "--steps", "0"]).is_err());
    }

    #[test]
    fn test_parse_seed() {
        let cli = Cli::try_parse_from(["reparaya", "seed"]).unwrap();
        assert!(matches!(cli.command, Commands::Seed));
    }
}
