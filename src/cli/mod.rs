//! CLI module for Read It

pub mod serve;

use clap::{Parser, Subcommand};

/// Read It - keep track of what you have read
#[derive(Parser)]
#[command(name = "readit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(serve::ServeArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["readit", "serve"]).unwrap();
        let Command::Serve(args) = cli.command;

        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "readit", "serve", "--host", "127.0.0.1", "--port", "8000", "--debug",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command;

        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.port, Some(8000));
        assert!(args.debug);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["readit"]).is_err());
    }
}
