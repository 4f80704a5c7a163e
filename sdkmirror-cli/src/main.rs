//! android-sdk-mirror - command-line interface
//!
//! Thin front end over the `sdkmirror` library: argument parsing, logging
//! setup, the confirmation prompt and the terminal progress display.

mod commands;
mod error;
mod logging;
mod ui;

use clap::{Parser, Subcommand};

use commands::{ListArgs, MirrorArgs, ServeArgs};
use error::CliError;

#[derive(Parser)]
#[command(name = "android-sdk-mirror")]
#[command(author, version, about = "Mirror Android SDK repositories for offline use")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the current archives of every manifest
    Mirror(MirrorArgs),

    /// Resolve manifests and list their current archives without downloading
    List(ListArgs),

    /// Serve a mirror directory over HTTP
    Serve(ServeArgs),
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Mirror(args) => commands::mirror::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Serve(args) => commands::serve::run(args),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", console::style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["android-sdk-mirror", "list", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["android-sdk-mirror"]).is_err());
    }
}
