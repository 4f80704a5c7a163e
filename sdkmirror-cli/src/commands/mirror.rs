//! `mirror`: resolve, confirm and download.

use std::io;
use std::path::PathBuf;

use clap::Args;
use sdkmirror::config::{DEFAULT_BASE_URL, DEFAULT_CONCURRENCY};
use sdkmirror::mirror::{Mirror, MirrorOutcome};
use sdkmirror::MirrorConfig;

use crate::error::CliError;
use crate::ui::{ConsoleConfirmer, TerminalProgress};

#[derive(Debug, Args)]
pub struct MirrorArgs {
    /// Manifest URL to mirror; repeat for several (default: the official repository)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Directory receiving manifests and archives
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Download without asking for confirmation
    #[arg(short = 'q', long)]
    pub silent: bool,

    /// Number of concurrent downloads
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub jobs: usize,

    /// Host that archive paths in the manifests are relative to
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

impl MirrorArgs {
    pub fn to_config(&self) -> Result<MirrorConfig, CliError> {
        if self.jobs == 0 {
            return Err(CliError::Argument("--jobs must be at least 1".to_string()));
        }

        Ok(MirrorConfig::new(self.output_dir.clone())
            .with_manifest_urls(self.urls.iter().cloned())
            .with_base_url(self.base_url.clone())
            .with_concurrency(self.jobs)
            .with_silent(self.silent))
    }
}

pub fn run(args: MirrorArgs) -> Result<(), CliError> {
    let mirror = Mirror::new(args.to_config()?)?;
    let mut progress = TerminalProgress::new(io::stdout());

    match mirror.run(&ConsoleConfirmer, &mut progress)? {
        MirrorOutcome::NothingResolved { failed_manifests } => {
            println!("No archives to mirror ({} manifests failed).", failed_manifests)
        }
        MirrorOutcome::Declined { .. } => println!("Download cancelled."),
        MirrorOutcome::Completed { report, .. } => {
            if report.failure_count() > 0 {
                println!("{} files failed.", report.failure_count());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: MirrorArgs,
    }

    fn parse(argv: &[&str]) -> MirrorArgs {
        let mut full = vec!["mirror"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).to_config().unwrap();
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.manifest_urls.len(), 3);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(!config.silent);
    }

    #[test]
    fn test_explicit_arguments() {
        let config = parse(&[
            "-u",
            "https://example.com/a.xml",
            "--url",
            "https://example.com/b.xml",
            "-o",
            "/srv/sdk",
            "-q",
            "-j",
            "3",
            "--base-url",
            "https://example.com/files",
        ])
        .to_config()
        .unwrap();

        assert_eq!(
            config.manifest_urls,
            vec!["https://example.com/a.xml", "https://example.com/b.xml"]
        );
        assert_eq!(config.output_dir, PathBuf::from("/srv/sdk"));
        assert!(config.silent);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.base_url, "https://example.com/files/");
    }

    #[test]
    fn test_zero_jobs_is_rejected() {
        assert!(matches!(
            parse(&["-j", "0"]).to_config(),
            Err(CliError::Argument(_))
        ));
    }
}
