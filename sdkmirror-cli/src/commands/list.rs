//! `list`: show what a mirror run would download.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use sdkmirror::config::format_size;
use sdkmirror::manifest::ArtifactDescriptor;
use sdkmirror::mirror::Mirror;
use sdkmirror::summary::PendingSummary;
use sdkmirror::MirrorConfig;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Manifest URL to resolve; repeat for several (default: the official repository)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Mirror directory to compare against
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

pub fn run(args: ListArgs) -> Result<(), CliError> {
    let config = MirrorConfig::new(args.output_dir)
        .with_manifest_urls(args.urls)
        .with_save_manifests(false);
    let mirror = Mirror::new(config)?;

    let resolved = mirror.resolve_all();
    let summary = mirror.summarize(&resolved.artifacts);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_artifacts(&mut out, &resolved.artifacts)?;
    writeln!(out)?;
    print_summary(&mut out, &summary)?;

    for failure in &resolved.failures {
        writeln!(out, "Skipped manifest {}: {}", failure.url, failure.error)?;
    }

    Ok(())
}

fn print_artifacts(out: &mut dyn Write, artifacts: &[ArtifactDescriptor]) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        console::style(format!(
            "{:<32} {:>10} {:>10}  {}",
            "FAMILY", "VERSION", "SIZE", "ARCHIVE"
        ))
        .bold()
    )?;

    for artifact in artifacts {
        let marker = if artifact.is_obsolete() { " (obsolete)" } else { "" };
        writeln!(
            out,
            "{:<32} {:>10} {:>10}  {}{}",
            artifact.family_id(),
            artifact.version().to_string(),
            format_size(artifact.size_bytes()),
            artifact.relative_url(),
            marker
        )?;
    }

    Ok(())
}

fn print_summary(out: &mut dyn Write, summary: &PendingSummary) -> io::Result<()> {
    if summary.is_up_to_date() {
        writeln!(out, "All {} files are present locally.", summary.total)
    } else {
        writeln!(out, "{}.", summary.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmirror::manifest::{ArchiveEntry, FamilyRevision};

    fn artifact(family: &str, url: &str, obsolete: bool) -> ArtifactDescriptor {
        ArtifactDescriptor::new(
            &FamilyRevision {
                family_id: family.to_string(),
                kind: family.to_string(),
                version: "30.03".parse().unwrap(),
                obsolete,
            },
            ArchiveEntry {
                size_bytes: 2048,
                checksum_hex: String::new(),
                relative_url: url.to_string(),
            },
        )
    }

    #[test]
    fn test_print_artifacts() {
        let mut out = Vec::new();
        print_artifacts(
            &mut out,
            &[
                artifact("platform", "platform-30_r03.zip", false),
                artifact("build-tool", "build-tools_r30.0.3-linux.zip", true),
            ],
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("platform "));
        assert!(lines[1].contains("30.03"));
        assert!(lines[1].contains("2.0 KB"));
        assert!(lines[1].ends_with("platform-30_r03.zip"));
        assert!(lines[2].ends_with("build-tools_r30.0.3-linux.zip (obsolete)"));
    }

    #[test]
    fn test_print_summary() {
        let mut out = Vec::new();
        print_summary(
            &mut out,
            &PendingSummary {
                total: 3,
                pending_count: 0,
                pending_bytes: 0,
            },
        )
        .unwrap();
        print_summary(
            &mut out,
            &PendingSummary {
                total: 3,
                pending_count: 1,
                pending_bytes: 1536,
            },
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "All 3 files are present locally.\n1 of 3 files missing locally (1.5 KB to download).\n"
        );
    }
}
