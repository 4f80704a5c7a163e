//! `serve`: expose a mirror directory over HTTP.

use std::path::PathBuf;

use clap::Args;
use sdkmirror::serve::{local_ipv4, mirror_urls, serve_blocking, DEFAULT_PORT};

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Mirror directory to serve
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

pub fn run(args: ServeArgs) -> Result<(), CliError> {
    let host = local_ipv4()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "localhost".to_string());

    println!("Point your SDK manager at:");
    for url in mirror_urls(&format!("{}:{}", host, args.port)) {
        println!("  {}", url);
    }

    serve_blocking(args.output_dir, args.port)?;
    Ok(())
}
