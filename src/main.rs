//! Main entry point for the sbunpack CLI application.
//!
//! Fetches a packaged artifact from the local filesystem or an HTTP URL,
//! runs the format-detection pipeline over it and writes the recovered
//! project out with the extension matching its format.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use sbunpack::{Cli, FetchSource, HttpSource, LocalFileSource};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let artifact = if cli.is_http_url() {
        HttpSource::new(cli.file.clone())?.fetch().await?
    } else {
        LocalFileSource::new(Path::new(&cli.file)).fetch().await?
    };

    let project = sbunpack::unpackage(&artifact)
        .with_context(|| format!("failed to unpackage {}", cli.file))?;

    // Pipe mode: write project bytes directly to stdout
    if cli.pipe {
        use tokio::io::AsyncWriteExt;
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&project.data).await?;
        stdout.flush().await?;
        return Ok(());
    }

    let output_path = output_path(&cli, project.project_type.extension());
    if output_path.exists() && !cli.force {
        if !cli.is_quiet() {
            eprintln!("Skipping: {} (use -f to overwrite)", output_path.display());
        }
        return Ok(());
    }

    tokio::fs::write(&output_path, &project.data).await?;

    if !cli.is_quiet() {
        println!(
            "  recovered: {} ({}, {} bytes)",
            output_path.display(),
            project.project_type,
            project.data.len()
        );
    }

    Ok(())
}

/// Pick the output path: `-o` wins, otherwise the input's stem plus the
/// recovered format's extension.
fn output_path(cli: &Cli, extension: &str) -> PathBuf {
    if let Some(ref output) = cli.output {
        return PathBuf::from(output);
    }

    let stem = if cli.is_http_url() {
        // Last URL path segment, with any extension or query trimmed off
        cli.file
            .rsplit('/')
            .next()
            .and_then(|segment| segment.split(['.', '?']).next())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("project")
            .to_string()
    } else {
        Path::new(&cli.file)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string())
    };
    PathBuf::from(format!("{stem}.{extension}"))
}
