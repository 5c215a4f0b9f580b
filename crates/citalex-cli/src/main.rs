//! Citalex CLI: extract, annotate and preview Italian legal citations.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, bail};
use citalex_core::Context;
use citalex_extract::{annotate, extract};
use citalex_preview::PreviewConfig;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod display;
mod preview;

#[derive(Parser, Debug)]
#[command(name = "citalex")]
#[command(version, about = "Italian legal citation extraction and preview", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the citations found in a document
    Extract {
        /// Input file ('-' for stdin)
        input: String,

        #[command(flatten)]
        context: ContextArgs,

        /// Print matches as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Wrap every citation in a preview marker
    Annotate {
        /// Input file ('-' for stdin)
        input: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Resolve one citation against the article endpoint and print it
    Preview {
        /// Input file ('-' for stdin)
        input: String,

        #[command(flatten)]
        context: ContextArgs,

        /// Base URL of the article endpoint
        #[arg(long, env = "CITALEX_BASE_URL")]
        base_url: String,

        /// Which match to preview (0-based, in document order)
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// JSON file with preview settings (debounce_ms, cache_ttl_ms, ...)
        #[arg(long, env = "CITALEX_PREVIEW_CONFIG")]
        config: Option<PathBuf>,

        /// Override the hover debounce in milliseconds
        #[arg(long, env = "CITALEX_DEBOUNCE_MS")]
        debounce_ms: Option<u64>,

        /// Give up waiting for the article after this many seconds
        #[arg(long, env = "CITALEX_TIMEOUT_SECS", default_value_t = 30)]
        timeout_secs: u64,

        /// Print the resolved state as JSON
        #[arg(long)]
        json: bool,
    },
}

/// The act being read, used to resolve bare "art. N" references.
#[derive(Args, Debug, Default)]
struct ContextArgs {
    /// Act type of the document, e.g. "codice civile" or "d.lgs."
    #[arg(long, env = "CITALEX_ACT_TYPE")]
    act_type: Option<String>,

    /// Act number of the document
    #[arg(long, requires = "act_type")]
    act_number: Option<String>,

    /// Year of the document (two or four digits)
    #[arg(long, requires = "act_type")]
    date: Option<String>,
}

impl ContextArgs {
    fn to_context(&self) -> Option<Context> {
        let act_type = self.act_type.as_deref()?.trim();
        if act_type.is_empty() {
            return None;
        }
        Some(Context::new(
            act_type,
            self.act_number.as_deref(),
            self.date.as_deref(),
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "citalex_cli=info,citalex_preview=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "citalex v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Extract {
            input,
            context,
            json,
        } => {
            let text = read_input(&input)?;
            let matches = extract(&text, context.to_context().as_ref());
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                display::print_match_table(&matches);
            }
        }

        Commands::Annotate { input, context } => {
            let text = read_input(&input)?;
            let matches = extract(&text, context.to_context().as_ref());
            print!("{}", annotate(&text, &matches));
        }

        Commands::Preview {
            input,
            context,
            base_url,
            index,
            config,
            debounce_ms,
            timeout_secs,
            json,
        } => {
            let text = read_input(&input)?;
            let mut preview_config = match config {
                Some(path) => load_config(&path)?,
                None => PreviewConfig::default(),
            };
            if let Some(ms) = debounce_ms {
                preview_config.debounce = Duration::from_millis(ms);
            }

            let matches = extract(&text, context.to_context().as_ref());
            let Some(target) = matches.get(index) else {
                bail!(
                    "no citation at index {index} ({} found in {input})",
                    matches.len()
                );
            };

            let outcome = preview::run_preview(
                target,
                &base_url,
                preview_config,
                Duration::from_secs(timeout_secs),
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                display::print_outcome(&outcome);
            }
            if outcome.is_failure() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(input).with_context(|| format!("reading {input}"))
}

fn load_config(path: &Path) -> anyhow::Result<PreviewConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading preview config {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing preview config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extract_with_context() {
        let cli = Cli::try_parse_from([
            "citalex",
            "extract",
            "doc.html",
            "--act-type",
            "c.c.",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Extract {
                input,
                context,
                json,
            } => {
                assert_eq!(input, "doc.html");
                assert!(json);
                let ctx = context.to_context().unwrap();
                assert_eq!(ctx.act_type, "codice civile");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn act_number_requires_act_type() {
        let err = Cli::try_parse_from(["citalex", "annotate", "-", "--act-number", "81"]);
        assert!(err.is_err());
    }

    #[test]
    fn preview_defaults() {
        let cli = Cli::try_parse_from([
            "citalex",
            "preview",
            "-",
            "--base-url",
            "http://localhost:4000",
        ])
        .unwrap();
        match cli.command {
            Commands::Preview {
                index,
                timeout_secs,
                debounce_ms,
                ..
            } => {
                assert_eq!(index, 0);
                assert_eq!(timeout_secs, 30);
                assert!(debounce_ms.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn blank_act_type_means_no_context() {
        let args = ContextArgs {
            act_type: Some("  ".into()),
            ..Default::default()
        };
        assert!(args.to_context().is_none());
        assert!(ContextArgs::default().to_context().is_none());
    }

    #[test]
    fn context_year_is_normalised() {
        let args = ContextArgs {
            act_type: Some("d.lgs.".into()),
            act_number: Some("81".into()),
            date: Some("08".into()),
        };
        let ctx = args.to_context().unwrap();
        assert_eq!(ctx.act_number.as_deref(), Some("81"));
        assert_eq!(ctx.date.as_deref(), Some("2008"));
    }
}
