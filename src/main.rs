use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cda_core::config::document_type_from_env_value;
use cda_core::input::{build_section, render_component};
use cda_core::terminology::{self, CodeEntry, CodeKey};
use cda_core::{
    BasicNarrativeGenerator, CdaTransformer, CoreConfig, InputFormat, OutputFormat, SectionKind,
};
use cda_uuid::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};

#[derive(Parser)]
#[command(name = "cda-run")]
#[command(about = "Build CDA sections from clinical aggregates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one section from a JSON or YAML aggregate and print it
    Render {
        /// Section kind, e.g. adverse-reactions or pathology-test-result
        kind: SectionKind,
        /// Path to the aggregate file
        file: PathBuf,
        /// Document variant used for code lookups
        #[arg(long, env = "CDA_DOCUMENT_TYPE")]
        document_type: Option<String>,
        /// Input format (json or yaml); inferred from the file extension when omitted
        #[arg(long)]
        format: Option<InputFormat>,
        /// Output format (xml or json)
        #[arg(long, default_value = "xml")]
        output: OutputFormat,
        /// Number generated identifiers from 1 instead of using random GUIDs
        #[arg(long)]
        sequential_ids: bool,
    },
    /// List the terminology table
    Codes {
        /// Show only rows that apply to this document variant
        #[arg(long, env = "CDA_DOCUMENT_TYPE")]
        document_type: Option<String>,
    },
}

/// Main entry point for the CDA section builder.
///
/// # Environment Variables
/// - `CDA_DOCUMENT_TYPE`: document variant (default: "specialist-letter")
/// - `RUST_LOG`: log filter; logs go to stderr so rendered output stays clean
///
/// # Returns
/// * `Ok(())` - If the command completes
/// * `Err(anyhow::Error)` - If input cannot be read, decoded or rendered
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("cda=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            kind,
            file,
            document_type,
            format,
            output,
            sequential_ids,
        } => {
            let document_type = document_type_from_env_value(document_type)?;
            let format = format.unwrap_or_else(|| format_from_extension(&file));
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;

            let ids: Arc<dyn IdGenerator> = if sequential_ids {
                Arc::new(SequentialIdGenerator::new())
            } else {
                Arc::new(RandomIdGenerator)
            };
            let transformer = CdaTransformer::new(CoreConfig::new(document_type), ids);

            tracing::info!(%kind, %document_type, file = %file.display(), "rendering section");
            let component =
                build_section(&transformer, kind, &text, format, &BasicNarrativeGenerator)?;
            println!("{}", render_component(&component, output)?);
        }
        Commands::Codes { document_type } => {
            match document_type {
                Some(value) => {
                    let document_type = document_type_from_env_value(Some(value))?;
                    for key in CodeKey::ALL {
                        print_entry(terminology::lookup(key, document_type));
                    }
                }
                None => terminology::entries().iter().for_each(print_entry),
            }
        }
    }

    Ok(())
}

fn format_from_extension(path: &Path) -> InputFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            InputFormat::Yaml
        }
        _ => InputFormat::Json,
    }
}

fn print_entry(entry: &CodeEntry) {
    let scope = entry
        .document_type
        .map(|d| d.to_string())
        .unwrap_or_else(|| "*".into());
    println!(
        "{:<32} {:<20} {:<8} {:<24} {}",
        format!("{:?}", entry.key),
        entry.code,
        entry.system.name(),
        scope,
        entry.display_name
    );
}
