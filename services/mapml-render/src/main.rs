//! MapML render tool.
//!
//! Renders one WMS GetMap request against a YAML catalog as MapML, an HTML
//! preview page or the JSON document model.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use mapml_render::{render_exception, render_query, CatalogConfig, OutputKind};

#[derive(Parser, Debug)]
#[command(name = "mapml-render")]
#[command(about = "Render MapML documents for WMS GetMap requests")]
struct Args {
    /// Catalog configuration file
    #[arg(short, long, env = "MAPML_CATALOG", default_value = "config/catalog.yaml")]
    config: PathBuf,

    /// GetMap query string, with or without the leading URL
    #[arg(short, long)]
    query: String,

    /// Workspace the request is addressed to
    #[arg(short, long, env = "MAPML_WORKSPACE")]
    workspace: Option<String>,

    /// Output encoding (default: from the FORMAT parameter)
    #[arg(short, long, value_enum)]
    output: Option<OutputKind>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout carries only the document
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!(config = %args.config.display(), "Starting MapML render");
    let config = CatalogConfig::load_from_file(&args.config)?;

    match render_query(&config, &args.query, args.workspace.as_deref(), args.output) {
        Ok(rendered) => {
            info!(content_type = rendered.content_type, bytes = rendered.body.len(), "Rendered");
            println!("{}", rendered.body);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let report = render_exception(&e);
            error!(
                code = e.exception_code(),
                content_type = report.content_type,
                error = %e,
                "Request failed"
            );
            println!("{}", report.body);
            Ok(ExitCode::FAILURE)
        }
    }
}
