//! LegalSum: legal document metadata extraction and summarization.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod routes;
mod state;

use legalsum_core::LegalSumConfig;
use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("LEGALSUM_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn print_help() {
    println!("LegalSum: legal document summarizer");
    println!();
    println!("Usage: legalsum [command]");
    println!();
    println!("Commands:");
    println!("  (none)                       Start the HTTP server");
    println!("  metadata <file>              Print extracted metadata as JSON");
    println!("  normalize <file>             Print normalized document text");
    println!("  summarize <file> [options]   Summarize a document with the configured LLM");
    println!("      --max-length N           Cap the summary at N characters (0 = no cap)");
    println!("      --report <out>           Also write a plain-text report");
    println!("  help                         Show this help message");
}

fn file_arg(args: &[String], command: &str) -> PathBuf {
    match args.get(2) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: legalsum {} <file>", command);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let data_dir = resolve_data_dir();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "metadata" => {
                let config = LegalSumConfig::from_env(&data_dir)?;
                return cli::print_metadata(&config, &file_arg(&args, "metadata"));
            }
            "normalize" => {
                let config = LegalSumConfig::from_env(&data_dir)?;
                return cli::print_normalized(&config, &file_arg(&args, "normalize"));
            }
            "summarize" => {
                let (file, options) = match cli::parse_summarize_args(&args[2..]) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        eprintln!("{}", e);
                        eprintln!("Usage: legalsum summarize <file> [--max-length N] [--report <out>]");
                        std::process::exit(1);
                    }
                };
                let config = LegalSumConfig::from_env(&data_dir)?;
                return cli::summarize(&config, &file, &options).await;
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'legalsum help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    info!("Data directory: {}", data_dir.display());

    let config = LegalSumConfig::from_env(&data_dir)?;
    let port = config.port;

    let state = Arc::new(AppState::new(config)?);
    {
        let llm = state.llm_config.read();
        match llm.resolve_provider() {
            Some((provider, model, _)) => info!("Summaries via {}/{}", provider, model),
            None => info!("No LLM provider configured; only /api/documents/analyze is usable"),
        }
    }

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("LegalSum server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
