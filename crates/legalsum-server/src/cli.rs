//! Command-line subcommands that run the pipeline on a local file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use legalsum_chat::{render_report, LLMConfig, LegalSummarizer, LlmBackend};
use legalsum_core::LegalSumConfig;
use legalsum_ingest::{DocumentProcessor, PipelineConfig};

/// Options for `legalsum summarize`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SummarizeOptions {
    pub max_length: Option<usize>,
    pub report: Option<PathBuf>,
}

/// Parse `<file> [--max-length N] [--report <out>]`.
pub fn parse_summarize_args(args: &[String]) -> Result<(PathBuf, SummarizeOptions), String> {
    let mut file = None;
    let mut options = SummarizeOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--max-length" => {
                let value = iter.next().ok_or("--max-length needs a value")?;
                let n = value
                    .parse()
                    .map_err(|_| format!("Invalid --max-length: {}", value))?;
                options.max_length = Some(n);
            }
            "--report" => {
                let value = iter.next().ok_or("--report needs a path")?;
                options.report = Some(PathBuf::from(value));
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            path if file.is_none() => file = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument: {}", extra)),
        }
    }

    let file = file.ok_or("Missing <file>")?;
    Ok((file, options))
}

fn load_processor(config: &LegalSumConfig) -> anyhow::Result<DocumentProcessor> {
    let pipeline = PipelineConfig::load(&config.data_paths.pipeline_config_file);
    Ok(DocumentProcessor::new(&pipeline)?)
}

/// `legalsum metadata <file>`: print extracted metadata as JSON.
pub fn print_metadata(config: &LegalSumConfig, path: &Path) -> anyhow::Result<()> {
    let processor = load_processor(config)?;
    let text = processor.read_document(path)?;
    let metadata = processor.extract_metadata(&text);
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

/// `legalsum normalize <file>`: print normalized text.
pub fn print_normalized(config: &LegalSumConfig, path: &Path) -> anyhow::Result<()> {
    let processor = load_processor(config)?;
    let text = processor.read_document(path)?;
    println!("{}", processor.preprocess_text(&text));
    Ok(())
}

/// `legalsum summarize <file>`: print the summary, optionally writing a report.
pub async fn summarize(
    config: &LegalSumConfig,
    path: &Path,
    options: &SummarizeOptions,
) -> anyhow::Result<()> {
    let processor = load_processor(config)?;
    let processed = processor.process_file(path)?;

    let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
    let backend = LlmBackend::from_config(&llm_config)?;
    info!("Summarizing with {}/{}", backend.provider(), backend.model());

    let max_length = options.max_length.unwrap_or(config.default_max_length);
    let summarizer = LegalSummarizer::new(Arc::new(backend));
    let summary = summarizer
        .generate_summary(
            &processed.normalized_text,
            Some(max_length),
            Some(&processed.metadata),
        )
        .await?;

    println!("{}", summary);

    if let Some(report_path) = &options.report {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let report = render_report(
            &filename,
            &processed.metadata,
            &summary,
            chrono::Local::now().naive_local(),
        );
        std::fs::write(report_path, report)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        info!("Report written to {}", report_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_summarize_args() {
        let (file, options) =
            parse_summarize_args(&args(&["nda.pdf", "--max-length", "800", "--report", "out.txt"]))
                .unwrap();
        assert_eq!(file, PathBuf::from("nda.pdf"));
        assert_eq!(options.max_length, Some(800));
        assert_eq!(options.report, Some(PathBuf::from("out.txt")));

        let (_, options) = parse_summarize_args(&args(&["--max-length", "0", "a.txt"])).unwrap();
        assert_eq!(options.max_length, Some(0));
    }

    #[test]
    fn test_parse_summarize_args_errors() {
        assert!(parse_summarize_args(&args(&[])).is_err());
        assert!(parse_summarize_args(&args(&["a.txt", "--max-length"])).is_err());
        assert!(parse_summarize_args(&args(&["a.txt", "--max-length", "ten"])).is_err());
        assert!(parse_summarize_args(&args(&["a.txt", "b.txt"])).is_err());
        assert!(parse_summarize_args(&args(&["a.txt", "--verbose"])).is_err());
    }

    #[test]
    fn test_print_metadata_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LegalSumConfig::from_env(dir.path()).unwrap();
        let err = print_metadata(&config, &dir.path().join("missing.txt")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
