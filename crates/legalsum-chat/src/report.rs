//! Plain-text export of a summary and its metadata.

use chrono::NaiveDateTime;

use legalsum_ingest::{DocumentMetadata, FieldValue};

fn rule() -> String {
    "-".repeat(50)
}

/// Render the downloadable report for one summarized document.
pub fn render_report(
    filename: &str,
    metadata: &DocumentMetadata,
    summary: &str,
    generated_at: NaiveDateTime,
) -> String {
    let rule = rule();
    let mut report = format!(
        "Document Summary Report\nGenerated on: {}\nOriginal File: {}\n\n{rule}\nMETADATA\n{rule}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        filename,
    );

    for (title, value) in metadata.labeled_fields() {
        if value.is_empty() {
            continue;
        }
        report.push_str(&format!("\n{}:\n", title));
        match value {
            FieldValue::Text(s) => report.push_str(s),
            FieldValue::List(items) => {
                let lines: Vec<String> = items.iter().map(|item| format!("- {}", item)).collect();
                report.push_str(&lines.join("\n"));
            }
        }
        report.push('\n');
    }

    report.push_str(&format!("\n{rule}\nSUMMARY\n{rule}\n"));
    report.push_str(summary);
    report
}

/// Download name for the bare summary text.
pub fn summary_file_name(original: &str) -> String {
    format!("summary_{}.txt", original)
}

/// Download name for the full report.
pub fn report_file_name(original: &str) -> String {
    format!("report_{}.txt", original)
}
