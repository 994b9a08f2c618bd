//! Document text extraction for the supported upload formats.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use zip::ZipArchive;

use legalsum_core::{Error, Result};

/// Supported document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Docx,
    Pdf,
    Unknown,
}

impl FileType {
    /// Detect file type from extension (with or without the leading dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "txt" => Self::PlainText,
            "docx" => Self::Docx,
            "pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a file name or path.
    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(path.extension().and_then(|e| e.to_str()).unwrap_or(""))
    }
}

/// Read a document from disk and return its text.
pub fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }

    let text = match FileType::from_path(path) {
        FileType::PlainText => {
            let bytes = std::fs::read(path)?;
            decode_utf8(bytes)?
        }
        FileType::Docx => {
            let file = std::fs::File::open(path)?;
            docx_text(file)?
        }
        FileType::Pdf => pdf_extract::extract_text(path)
            .map_err(|e| Error::Decode(format!("PDF extraction failed: {}", e)))?,
        FileType::Unknown => return Err(unsupported(path)),
    };

    debug!("Read {} chars from {}", text.len(), path.display());
    Ok(text)
}

/// Decode an uploaded document from memory. The type comes from `filename`.
pub fn read_document_bytes(filename: &str, bytes: &[u8]) -> Result<String> {
    match FileType::from_path(Path::new(filename)) {
        FileType::PlainText => decode_utf8(bytes.to_vec()),
        FileType::Docx => docx_text(Cursor::new(bytes)),
        FileType::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| Error::Decode(format!("PDF extraction failed: {}", e))),
        FileType::Unknown => Err(unsupported(Path::new(filename))),
    }
}

fn unsupported(path: &Path) -> Error {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    warn!("Unsupported document format: {}", path.display());
    Error::UnsupportedFormat(ext)
}

fn decode_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| Error::Decode(format!("invalid UTF-8: {}", e)))
}

static PARAGRAPH_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"</w:p>").unwrap());
static TEXT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").unwrap());

/// Extract paragraph text from a DOCX archive, one paragraph per line.
fn docx_text<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| Error::Decode(format!("not a DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| Error::Decode("invalid DOCX: word/document.xml not found".into()))?
        .read_to_string(&mut xml)?;

    Ok(docx_paragraphs(&xml).join("\n"))
}

fn docx_paragraphs(xml: &str) -> Vec<String> {
    PARAGRAPH_END
        .split(xml)
        .filter(|chunk| chunk.contains("<w:p"))
        .map(|paragraph| {
            TEXT_RUN
                .captures_iter(paragraph)
                .filter_map(|cap| cap.get(1))
                .map(|m| unescape_xml(m.as_str()))
                .collect::<String>()
        })
        .collect()
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    const DOCUMENT_XML: &str = r#"<?xml version="1.0"?>
<w:document><w:body>
<w:p><w:r><w:t>SOFTWARE LICENSE </w:t></w:r><w:r><w:t xml:space="preserve">AGREEMENT</w:t></w:r></w:p>
<w:p><w:r><w:t>LICENSOR: Smith &amp; Sons</w:t></w:r></w:p>
</w:body></w:document>"#;

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::from_extension("TXT"), FileType::PlainText);
        assert_eq!(FileType::from_extension(".docx"), FileType::Docx);
        assert_eq!(FileType::from_extension("pdf"), FileType::Pdf);
        assert_eq!(FileType::from_extension("doc"), FileType::Unknown);
    }

    #[test]
    fn test_read_txt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agreement.txt");
        std::fs::write(&path, "SOFTWARE LICENSE AGREEMENT\nLICENSOR: Acme").unwrap();

        let text = read_document(&path).unwrap();
        assert!(text.contains("SOFTWARE LICENSE AGREEMENT"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.rtf");
        std::fs::write(&path, "{\\rtf1}").unwrap();

        match read_document(&path).unwrap_err() {
            Error::UnsupportedFormat(ext) => assert_eq!(ext, ".rtf"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_utf8_txt() {
        let err = read_document_bytes("bad.txt", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_read_docx_bytes() {
        let text = read_document_bytes("agreement.docx", &docx_bytes(DOCUMENT_XML)).unwrap();
        assert_eq!(text, "SOFTWARE LICENSE AGREEMENT\nLICENSOR: Smith & Sons");
    }

    #[test]
    fn test_read_docx_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agreement.docx");
        std::fs::write(&path, docx_bytes(DOCUMENT_XML)).unwrap();

        let text = read_document(&path).unwrap();
        assert!(text.starts_with("SOFTWARE LICENSE AGREEMENT"));
    }

    #[test]
    fn test_docx_without_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = read_document_bytes("broken.docx", &bytes).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
