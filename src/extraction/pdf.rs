//! Page text extraction
//!
//! PDFs are read with `pdf-extract`, which separates pages with form feeds.
//! Plain-text files (`.txt`, `.md`) are accepted too, using the same page
//! separator, so pre-converted papers can be ingested directly.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, warn};

use super::ExtractionError;

const PAGE_BREAK: char = '\x0C';

/// Extract text for each page of a paper.
pub fn extract_pages(path: &Path) -> Result<Vec<String>, ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => extract_pdf_text(path)?,
        "txt" | "md" => std::fs::read_to_string(path)
            .map_err(|e| ExtractionError::ReadError(format!("{}: {}", path.display(), e)))?,
        other => return Err(ExtractionError::UnsupportedFormat(other.to_string())),
    };

    let pages = split_pages(&text);
    debug!(path = %path.display(), pages = pages.len(), "extracted page text");
    Ok(pages)
}

/// Extract text from in-memory PDF bytes.
pub fn extract_pages_from_bytes(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let text = guard_pdf("upload", || pdf_extract::extract_text_from_mem(bytes))?;
    Ok(split_pages(&text))
}

/// Extract pages from an uploaded file, dispatching on its name.
pub fn extract_pages_from_upload(file_name: &str, bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => extract_pages_from_bytes(bytes),
        "txt" | "md" => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| ExtractionError::ReadError(format!("{}: {}", file_name, e)))?;
            Ok(split_pages(text))
        }
        other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
    }
}

fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    guard_pdf(&path.display().to_string(), || pdf_extract::extract_text(path))
}

/// Run a `pdf-extract` call, treating a panic in the parser as a corrupted file.
///
/// `pdf-extract` panics instead of erroring on some malformed documents
/// (missing `/MediaBox`, missing font resources).
fn guard_pdf<F>(source: &str, extract: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, pdf_extract::OutputError>,
{
    match panic::catch_unwind(AssertUnwindSafe(extract)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            warn!(source, error = %e, "pdf extraction failed");
            Err(classify_pdf_error(e))
        }
        Err(_) => {
            warn!(source, "pdf parser panicked on malformed document");
            Err(ExtractionError::CorruptedFile)
        }
    }
}

fn classify_pdf_error(err: pdf_extract::OutputError) -> ExtractionError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("password") || lower.contains("encrypt") {
        ExtractionError::PasswordProtected
    } else if lower.contains("invalid") || lower.contains("malformed") || lower.contains("corrupt") {
        ExtractionError::CorruptedFile
    } else {
        ExtractionError::ReadError(msg)
    }
}

/// Split on form feeds, keeping blank pages so page numbering is preserved.
fn split_pages(text: &str) -> Vec<String> {
    let pages: Vec<String> = text.split(PAGE_BREAK).map(|p| p.to_string()).collect();
    // a trailing form feed produces an empty tail page
    match pages.split_last() {
        Some((last, rest)) if last.trim().is_empty() && !rest.is_empty() => rest.to_vec(),
        _ => pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file() {
        let result = extract_pages(Path::new("/nonexistent/path/to/file.pdf"));
        assert!(matches!(result, Err(ExtractionError::FileNotFound(_))));
    }

    #[test]
    fn test_invalid_pdf() {
        let mut temp_file = NamedTempFile::with_suffix(".pdf").unwrap();
        temp_file.write_all(b"This is not a valid PDF").unwrap();
        temp_file.flush().unwrap();

        assert!(extract_pages(temp_file.path()).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_file = NamedTempFile::with_suffix(".docx").unwrap();
        let result = extract_pages(temp_file.path());
        assert!(matches!(result, Err(ExtractionError::UnsupportedFormat(ext)) if ext == "docx"));
    }

    #[test]
    fn test_upload_dispatch() {
        assert_eq!(
            extract_pages_from_upload("a.txt", b"p1\x0Cp2").unwrap(),
            vec!["p1", "p2"]
        );
        assert!(extract_pages_from_upload("a.PDF", b"garbage").is_err());
        assert!(matches!(
            extract_pages_from_upload("a.exe", b""),
            Err(ExtractionError::UnsupportedFormat(ext)) if ext == "exe"
        ));
    }

    /// Minimal PDF whose only page has no `/MediaBox`.
    fn pdf_without_media_box() -> Vec<u8> {
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
            "<< /Type /Page /Parent 2 0 R >>",
        ];
        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        pdf.extend_from_slice(xref.as_bytes());
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_malformed_pdf_is_corrupted_not_panic() {
        let bytes = pdf_without_media_box();
        assert!(matches!(
            extract_pages_from_upload("broken.pdf", &bytes),
            Err(ExtractionError::CorruptedFile)
        ));

        let mut temp_file = NamedTempFile::with_suffix(".pdf").unwrap();
        temp_file.write_all(&bytes).unwrap();
        temp_file.flush().unwrap();
        assert!(matches!(
            extract_pages(temp_file.path()),
            Err(ExtractionError::CorruptedFile)
        ));
    }

    #[test]
    fn test_split_pages() {
        assert_eq!(split_pages("one\x0Ctwo\x0C"), vec!["one", "two"]);
        assert_eq!(split_pages("one\x0C\x0Cthree"), vec!["one", "", "three"]);
        assert_eq!(split_pages(""), vec![""]);
    }
}
