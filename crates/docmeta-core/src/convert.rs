//! Document-to-text conversion and discovery

use crate::error::{DocMetaError, Result};
use crate::identifiers;
use lopdf::{Document, Object};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Whether `path` has an extension [`document_to_text`] can read
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            ext.eq_ignore_ascii_case("pdf")
                || TEXT_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t))
        })
        .unwrap_or(false)
}

/// Plain text of a PDF, Markdown or text file
pub fn document_to_text(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(DocMetaError::InvalidInput(format!(
            "Not a file: {}",
            path.display()
        )));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let text = match ext.as_str() {
        "pdf" => pdf_text(path)?,
        e if TEXT_EXTENSIONS.contains(&e) => fs::read_to_string(path)?,
        _ => {
            return Err(DocMetaError::InvalidInput(format!(
                "Unsupported document type: {}",
                path.display()
            )))
        }
    };

    tracing::debug!("Converted {} ({} chars)", path.display(), text.len());
    Ok(text)
}

fn pdf_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        DocMetaError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read PDF file {:?}: {}", path, e),
        ))
    })?;

    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
        DocMetaError::Parse(format!("Failed to extract text from PDF {:?}: {}", path, e))
    })?;

    if text.trim().is_empty() {
        return Err(DocMetaError::Parse(format!(
            "PDF file {:?} contains no extractable text (may be image-based)",
            path
        )));
    }
    Ok(text)
}

/// Fields of a PDF's document information dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfInfo {
    pub title: Option<String>,
    /// Normalized DOI from a `/doi` entry (any key case)
    pub doi: Option<String>,
}

/// Information dictionary of a PDF; empty for other documents or when the
/// file has none
pub fn pdf_info(path: &Path) -> PdfInfo {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return PdfInfo::default();
    }

    match Document::load(path) {
        Ok(document) => read_info(&document),
        Err(e) => {
            tracing::debug!("No PDF metadata for {}: {}", path.display(), e);
            PdfInfo::default()
        }
    }
}

fn read_info(document: &Document) -> PdfInfo {
    let Some(dict) = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| document.dereference(info).ok())
        .and_then(|(_, info)| info.as_dict().ok())
    else {
        return PdfInfo::default();
    };

    let mut info = PdfInfo::default();
    for (key, value) in dict.iter() {
        let Object::String(bytes, _) = value else {
            continue;
        };
        let value = decode_text_string(bytes);
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if key.as_slice() == b"Title" {
            info.title = Some(value.to_string());
        } else if key.eq_ignore_ascii_case(b"doi") {
            info.doi = identifiers::normalize_doi(value);
        }
    }
    info
}

/// UTF-16BE with a byte order mark, else single-byte PDFDocEncoding
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// First short non-empty line, else the file stem
pub fn guess_title(text: &str, path: &Path) -> String {
    let first_line = text
        .lines()
        .map(|l| l.trim().trim_start_matches('#').trim())
        .find(|l| !l.is_empty())
        .unwrap_or("");

    if !first_line.is_empty() && first_line.len() < 200 {
        return first_line.to_string();
    }

    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.replace(['_', '-'], " "))
        .unwrap_or_else(|| "Untitled".to_string())
}

/// At most `max_chars` characters of `text`, cut on a char boundary
pub fn truncate_context(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Supported documents under `dir` whose relative path matches `pattern`
pub fn scan_directory(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DocMetaError::InvalidInput(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let glob_pattern = glob::Pattern::new(pattern)?;
    let mut documents = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_supported(entry.path()) {
            continue;
        }

        let path = entry.path();
        if let Ok(relative) = path.strip_prefix(dir) {
            if glob_pattern.matches(&relative.to_string_lossy()) {
                documents.push(path.to_path_buf());
            }
        }
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use tempfile::TempDir;

    #[test]
    fn test_text_documents_read_as_is() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("paper.md");
        fs::write(&path, "# On Things\n\ndoi:10.1000/182\n").unwrap();

        let text = document_to_text(&path).unwrap();
        assert!(text.contains("10.1000/182"));
        assert_eq!(guess_title(&text, &path), "On Things");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.png");
        fs::write(&path, [0u8; 4]).unwrap();

        let err = document_to_text(&path).unwrap_err();
        assert!(matches!(err, DocMetaError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_pdf_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"not a pdf").unwrap();

        assert!(document_to_text(&path).is_err());
    }

    fn pdf_with_info(path: &Path, info: lopdf::Dictionary) {
        let mut document = Document::with_version("1.5");
        let pages_id = document.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0_i64,
        });
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = document.add_object(info);
        document.trailer.set("Root", catalog_id);
        document.trailer.set("Info", info_id);
        document.save(path).unwrap();
    }

    #[test]
    fn test_pdf_info_reads_title_and_doi() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("paper.pdf");
        pdf_with_info(
            &path,
            dictionary! {
                "Title" => Object::string_literal("Numerical Methods"),
                "Author" => Object::string_literal("Ana Pérez"),
                "doi" => Object::string_literal("https://doi.org/10.1000/Book.1"),
            },
        );

        assert_eq!(
            pdf_info(&path),
            PdfInfo {
                title: Some("Numerical Methods".to_string()),
                doi: Some("10.1000/book.1".to_string()),
            }
        );
    }

    #[test]
    fn test_pdf_info_utf16_title_and_missing_doi() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("paper.pdf");
        let mut title = vec![0xFE, 0xFF];
        title.extend("Álgebra".encode_utf16().flat_map(u16::to_be_bytes));
        pdf_with_info(
            &path,
            dictionary! {
                "Title" => Object::String(title, lopdf::StringFormat::Hexadecimal),
            },
        );

        let info = pdf_info(&path);
        assert_eq!(info.title.as_deref(), Some("Álgebra"));
        assert_eq!(info.doi, None);
    }

    #[test]
    fn test_pdf_info_empty_for_other_documents() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("paper.md");
        fs::write(&md, "# On Things\n").unwrap();
        let broken = dir.path().join("broken.pdf");
        fs::write(&broken, b"not a pdf").unwrap();

        assert_eq!(pdf_info(&md), PdfInfo::default());
        assert_eq!(pdf_info(&broken), PdfInfo::default());
    }

    #[test]
    fn test_guess_title_falls_back_to_stem() {
        let path = Path::new("/papers/deep_learning-review.pdf");
        assert_eq!(guess_title("\n\n", path), "deep learning review");
    }

    #[test]
    fn test_truncate_context_on_char_boundary() {
        assert_eq!(truncate_context("ñandú", 2), "ña");
        assert_eq!(truncate_context("abc", 10), "abc");
    }

    #[test]
    fn test_scan_directory_filters_pattern_and_hidden() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("2021")).unwrap();
        fs::create_dir_all(dir.path().join(".trash")).unwrap();
        fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        fs::write(dir.path().join("2021/b.pdf"), b"x").unwrap();
        fs::write(dir.path().join("2021/notes.txt"), b"x").unwrap();
        fs::write(dir.path().join(".trash/c.pdf"), b"x").unwrap();

        let found = scan_directory(dir.path(), "**/*.pdf").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["2021/b.pdf", "a.pdf"]);
    }
}
