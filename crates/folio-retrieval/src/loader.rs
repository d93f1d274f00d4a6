//! Page-level text loading.
//!
//! PDFs are read page by page with lopdf; plain-text files load as a single
//! page. Page numbers are 0-based.

use std::path::Path;
use tracing::{debug, warn};

use crate::error::IngestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// Load the text of every page of a document
pub fn load_pages(path: &Path) -> Result<Vec<PageText>, IngestError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let pages = match extension.as_str() {
        "pdf" => load_pdf_pages(path)?,
        "txt" | "md" => {
            let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
                path: path.display().to_string(),
                source,
            })?;
            vec![PageText { page: 0, text }]
        }
        other => {
            return Err(IngestError::InvalidInput(format!(
                "unsupported file type '{}': {}",
                other,
                path.display()
            )))
        }
    };

    if pages.iter().all(|p| p.text.trim().is_empty()) {
        return Err(IngestError::InvalidInput(format!(
            "no text content extracted from {}",
            path.display()
        )));
    }

    Ok(pages)
}

fn load_pdf_pages(path: &Path) -> Result<Vec<PageText>, IngestError> {
    let doc = lopdf::Document::load(path).map_err(|e| {
        IngestError::InvalidInput(format!("failed to load PDF {}: {}", path.display(), e))
    })?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!(page_count = page_numbers.len(), path = %path.display(), "Extracting PDF text");

    let mut pages = Vec::with_capacity(page_numbers.len());
    for page_num in page_numbers {
        match doc.extract_text(&[page_num]) {
            Ok(text) => pages.push(PageText {
                page: page_num.saturating_sub(1),
                text,
            }),
            Err(e) => {
                warn!(page = page_num, error = %e, "Failed to extract page text, skipping");
            }
        }
    }

    Ok(pages)
}

/// Vector collection for a document: file stem, lowercased, spaces to underscores
pub fn collection_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("documents")
        .to_lowercase()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_collection_name() {
        assert_eq!(
            collection_name_from_path(Path::new("/uploads/Penal Code 2024.pdf")),
            "penal_code_2024"
        );
    }

    #[test]
    fn test_text_file_is_single_page() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Article 1. Everyone has rights.").unwrap();

        let pages = load_pages(file.path()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page, 0);
    }

    fn write_pdf(pages: &[&str]) -> tempfile::NamedTempFile {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let kids: Vec<Object> = pages
            .iter()
            .map(|text| {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        Operation::new("Td", vec![72.into(), 720.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                })
                .into()
            })
            .collect();

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        doc.save_to(&mut file).unwrap();
        file
    }

    #[test]
    fn test_pdf_pages_are_zero_based() {
        let file = write_pdf(&["Article 121 Homicide", "Article 155 Theft"]);

        let pages = load_pages(file.path()).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page, 0);
        assert_eq!(pages[1].page, 1);
        assert!(pages[0].text.contains("Homicide"));
        assert!(pages[1].text.contains("Theft"));
    }

    #[test]
    fn test_corrupt_pdf_is_invalid_input() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        write!(file, "not a pdf at all").unwrap();
        assert!(matches!(
            load_pages(file.path()),
            Err(IngestError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        assert!(matches!(
            load_pages(file.path()),
            Err(IngestError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "   \n ").unwrap();
        assert!(matches!(
            load_pages(file.path()),
            Err(IngestError::InvalidInput(_))
        ));
    }
}
