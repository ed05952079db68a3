use crate::error::Result;
use crate::format::DocumentFormat;
use crate::window::Window;
use crate::{office, pdf, text};
use std::path::Path;
use tokio::fs;
use tracing::info;

pub struct DocumentReader;

impl DocumentReader {
    /// Read a document from disk, detecting its format from the extension.
    ///
    /// Unsupported extensions are rejected before the file is opened.
    pub async fn read_file(path: &Path, window: Window) -> Result<String> {
        let format = DocumentFormat::from_path(path)?;
        let bytes = fs::read(path).await?;

        let text = Self::read_bytes(&bytes, format, window)?;
        info!(
            path = %path.display(),
            format = format.name(),
            chars = text.chars().count(),
            "Read document"
        );
        Ok(text)
    }

    /// Extract the windowed text of an in-memory document.
    pub fn read_bytes(bytes: &[u8], format: DocumentFormat, window: Window) -> Result<String> {
        match format {
            DocumentFormat::Pdf => pdf::parse_pdf(bytes, window),
            DocumentFormat::Docx => office::parse_docx(bytes, window),
            DocumentFormat::Pptx => office::parse_pptx(bytes, window),
            DocumentFormat::Csv => text::parse_csv(bytes, window),
            DocumentFormat::Text => text::parse_text(bytes, window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;

    #[tokio::test]
    async fn test_read_text_file_with_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        tokio::fs::write(&path, "# Title\nAda worked with Charles.\nfooter\n")
            .await
            .unwrap();

        let text = DocumentReader::read_file(&path, Window::new(1, 1)).await.unwrap();
        assert_eq!(text, "Ada worked with Charles.\n");
    }

    #[tokio::test]
    async fn test_read_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        tokio::fs::write(&path, "id,name\n1,Ada\n2,Alan\n").await.unwrap();

        let text = DocumentReader::read_file(&path, Window::new(1, 0)).await.unwrap();
        assert_eq!(text, "1 Ada\n2 Alan");
    }

    #[tokio::test]
    async fn test_unsupported_file_is_not_opened() {
        let err = DocumentReader::read_file(Path::new("/does/not/exist.xlsx"), Window::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Unsupported(ext) if ext == "xlsx"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = DocumentReader::read_file(Path::new("/does/not/exist.txt"), Window::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
