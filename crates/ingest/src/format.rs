use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Pptx,
    Csv,
    /// Plain text and markdown, windowed by lines
    Text,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "pptx" => Ok(Self::Pptx),
            "csv" => Ok(Self::Csv),
            "txt" | "md" => Ok(Self::Text),
            other => Err(IngestError::Unsupported(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    /// Map an upload's MIME type onto a format
    pub fn from_mime(mime: &str) -> Result<Self> {
        match mime {
            "application/pdf" => Ok(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Ok(Self::Docx)
            }
            "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                Ok(Self::Pptx)
            }
            "text/csv" => Ok(Self::Csv),
            "text/plain" | "text/markdown" => Ok(Self::Text),
            other => Err(IngestError::Unsupported(other.to_string())),
        }
    }

    /// What one windowing unit means for this format
    pub fn unit_name(&self) -> &'static str {
        match self {
            Self::Pdf => "page",
            Self::Docx => "paragraph",
            Self::Pptx => "slide",
            Self::Csv => "row",
            Self::Text => "line",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Csv => "csv",
            Self::Text => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        assert_eq!(DocumentFormat::from_extension("PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension("md").unwrap(), DocumentFormat::Text);
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes/report.docx")).unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = DocumentFormat::from_extension("ppt").unwrap_err();
        assert!(matches!(err, IngestError::Unsupported(ext) if ext == "ppt"));

        let err = DocumentFormat::from_path(Path::new("README")).unwrap_err();
        assert!(matches!(err, IngestError::Unsupported(_)));
    }

    #[test]
    fn test_mime_detection() {
        assert_eq!(DocumentFormat::from_mime("text/plain").unwrap(), DocumentFormat::Text);
        assert!(DocumentFormat::from_mime("image/png").is_err());
    }
}
