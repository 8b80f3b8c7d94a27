//! Output formats a viewer can request.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::content::ContentType;

/// Representation requested for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    Json,
    Markdown,
    PlainText,
    Summary,
    Jpeg,
    Png,
    Pdf,
    Thumbnail,
}

impl OutputFormat {
    /// Formats derived purely from stored metadata.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            OutputFormat::Json
                | OutputFormat::Markdown
                | OutputFormat::PlainText
                | OutputFormat::Summary
        )
    }

    /// Formats that need the underlying object from the storage collaborator.
    pub fn is_binary(self) -> bool {
        !self.is_structured()
    }

    /// Whether content of the given type can be rendered in this format.
    pub fn supports(self, content_type: &ContentType) -> bool {
        match self {
            OutputFormat::Json
            | OutputFormat::Markdown
            | OutputFormat::PlainText
            | OutputFormat::Summary => true,
            OutputFormat::Jpeg | OutputFormat::Png => *content_type == ContentType::Image,
            OutputFormat::Pdf => content_type.is_document_like(),
            OutputFormat::Thumbnail => matches!(
                content_type,
                ContentType::Image
                    | ContentType::Video
                    | ContentType::Model3D
                    | ContentType::Document
            ),
        }
    }

    /// MIME type of the rendered output.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Markdown => "text/markdown",
            OutputFormat::PlainText | OutputFormat::Summary => "text/plain",
            OutputFormat::Jpeg | OutputFormat::Thumbnail => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::PlainText => "text",
            OutputFormat::Summary => "summary",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Thumbnail => "thumbnail",
        };
        f.write_str(name)
    }
}
