use serde::{Deserialize, Serialize};

use crate::models::require_text;
use crate::store::{Record, ValidationError};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "svg"];

/// An entry of the image library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub filename: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Image {
    pub fn new(filename: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            alt: alt.into(),
            width: None,
            height: None,
        }
    }

    /// Public URL the site serves this image from
    pub fn url(&self) -> String {
        format!("/images/{}", self.filename)
    }
}

impl Record for Image {
    const LABEL: &'static str = "image";

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("filename", &self.filename)?;
        if self.filename.contains(['/', '\\']) || self.filename.starts_with('.') {
            return Err(ValidationError::new(
                "filename",
                format!("'{}' must be a bare file name", self.filename),
            ));
        }

        let extension = self
            .filename
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase());
        match extension {
            Some(extension) if ALLOWED_EXTENSIONS.contains(&extension.as_str()) => Ok(()),
            _ => Err(ValidationError::new(
                "filename",
                format!("'{}' is not a supported image type", self.filename),
            )),
        }
    }
}
