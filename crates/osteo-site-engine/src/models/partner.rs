use serde::{Deserialize, Serialize};

use crate::editing::ImageId;
use crate::models::{require_http_url, require_text};
use crate::store::{Record, ValidationError};

/// A partner practice or organisation listed on the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<ImageId>,
}

impl Record for Partner {
    const LABEL: &'static str = "partner";

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_http_url("url", &self.url)
    }
}
