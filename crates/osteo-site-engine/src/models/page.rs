use serde::{Deserialize, Serialize};

use crate::editing::{Block, BlockTree};
use crate::models::{require_slug, require_text, require_valid_content};
use crate::store::{Record, ValidationError};

/// A public content page such as "about" or "services"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: Vec<Block>,
}

impl Page {
    /// Open an editing session on the page body
    pub fn editor(&self) -> BlockTree {
        BlockTree::parse(Some(self.content.as_slice()))
    }

    /// Copy of this page with a new body, as emitted by [`BlockTree::flush`]
    pub fn with_content(&self, content: Vec<Block>) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }
}

impl Record for Page {
    const LABEL: &'static str = "page";

    fn validate(&self) -> Result<(), ValidationError> {
        require_slug("slug", &self.slug)?;
        require_text("title", &self.title)?;
        require_valid_content("content", &self.content)
    }
}
