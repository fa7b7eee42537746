use serde::{Deserialize, Serialize};

use crate::editing::{Block, BlockTree};
use crate::models::{require_slug, require_text, require_valid_content};
use crate::store::{Record, ValidationError};

/// A news or blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: Vec<Block>,
    #[serde(default)]
    pub published: bool,
}

impl Post {
    pub fn editor(&self) -> BlockTree {
        BlockTree::parse(Some(self.content.as_slice()))
    }

    pub fn with_content(&self, content: Vec<Block>) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }
}

impl Record for Post {
    const LABEL: &'static str = "post";

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_slug("slug", &self.slug)?;
        require_valid_content("content", &self.content)
    }
}
