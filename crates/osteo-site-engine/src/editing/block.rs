use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an entry in the image catalog
pub type ImageId = i64;

/// Marker carried by the sentinel block rendered in place of a dangling child
pub const MISSING_BLOCK_MARKER: &str = "[block not found]";

/// A content block as persisted with a page or post.
///
/// The JSON form is `{"type": "text", "value": "<p>..</p>"}`,
/// `{"type": "image", "value": 5}` or `{"type": "row", "children": [..]}`.
/// Only rows carry children, which the variant shapes enforce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Text {
        #[serde(default)]
        value: String,
    },
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<ImageId>,
    },
    Row {
        #[serde(default)]
        children: Vec<Block>,
    },
}

impl Block {
    pub fn text(value: impl Into<String>) -> Self {
        Block::Text {
            value: value.into(),
        }
    }

    pub fn image(value: ImageId) -> Self {
        Block::Image { value: Some(value) }
    }

    pub fn row(children: Vec<Block>) -> Self {
        Block::Row { children }
    }

    /// Sentinel rendered where a children list points at an unknown block
    pub fn missing(id: BlockId) -> Self {
        Block::Text {
            value: format!("<p>{MISSING_BLOCK_MARKER} {id}</p>"),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Text { .. } => BlockKind::Text,
            Block::Image { .. } => BlockKind::Image,
            Block::Row { .. } => BlockKind::Row,
        }
    }
}

/// The three block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
    Row,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Row => "row",
        };
        f.write_str(name)
    }
}

/// Index of a block in the editor arena.
///
/// Ids are handed out in increasing order and never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
