/*!
 * # Block Editing
 *
 * Page and post bodies are stored as a nested array of content blocks:
 * text (sanitized HTML), image (a reference into the image catalog) and
 * row (a container for further blocks).
 *
 * ## Editing model
 *
 * - [`BlockTree::parse`] turns the nested array into a flat arena of
 *   [`Node`]s keyed by [`BlockId`], with explicit parent links
 * - [`BlockTree::insert`], [`BlockTree::update`], [`BlockTree::delete`] and
 *   [`BlockTree::move_block`] edit the arena in place and mark it dirty
 * - [`BlockTree::flush`] re-serializes once per batch of edits; the caller
 *   persists the returned array
 *
 * Stale ids are tolerated everywhere: edits against an unknown block are
 * no-ops and a dangling child renders as a visible sentinel block.
 */

pub mod block;
pub mod sanitize;
pub mod tree;

pub use block::{Block, BlockId, BlockKind, ImageId, MISSING_BLOCK_MARKER};
pub use sanitize::{paragraph, sanitize_html};
pub use tree::{
    BlockPatch, BlockTree, BlockValue, DEFAULT_PLACEHOLDER, InsertOptions, Node, NodeContent,
    Placement, UpdateMode,
};
