use log::{debug, warn};

use crate::editing::block::{Block, BlockId, BlockKind, ImageId};
use crate::editing::sanitize::sanitize_html;

/// Value given to text blocks created by [`BlockTree::insert`]
pub const DEFAULT_PLACEHOLDER: &str = "<p>Nouveau paragraphe</p>";

/// Stored payload of a block
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Text(String),
    Image(Option<ImageId>),
    Row(Vec<BlockId>),
}

/// A block record inside the editor arena
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub content: NodeContent,
    pub parent: Option<BlockId>,
    /// UI-only focus state, never serialized
    pub focused: bool,
}

impl Node {
    pub fn kind(&self) -> BlockKind {
        match self.content {
            NodeContent::Text(_) => BlockKind::Text,
            NodeContent::Image(_) => BlockKind::Image,
            NodeContent::Row(_) => BlockKind::Row,
        }
    }

    /// Child ids, empty for leaf blocks
    pub fn children(&self) -> &[BlockId] {
        match &self.content {
            NodeContent::Row(children) => children.as_slice(),
            _ => &[],
        }
    }
}

/// Where a block lands within its sibling list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    End,
    Before(BlockId),
    After(BlockId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertOptions {
    /// Row to insert into; `None` inserts at the top level
    pub parent: Option<BlockId>,
    pub placement: Placement,
}

impl InsertOptions {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn inside(parent: BlockId) -> Self {
        Self {
            parent: Some(parent),
            placement: Placement::End,
        }
    }

    pub fn at(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

/// New value for a block, which must match the block's kind
#[derive(Debug, Clone, PartialEq)]
pub enum BlockValue {
    Html(String),
    Image(Option<ImageId>),
}

/// Fields merged into a block by [`BlockTree::update`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockPatch {
    pub value: Option<BlockValue>,
    pub focused: Option<bool>,
}

impl BlockPatch {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            value: Some(BlockValue::Html(html.into())),
            focused: None,
        }
    }

    pub fn image(image: Option<ImageId>) -> Self {
        Self {
            value: Some(BlockValue::Image(image)),
            focused: None,
        }
    }

    pub fn focus(focused: bool) -> Self {
        Self {
            value: None,
            focused: Some(focused),
        }
    }
}

/// Whether an update needs re-serializing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Content change, marks the tree dirty
    Persist,
    /// UI-only state such as focus tracking
    Transient,
}

/// Mutable editing state for a tree of content blocks.
///
/// Blocks live in an append-only arena indexed by [`BlockId`]; a removed
/// block leaves an empty slot so stale ids stay dead. Links between blocks
/// are ids, and the only way to create a child is to insert a fresh leaf,
/// so the parent relation can never form a cycle.
///
/// Edits mark the tree dirty instead of serializing immediately. The owner
/// calls [`BlockTree::flush`] once the current batch of edits has settled
/// and persists whatever it returns.
///
/// ```rust
/// use osteo_site_engine::editing::{Block, BlockKind, BlockTree, InsertOptions, Placement};
///
/// let blocks = vec![Block::row(vec![Block::text("<p>A</p>")])];
/// let mut tree = BlockTree::parse(Some(blocks.as_slice()));
///
/// let row = tree.roots()[0];
/// let first = tree.children_of(row)[0];
/// tree.insert(BlockKind::Image, InsertOptions::inside(row).at(Placement::After(first)));
///
/// let emitted = tree.flush().expect("insert marks the tree dirty");
/// assert_eq!(emitted.len(), 1);
/// assert!(tree.flush().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct BlockTree {
    arena: Vec<Option<Node>>,
    roots: Vec<BlockId>,
    selection: Option<BlockId>,
    dirty: bool,
    placeholder: String,
}

impl Default for BlockTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTree {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            roots: Vec::new(),
            selection: None,
            dirty: false,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    /// Build the editing state from persisted blocks.
    ///
    /// `None` is an empty document. Every block gets a fresh id and the
    /// tree starts clean.
    pub fn parse(blocks: Option<&[Block]>) -> Self {
        let mut tree = Self::new();
        for block in blocks.unwrap_or_default() {
            let id = tree.adopt(block, None);
            tree.roots.push(id);
        }
        tree
    }

    /// Replace the value given to newly inserted text blocks
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    fn adopt(&mut self, block: &Block, parent: Option<BlockId>) -> BlockId {
        let id = BlockId(self.arena.len());
        self.arena.push(None);

        let content = match block {
            Block::Text { value } => NodeContent::Text(value.clone()),
            Block::Image { value } => NodeContent::Image(*value),
            Block::Row { children } => NodeContent::Row(
                children
                    .iter()
                    .map(|child| self.adopt(child, Some(id)))
                    .collect(),
            ),
        };

        self.arena[id.0] = Some(Node {
            content,
            parent,
            focused: false,
        });
        id
    }

    pub fn get(&self, id: BlockId) -> Option<&Node> {
        self.arena.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: BlockId) -> Option<&mut Node> {
        self.arena.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent_of(&self, id: BlockId) -> Option<BlockId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children_of(&self, id: BlockId) -> &[BlockId] {
        self.get(id).map(Node::children).unwrap_or_default()
    }

    /// Top-level blocks in document order
    pub fn roots(&self) -> &[BlockId] {
        &self.roots
    }

    /// Number of live blocks
    pub fn len(&self) -> usize {
        self.arena.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Currently active block
    pub fn selection(&self) -> Option<BlockId> {
        self.selection
    }

    /// Make `id` the active block, ignoring unknown ids
    pub fn select(&mut self, id: BlockId) -> bool {
        if !self.contains(id) {
            debug!("select: unknown block {id}");
            return false;
        }
        self.selection = Some(id);
        true
    }

    /// The ordered list `id` would live in under `parent`
    fn siblings_mut(&mut self, parent: Option<BlockId>) -> Option<&mut Vec<BlockId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(parent) => match &mut self.get_mut(parent)?.content {
                NodeContent::Row(children) => Some(children),
                _ => None,
            },
        }
    }

    /// Create a new block and make it the selection.
    ///
    /// Returns `None` when the requested parent is unknown or not a row.
    /// A placement whose reference is not among the siblings appends.
    pub fn insert(&mut self, kind: BlockKind, options: InsertOptions) -> Option<BlockId> {
        if let Some(parent) = options.parent {
            match self.get(parent).map(Node::kind) {
                Some(BlockKind::Row) => {}
                Some(other) => {
                    debug!("insert: parent {parent} is a {other} block, not a row");
                    return None;
                }
                None => {
                    debug!("insert: unknown parent {parent}");
                    return None;
                }
            }
        }

        let content = match kind {
            BlockKind::Text => NodeContent::Text(self.placeholder.clone()),
            BlockKind::Image => NodeContent::Image(None),
            BlockKind::Row => NodeContent::Row(Vec::new()),
        };
        let id = BlockId(self.arena.len());
        self.arena.push(Some(Node {
            content,
            parent: options.parent,
            focused: false,
        }));

        let siblings = self.siblings_mut(options.parent)?;
        if !place(siblings, id, options.placement) {
            debug!(
                "insert: reference in {:?} is not a sibling, appending {id}",
                options.placement
            );
        }

        self.selection = Some(id);
        self.dirty = true;
        Some(id)
    }

    /// Merge `patch` into block `id`.
    ///
    /// Unknown ids and values of the wrong kind leave the tree untouched
    /// and return `false`. HTML values are sanitized before being stored.
    pub fn update(&mut self, id: BlockId, patch: BlockPatch, mode: UpdateMode) -> bool {
        let Some(node) = self.get_mut(id) else {
            debug!("update: unknown block {id}");
            return false;
        };

        if let Some(value) = patch.value {
            let kind = node.kind();
            match (&mut node.content, value) {
                (NodeContent::Text(current), BlockValue::Html(html)) => {
                    *current = sanitize_html(&html);
                }
                (NodeContent::Image(current), BlockValue::Image(image)) => *current = image,
                (_, value) => {
                    debug!("update: {value:?} does not fit {kind} block {id}");
                    return false;
                }
            }
        }
        if let Some(focused) = patch.focused {
            node.focused = focused;
        }

        if mode == UpdateMode::Persist {
            self.dirty = true;
        }
        true
    }

    /// Remove block `id` together with all its descendants
    pub fn delete(&mut self, id: BlockId) -> bool {
        let Some(parent) = self.get(id).map(|node| node.parent) else {
            debug!("delete: unknown block {id}");
            return false;
        };

        let doomed = self.subtree(id);
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|sibling| *sibling != id);
        }
        for removed in &doomed {
            if let Some(slot) = self.arena.get_mut(removed.0) {
                *slot = None;
            }
        }

        if self
            .selection
            .is_some_and(|selected| doomed.contains(&selected))
        {
            self.selection = None;
        }
        self.dirty = true;
        true
    }

    /// Reorder `id` within its own sibling list.
    ///
    /// The reference of a `Before`/`After` placement must share the
    /// block's parent; blocks never change parent.
    pub fn move_block(&mut self, id: BlockId, placement: Placement) -> bool {
        let Some(parent) = self.get(id).map(|node| node.parent) else {
            debug!("move: unknown block {id}");
            return false;
        };
        let Some(siblings) = self.siblings_mut(parent) else {
            return false;
        };

        if let Placement::Before(reference) | Placement::After(reference) = placement
            && (reference == id || !siblings.contains(&reference))
        {
            debug!("move: {reference} is not a sibling of {id}");
            return false;
        }

        siblings.retain(|sibling| *sibling != id);
        place(siblings, id, placement);
        self.dirty = true;
        true
    }

    /// `id` followed by its descendants in pre-order
    fn subtree(&self, id: BlockId) -> Vec<BlockId> {
        let mut collected = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            collected.push(next);
            stack.extend(self.children_of(next).iter().rev());
        }
        collected
    }

    /// Depth-first pre-order listing of live blocks with their depth
    pub fn walk(&self) -> Vec<(BlockId, usize)> {
        let mut listed = Vec::new();
        let mut stack: Vec<(BlockId, usize)> = self.roots.iter().rev().map(|id| (*id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            if !self.contains(id) {
                continue;
            }
            listed.push((id, depth));
            stack.extend(self.children_of(id).iter().rev().map(|child| (*child, depth + 1)));
        }
        listed
    }

    /// Image ids referenced by image blocks, in document order
    pub fn image_references(&self) -> Vec<ImageId> {
        self.walk()
            .into_iter()
            .filter_map(|(id, _)| match self.get(id)?.content {
                NodeContent::Image(image) => image,
                _ => None,
            })
            .collect()
    }

    /// Rebuild the nested blocks from the top-level list
    pub fn render(&self) -> Vec<Block> {
        self.roots.iter().map(|id| self.render_block(*id)).collect()
    }

    fn render_block(&self, id: BlockId) -> Block {
        let Some(node) = self.get(id) else {
            warn!("render: dangling reference to block {id}");
            return Block::missing(id);
        };

        match &node.content {
            NodeContent::Text(value) => Block::Text {
                value: value.clone(),
            },
            NodeContent::Image(value) => Block::Image { value: *value },
            NodeContent::Row(children) => Block::Row {
                children: children.iter().map(|child| self.render_block(*child)).collect(),
            },
        }
    }

    /// Serialize pending edits, if any, and clear the dirty flag
    pub fn flush(&mut self) -> Option<Vec<Block>> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.render())
    }
}

/// Splice `id` into `siblings`; returns `false` if the reference was absent
fn place(siblings: &mut Vec<BlockId>, id: BlockId, placement: Placement) -> bool {
    let position = |reference: BlockId| siblings.iter().position(|s| *s == reference);
    let (index, found) = match placement {
        Placement::End => (siblings.len(), true),
        Placement::Before(reference) => match position(reference) {
            Some(index) => (index, true),
            None => (siblings.len(), false),
        },
        Placement::After(reference) => match position(reference) {
            Some(index) => (index + 1, true),
            None => (siblings.len(), false),
        },
    };
    siblings.insert(index, id);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::block::MISSING_BLOCK_MARKER;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample() -> Vec<Block> {
        vec![
            Block::text("<p>Intro</p>"),
            Block::row(vec![Block::text("A"), Block::image(5)]),
            Block::image(9),
        ]
    }

    fn check_invariants(tree: &BlockTree) {
        for (index, slot) in tree.arena.iter().enumerate() {
            let Some(node) = slot else { continue };
            let id = BlockId(index);
            if node.kind() != BlockKind::Row {
                assert!(node.children().is_empty());
            }
            let mut seen = std::collections::HashSet::new();
            for child in node.children() {
                assert!(seen.insert(*child), "duplicate child {child}");
                assert_eq!(tree.parent_of(*child), Some(id));
            }
            match node.parent {
                None => assert!(tree.roots.contains(&id)),
                Some(parent) => assert!(tree.children_of(parent).contains(&id)),
            }
        }
        assert_eq!(tree.walk().len(), tree.len());
    }

    // ============ parse / render ============

    #[test]
    fn test_parse_none_is_empty_document() {
        let mut tree = BlockTree::parse(None);

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.render(), Vec::<Block>::new());
        assert!(tree.flush().is_none());
    }

    #[test]
    fn test_parse_records_parent_links() {
        let tree = BlockTree::parse(Some(sample().as_slice()));

        assert_eq!(tree.roots().len(), 3);
        assert_eq!(tree.len(), 5);
        let row = tree.roots()[1];
        assert_eq!(tree.get(row).unwrap().kind(), BlockKind::Row);
        for child in tree.children_of(row) {
            assert_eq!(tree.parent_of(*child), Some(row));
        }
        assert_eq!(tree.parent_of(row), None);
        check_invariants(&tree);
    }

    #[test]
    fn test_parse_then_render_round_trips() {
        let blocks = vec![Block::row(vec![Block::text("A"), Block::image(5)])];
        let tree = BlockTree::parse(Some(blocks.as_slice()));

        assert_eq!(tree.render(), blocks);
        assert!(!tree.is_dirty());
    }

    #[test]
    fn test_round_trip_deeply_nested() {
        let blocks = vec![
            Block::row(vec![
                Block::row(vec![Block::row(vec![Block::text("deep")]), Block::Image {
                    value: None,
                }]),
                Block::row(Vec::new()),
            ]),
            Block::text(""),
        ];
        let tree = BlockTree::parse(Some(blocks.as_slice()));

        assert_eq!(tree.render(), blocks);
        check_invariants(&tree);
    }

    #[test]
    fn test_render_substitutes_missing_child() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let row = tree.roots()[1];
        let lost = tree.children_of(row)[0];
        tree.arena[lost.0] = None;

        let rendered = tree.render();

        let Block::Row { children } = &rendered[1] else {
            panic!("expected row, got {:?}", rendered[1]);
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[0], Block::Text { value } if value.contains(MISSING_BLOCK_MARKER)));
        assert_eq!(children[1], Block::image(5));
    }

    // ============ insert ============

    #[test]
    fn test_insert_root_appends_and_selects() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));

        let id = tree.insert(BlockKind::Text, InsertOptions::root()).unwrap();

        assert_eq!(tree.roots().last(), Some(&id));
        assert_eq!(tree.selection(), Some(id));
        assert!(tree.is_dirty());
        assert_eq!(
            tree.get(id).unwrap().content,
            NodeContent::Text(DEFAULT_PLACEHOLDER.to_string())
        );
    }

    #[test]
    fn test_insert_after_reference_in_row() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let row = tree.roots()[1];
        let first = tree.children_of(row)[0];

        let id = tree
            .insert(
                BlockKind::Text,
                InsertOptions::inside(row).at(Placement::After(first)),
            )
            .unwrap();

        assert_eq!(tree.children_of(row)[1], id);
        assert_eq!(tree.children_of(row).len(), 3);
        assert_eq!(tree.parent_of(id), Some(row));
        check_invariants(&tree);
    }

    #[test]
    fn test_insert_before_root_reference() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let first = tree.roots()[0];

        let id = tree
            .insert(BlockKind::Row, InsertOptions::root().at(Placement::Before(first)))
            .unwrap();

        assert_eq!(tree.roots()[0], id);
        assert_eq!(tree.roots()[1], first);
        assert_eq!(tree.get(id).unwrap().content, NodeContent::Row(Vec::new()));
    }

    #[test]
    fn test_insert_into_empty_row() {
        let mut tree = BlockTree::parse(Some(&[Block::row(Vec::new())][..]));
        let row = tree.roots()[0];

        let id = tree.insert(BlockKind::Image, InsertOptions::inside(row)).unwrap();

        assert_eq!(tree.children_of(row), &[id]);
        assert_eq!(
            tree.render(),
            vec![Block::row(vec![Block::Image { value: None }])]
        );
    }

    #[test]
    fn test_insert_with_unknown_reference_appends() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let row = tree.roots()[1];
        let not_a_child = tree.roots()[0];

        let id = tree
            .insert(
                BlockKind::Text,
                InsertOptions::inside(row).at(Placement::Before(not_a_child)),
            )
            .unwrap();

        assert_eq!(tree.children_of(row).last(), Some(&id));
    }

    #[rstest]
    #[case::text_parent(0)]
    #[case::image_parent(2)]
    fn test_insert_into_leaf_is_rejected(#[case] root_index: usize) {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let leaf = tree.roots()[root_index];
        let before = tree.len();

        let result = tree.insert(BlockKind::Text, InsertOptions::inside(leaf));

        assert_eq!(result, None);
        assert_eq!(tree.len(), before);
        assert!(!tree.is_dirty());
        assert_eq!(tree.selection(), None);
    }

    #[test]
    fn test_insert_into_deleted_parent_is_rejected() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let row = tree.roots()[1];
        tree.delete(row);

        assert_eq!(tree.insert(BlockKind::Text, InsertOptions::inside(row)), None);
    }

    #[test]
    fn test_custom_placeholder() {
        let mut tree = BlockTree::new().with_placeholder("<p>...</p>");

        let id = tree.insert(BlockKind::Text, InsertOptions::root()).unwrap();

        assert_eq!(tree.render(), vec![Block::text("<p>...</p>")]);
        assert_eq!(tree.roots(), &[id]);
    }

    // ============ update ============

    #[test]
    fn test_update_text_marks_dirty() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let intro = tree.roots()[0];

        assert!(tree.update(intro, BlockPatch::html("<p>Hello</p>"), UpdateMode::Persist));

        assert!(tree.is_dirty());
        assert_eq!(tree.render()[0], Block::text("<p>Hello</p>"));
    }

    #[test]
    fn test_update_sanitizes_html() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let intro = tree.roots()[0];

        tree.update(
            intro,
            BlockPatch::html("<p onclick=\"x()\">Hi</p><script>x()</script>"),
            UpdateMode::Persist,
        );

        assert_eq!(tree.render()[0], Block::text("<p>Hi</p>"));
    }

    #[test]
    fn test_transient_update_does_not_dirty() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let intro = tree.roots()[0];

        assert!(tree.update(intro, BlockPatch::focus(true), UpdateMode::Transient));

        assert!(tree.get(intro).unwrap().focused);
        assert!(!tree.is_dirty());
        assert!(tree.flush().is_none());
    }

    #[test]
    fn test_update_image_value() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let image = tree.roots()[2];

        tree.update(image, BlockPatch::image(Some(12)), UpdateMode::Persist);

        assert_eq!(tree.render()[2], Block::image(12));
    }

    #[test]
    fn test_update_with_mismatched_value_is_noop() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let image = tree.roots()[2];
        let row = tree.roots()[1];

        assert!(!tree.update(image, BlockPatch::html("<p>x</p>"), UpdateMode::Persist));
        assert!(!tree.update(row, BlockPatch::image(Some(1)), UpdateMode::Persist));

        assert!(!tree.is_dirty());
        assert_eq!(tree.render(), sample());
    }

    #[test]
    fn test_update_unknown_block_is_noop() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));

        assert!(!tree.update(BlockId(99), BlockPatch::html("x"), UpdateMode::Persist));
        assert!(!tree.is_dirty());
    }

    // ============ delete ============

    #[test]
    fn test_delete_row_removes_descendants() {
        let blocks = vec![
            Block::text("first"),
            Block::row(vec![Block::row(vec![Block::text("inner")]), Block::image(1)]),
            Block::text("last"),
        ];
        let mut tree = BlockTree::parse(Some(blocks.as_slice()));
        let row = tree.roots()[1];
        let descendants: Vec<_> = tree.subtree(row);
        assert_eq!(descendants.len(), 4);

        assert!(tree.delete(row));

        for id in descendants {
            assert!(!tree.contains(id));
        }
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.render(), vec![Block::text("first"), Block::text("last")]);
        check_invariants(&tree);
    }

    #[test]
    fn test_delete_child_detaches_from_parent() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let row = tree.roots()[1];
        let text = tree.children_of(row)[0];

        tree.delete(text);

        assert_eq!(tree.children_of(row).len(), 1);
        assert_eq!(tree.render()[1], Block::row(vec![Block::image(5)]));
    }

    #[test]
    fn test_delete_clears_selection_inside_subtree() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let row = tree.roots()[1];
        let image = tree.children_of(row)[1];
        tree.select(image);

        tree.delete(row);

        assert_eq!(tree.selection(), None);
    }

    #[test]
    fn test_delete_keeps_unrelated_selection() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let intro = tree.roots()[0];
        tree.select(intro);

        tree.delete(tree.roots()[2]);

        assert_eq!(tree.selection(), Some(intro));
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let intro = tree.roots()[0];
        tree.delete(intro);
        tree.flush();

        assert!(!tree.delete(intro));
        assert!(!tree.is_dirty());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let intro = tree.roots()[0];
        tree.delete(intro);

        let id = tree.insert(BlockKind::Text, InsertOptions::root()).unwrap();

        assert_ne!(id, intro);
        assert!(!tree.contains(intro));
    }

    // ============ move ============

    #[test]
    fn test_move_within_row() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let row = tree.roots()[1];
        let [text, image] = [tree.children_of(row)[0], tree.children_of(row)[1]];

        assert!(tree.move_block(image, Placement::Before(text)));

        assert_eq!(tree.children_of(row), &[image, text]);
        assert!(tree.is_dirty());
        check_invariants(&tree);
    }

    #[test]
    fn test_move_root_to_end() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let intro = tree.roots()[0];

        tree.move_block(intro, Placement::End);

        assert_eq!(tree.roots()[2], intro);
    }

    #[test]
    fn test_move_to_foreign_reference_is_rejected() {
        let mut tree = BlockTree::parse(Some(sample().as_slice()));
        let row = tree.roots()[1];
        let child = tree.children_of(row)[0];
        let intro = tree.roots()[0];

        assert!(!tree.move_block(child, Placement::After(intro)));
        assert!(!tree.move_block(intro, Placement::After(intro)));

        assert!(!tree.is_dirty());
        assert_eq!(tree.render(), sample());
    }

    // ============ flush / walk ============

    #[test]
    fn test_flush_coalesces_edits() {
        let mut tree = BlockTree::parse(None);
        let row = tree.insert(BlockKind::Row, InsertOptions::root()).unwrap();
        let text = tree.insert(BlockKind::Text, InsertOptions::inside(row)).unwrap();
        tree.update(text, BlockPatch::html("<p>A</p>"), UpdateMode::Persist);
        tree.insert(BlockKind::Image, InsertOptions::inside(row));

        let emitted = tree.flush();

        assert_eq!(
            emitted,
            Some(vec![Block::row(vec![
                Block::text("<p>A</p>"),
                Block::Image { value: None }
            ])])
        );
        assert!(!tree.is_dirty());
        assert_eq!(tree.flush(), None);
    }

    #[test]
    fn test_walk_is_pre_order_with_depth() {
        let tree = BlockTree::parse(Some(sample().as_slice()));
        let row = tree.roots()[1];

        let depths: Vec<_> = tree.walk().into_iter().map(|(_, depth)| depth).collect();

        assert_eq!(depths, vec![0, 0, 1, 1, 0]);
        assert_eq!(tree.walk()[1].0, row);
    }

    #[test]
    fn test_image_references_in_document_order() {
        let tree = BlockTree::parse(Some(sample().as_slice()));

        assert_eq!(tree.image_references(), vec![5, 9]);
    }
}
