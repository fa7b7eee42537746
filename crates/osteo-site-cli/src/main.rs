use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use osteo_site_config::Config;
use osteo_site_engine::editing::{
    Block, BlockId, BlockKind, BlockPatch, BlockTree, InsertOptions, NodeContent, Placement,
    UpdateMode, paragraph,
};
use osteo_site_engine::site::render_blocks;
use osteo_site_engine::store::{Outcome, Undo};
use html_escape::decode_html_entities;
use osteo_site_engine::{Image, ItemId, JsonCollection, Page, Store, io};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block as Panel, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::{env, io::stdout, path::PathBuf, process};

/// Value being typed for the selected block
#[derive(Debug, Clone, PartialEq)]
struct Input {
    buffer: String,
    /// Buffer holds markup rather than the text of a single paragraph
    raw_html: bool,
}

/// Editing session on one page body
struct Session {
    id: ItemId,
    page: Page,
    tree: BlockTree,
    outline: Vec<(BlockId, usize)>,
    outline_state: ListState,
    /// Latest serialized body not yet saved
    draft: Option<Vec<Block>>,
}

impl Session {
    fn open(id: ItemId, page: Page, placeholder: Option<&str>) -> Self {
        let mut tree = page.editor();
        if let Some(placeholder) = placeholder {
            tree = tree.with_placeholder(placeholder);
        }
        let mut session = Self {
            id,
            page,
            tree,
            outline: Vec::new(),
            outline_state: ListState::default(),
            draft: None,
        };
        session.refresh();
        if let Some((first, _)) = session.outline.first().copied() {
            session.tree.select(first);
        }
        session.sync_cursor();
        session
    }

    /// Re-serialize after an edit settles and rebuild the outline
    fn refresh(&mut self) {
        if let Some(blocks) = self.tree.flush() {
            self.draft = Some(blocks);
        }
        self.outline = self.tree.walk();
        self.sync_cursor();
    }

    fn sync_cursor(&mut self) {
        let index = self
            .tree
            .selection()
            .and_then(|selected| self.outline.iter().position(|(id, _)| *id == selected));
        self.outline_state.select(index);
    }

    fn body(&self) -> Vec<Block> {
        self.draft
            .clone()
            .unwrap_or_else(|| self.page.content.clone())
    }

    fn step(&mut self, forward: bool) {
        if self.outline.is_empty() {
            return;
        }
        let len = self.outline.len();
        let index = match self.outline_state.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.tree.select(self.outline[index].0);
        self.sync_cursor();
    }

    /// Insert next to the selection, or at the end of the page
    fn insert_after_selection(&mut self, kind: BlockKind) {
        let options = match self.tree.selection() {
            Some(selected) => InsertOptions {
                parent: self.tree.parent_of(selected),
                placement: Placement::After(selected),
            },
            None => InsertOptions::root(),
        };
        self.tree.insert(kind, options);
        self.refresh();
    }

    fn insert_into_selection(&mut self) -> bool {
        let Some(selected) = self.tree.selection() else {
            return false;
        };
        let inserted = self
            .tree
            .insert(BlockKind::Text, InsertOptions::inside(selected))
            .is_some();
        self.refresh();
        inserted
    }

    /// Current value of the selection as editable input; rows have none.
    ///
    /// A lone paragraph of plain text is edited as text, anything with
    /// more structure is edited as HTML so its formatting survives.
    fn input_for_selection(&self) -> Option<Input> {
        let node = self.tree.get(self.tree.selection()?)?;
        match &node.content {
            NodeContent::Text(html) => Some(match paragraph_text(html) {
                Some(text) => Input {
                    buffer: text,
                    raw_html: false,
                },
                None => Input {
                    buffer: html.clone(),
                    raw_html: true,
                },
            }),
            NodeContent::Image(image) => Some(Input {
                buffer: image.map(|id| id.to_string()).unwrap_or_default(),
                raw_html: false,
            }),
            NodeContent::Row(_) => None,
        }
    }

    /// Apply typed input to the selection; `false` if it does not fit the block
    fn apply_input(&mut self, input: &Input) -> bool {
        let Some(selected) = self.tree.selection() else {
            return false;
        };
        let value = input.buffer.trim();
        let patch = match self.tree.get(selected).map(|node| node.kind()) {
            Some(BlockKind::Text) if input.raw_html => BlockPatch::html(value),
            Some(BlockKind::Text) => BlockPatch::html(paragraph(value)),
            Some(BlockKind::Image) if value.is_empty() => BlockPatch::image(None),
            Some(BlockKind::Image) => match value.parse() {
                Ok(image) => BlockPatch::image(Some(image)),
                Err(_) => return false,
            },
            Some(BlockKind::Row) | None => return false,
        };
        let applied = self.tree.update(selected, patch, UpdateMode::Persist);
        self.refresh();
        applied
    }

    fn delete_selection(&mut self) {
        if let Some(selected) = self.tree.selection() {
            self.tree.delete(selected);
            self.refresh();
            if let Some((first, _)) = self.outline.first().copied() {
                self.tree.select(first);
            }
            self.sync_cursor();
        }
    }

    /// Swap the selection with its previous or next sibling
    fn shift_selection(&mut self, down: bool) {
        let Some(selected) = self.tree.selection() else {
            return;
        };
        let siblings = match self.tree.parent_of(selected) {
            Some(parent) => self.tree.children_of(parent).to_vec(),
            None => self.tree.roots().to_vec(),
        };
        let Some(index) = siblings.iter().position(|id| *id == selected) else {
            return;
        };
        let placement = if down {
            siblings.get(index + 1).map(|next| Placement::After(*next))
        } else {
            index
                .checked_sub(1)
                .map(|previous| Placement::Before(siblings[previous]))
        };
        if let Some(placement) = placement {
            self.tree.move_block(selected, placement);
            self.refresh();
        }
    }

    fn label(&self, id: BlockId, images: &Store<Image>) -> String {
        let Some(node) = self.tree.get(id) else {
            return "?".to_string();
        };
        match &node.content {
            NodeContent::Text(html) => format!("¶ {}", plain_text(html)),
            NodeContent::Image(None) => "▣ (no image)".to_string(),
            NodeContent::Image(Some(image)) => match images.get_saved(*image) {
                Some(found) => format!("▣ {} ({image})", found.filename),
                None => format!("▣ missing image {image}"),
            },
            NodeContent::Row(children) => format!("▤ row ({} blocks)", children.len()),
        }
    }
}

/// Text of `<p>…</p>` holding no other markup
fn paragraph_text(html: &str) -> Option<String> {
    let inner = html.strip_prefix("<p>")?.strip_suffix("</p>")?;
    if inner.contains(['<', '>']) {
        return None;
    }
    Some(decode_html_entities(inner).into_owned())
}

/// Text content of an HTML fragment, tags dropped
fn plain_text(html: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

struct App {
    pages: JsonCollection<Page>,
    store: Store<Page>,
    images: Store<Image>,
    page_list_state: ListState,
    session: Option<Session>,
    input: Option<Input>,
    placeholder: Option<String>,
    /// Inverse of the last save, with the page it applies to
    last_undo: Option<(ItemId, Undo<Page>)>,
    status: String,
}

impl App {
    fn new(content_path: PathBuf, placeholder: Option<String>) -> Result<Self> {
        let pages = JsonCollection::<Page>::load(&content_path)
            .with_context(|| format!("loading pages from {}", content_path.display()))?;
        let images = JsonCollection::<Image>::load(&content_path)
            .with_context(|| format!("loading images from {}", content_path.display()))?;
        let store = pages.to_store();

        let mut app = Self {
            pages,
            store,
            images: images.to_store(),
            page_list_state: ListState::default(),
            session: None,
            input: None,
            placeholder,
            last_undo: None,
            status: String::new(),
        };

        if !app.store.is_empty() {
            app.page_list_state.select(Some(0));
        }

        Ok(app)
    }

    fn saved_pages(&self) -> Vec<(ItemId, &Page)> {
        self.store
            .items()
            .filter_map(|entry| entry.key.saved_id().map(|id| (id, &entry.item)))
            .collect()
    }

    fn next_page(&mut self, forward: bool) {
        let len = self.saved_pages().len();
        if len == 0 {
            return;
        }
        let i = match self.page_list_state.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.page_list_state.select(Some(i));
    }

    fn open_selected_page(&mut self) {
        let selected = self
            .page_list_state
            .selected()
            .and_then(|index| self.saved_pages().get(index).map(|(id, page)| (*id, (*page).clone())));
        if let Some((id, page)) = selected {
            info!("editing page {id} ({})", page.slug);
            self.status = format!("Editing /{}", page.slug);
            self.session = Some(Session::open(id, page, self.placeholder.as_deref()));
        }
    }

    fn open_page_by_slug(&mut self, slug: &str) -> Result<()> {
        let index = self
            .saved_pages()
            .iter()
            .position(|(_, page)| page.slug == slug)
            .with_context(|| format!("no page with slug '{slug}'"))?;
        self.page_list_state.select(Some(index));
        self.open_selected_page();
        Ok(())
    }

    fn save(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(draft) = session.draft.clone() else {
            self.status = "Nothing to save".to_string();
            return;
        };

        let edited = session.page.with_content(draft);
        let id = session.id;
        match self.store.run(&mut self.pages, |store| store.begin_update(id, edited.clone())) {
            Ok(Outcome::Committed { undo, .. }) => {
                info!("saved page {id}");
                session.page = edited;
                session.draft = None;
                self.last_undo = Some((id, undo));
                self.status = "Saved (u to undo)".to_string();
            }
            Ok(Outcome::RolledBack { error }) => {
                self.status = format!("Save failed, changes kept locally: {error}");
            }
            Err(e) => {
                self.status = format!("Cannot save: {e}");
            }
        }
        self.store.prune_settled();
    }

    fn undo_last_save(&mut self) {
        let Some((id, undo)) = self.last_undo.take() else {
            self.status = "Nothing to undo".to_string();
            return;
        };
        let open_here = self.session.as_ref().filter(|session| session.id == id);
        if open_here.is_some_and(|session| session.draft.is_some()) {
            self.status = "Save or discard the unsaved changes before undoing".to_string();
            self.last_undo = Some((id, undo));
            return;
        }
        let reopen = open_here.is_some();

        match self.store.run(&mut self.pages, |store| store.undo(undo)) {
            Ok(Outcome::Committed { .. }) => {
                self.status = "Last save undone".to_string();
                if reopen && let Some(page) = self.store.get_saved(id).cloned() {
                    self.session = Some(Session::open(id, page, self.placeholder.as_deref()));
                }
            }
            Ok(Outcome::RolledBack { error }) => {
                self.status = format!("Undo failed: {error}");
            }
            Err(e) => {
                self.status = format!("Cannot undo: {e}");
            }
        }
        self.store.prune_settled();
    }

    fn start_input(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        match session.input_for_selection() {
            Some(input) => self.input = Some(input),
            None => self.status = "Nothing to edit here".to_string(),
        }
    }

    fn finish_input(&mut self) {
        let (Some(input), Some(session)) = (self.input.take(), self.session.as_mut()) else {
            return;
        };
        if !session.apply_input(&input) {
            self.status = format!("'{}' is not a valid value for this block", input.buffer);
        }
    }

    fn close_session(&mut self) {
        if self
            .session
            .as_ref()
            .is_some_and(|session| session.draft.is_some())
        {
            self.status = "Unsaved changes discarded".to_string();
        } else {
            self.status.clear();
        }
        self.session = None;
    }
}

fn main() -> Result<()> {
    // Silent unless RUST_LOG is set; stderr shares the terminal with the editor
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Off)
        .parse_default_env()
        .init();
    info!("osteo-site-cli starting up");

    // Content path from CLI args or config file, then an optional page slug
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} [content-folder-path] [page-slug]", args[0]);
            process::exit(1);
        }
    };

    let (content_path, slug) = match (args.get(1), args.get(2), &config) {
        (Some(path), slug, _) if args.len() <= 3 => (PathBuf::from(path), slug.cloned()),
        (None, _, Some(config)) => (config.content_path.clone(), None),
        (None, _, None) => {
            eprintln!("Error: No content path provided and no config file found");
            eprintln!("Usage: {} <content-folder-path> [page-slug]", args[0]);
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [content-folder-path] [page-slug]", args[0]);
            process::exit(1);
        }
    };

    if let Err(e) = io::validate_content_dir(&content_path) {
        eprintln!(
            "Error: Content path '{}' is invalid: {e}",
            content_path.display()
        );
        process::exit(1);
    }

    let placeholder = config
        .as_ref()
        .and_then(Config::placeholder)
        .map(str::to_string);
    let mut app = App::new(content_path, placeholder)?;
    if let Some(slug) = slug {
        app.open_page_by_slug(&slug)?;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };

        if let Some(input) = app.input.as_mut() {
            match key.code {
                KeyCode::Enter => app.finish_input(),
                KeyCode::Esc => app.input = None,
                KeyCode::Backspace => {
                    input.buffer.pop();
                }
                KeyCode::Char(c) => input.buffer.push(c),
                _ => {}
            }
            continue;
        }

        if app.session.is_none() {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_page(true),
                KeyCode::Up | KeyCode::Char('k') => app.next_page(false),
                KeyCode::Enter => app.open_selected_page(),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') => return Ok(()),
            KeyCode::Esc => app.close_session(),
            KeyCode::Char('s') => app.save(),
            KeyCode::Char('u') => app.undo_last_save(),
            KeyCode::Char('e') => app.start_input(),
            code => {
                let Some(session) = app.session.as_mut() else {
                    continue;
                };
                match code {
                    KeyCode::Down | KeyCode::Char('j') => session.step(true),
                    KeyCode::Up | KeyCode::Char('k') => session.step(false),
                    KeyCode::Char('t') => session.insert_after_selection(BlockKind::Text),
                    KeyCode::Char('i') => session.insert_after_selection(BlockKind::Image),
                    KeyCode::Char('r') => session.insert_after_selection(BlockKind::Row),
                    KeyCode::Char('c') => {
                        if !session.insert_into_selection() {
                            app.status = "Only rows can hold blocks".to_string();
                        }
                    }
                    KeyCode::Char('J') => session.shift_selection(true),
                    KeyCode::Char('K') => session.shift_selection(false),
                    KeyCode::Char('d') => session.delete_selection(),
                    _ => {}
                }
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(rows[0]);

    if app.session.is_none() {
        let page_items: Vec<ListItem> = app
            .saved_pages()
            .iter()
            .map(|(_, page)| {
                ListItem::new(Line::from(vec![Span::raw(format!(
                    "{}  /{}",
                    page.title, page.slug
                ))]))
            })
            .collect();
        let pages_list = List::new(page_items)
            .block(Panel::default().borders(Borders::ALL).title("Pages"))
            .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
        f.render_stateful_widget(pages_list, chunks[0], &mut app.page_list_state);

        let hint = Paragraph::new("Select a page and press Enter to edit it")
            .block(Panel::default().borders(Borders::ALL).title("Preview"));
        f.render_widget(hint, chunks[1]);
    } else if let Some(session) = app.session.as_mut() {
        let block_items: Vec<ListItem> = session
            .outline
            .iter()
            .map(|(id, depth)| {
                let indent = "  ".repeat(*depth);
                let label = session.label(*id, &app.images);
                ListItem::new(Line::from(vec![Span::raw(format!("{indent}{label}"))]))
            })
            .collect();
        let marker = if session.draft.is_some() { " *" } else { "" };
        let outline = List::new(block_items)
            .block(
                Panel::default()
                    .borders(Borders::ALL)
                    .title(format!("{}{marker}", session.page.title)),
            )
            .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
        f.render_stateful_widget(outline, chunks[0], &mut session.outline_state);

        let preview = Paragraph::new(render_blocks(&session.body(), &app.images))
            .block(Panel::default().borders(Borders::ALL).title("HTML"))
            .wrap(Wrap { trim: true });
        f.render_widget(preview, chunks[1]);
    }

    let help = if app.input.is_some() {
        "Enter: Apply | Esc: Cancel"
    } else if app.session.is_some() {
        "q: Quit | Esc: Pages | j/k: Move | e: Edit | t/i/r: Add text/image/row | c: Add into row | J/K: Reorder | d: Delete | s: Save | u: Undo save"
    } else {
        "q: Quit | ↑/k: Previous | ↓/j: Next | Enter: Edit"
    };
    let status = match &app.input {
        Some(input) if input.raw_html => format!("html> {}", input.buffer),
        Some(input) => format!("> {}", input.buffer),
        None => app.status.clone(),
    };
    let footer = Paragraph::new(vec![
        Line::from(status),
        Line::from(Span::raw(help)),
    ]);
    f.render_widget(footer, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn page() -> Page {
        Page {
            slug: "services".to_string(),
            title: "Soins".to_string(),
            content: vec![
                Block::text("<p>Adultes</p>"),
                Block::row(vec![Block::text("<p>A</p>"), Block::image(4)]),
            ],
        }
    }

    fn typed(text: &str) -> Input {
        Input {
            buffer: text.to_string(),
            raw_html: false,
        }
    }

    fn app_with_pages() -> (TempDir, App) {
        let content_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            content_dir.path().join("pages.json"),
            r#"[
  {"id": 1, "slug": "about", "title": "Le cabinet",
   "content": [{"type": "text", "value": "<p>Bienvenue</p>"}]},
  {"id": 2, "slug": "services", "title": "Soins",
   "content": [{"type": "text", "value": "<p>Adultes</p>"}]}
]"#,
        )
        .unwrap();
        let app = App::new(content_dir.path().to_path_buf(), None).unwrap();
        (content_dir, app)
    }

    fn type_into_selection(app: &mut App, text: &str) {
        let session = app.session.as_mut().unwrap();
        assert!(session.apply_input(&typed(text)));
    }

    fn saved_body(app: &App, id: ItemId) -> Vec<Block> {
        app.store.get_saved(id).unwrap().content.clone()
    }

    #[test]
    fn test_plain_text_drops_tags() {
        assert_eq!(plain_text("<p><strong>Dos</strong> et nuque</p>"), "Dos et nuque");
    }

    #[test]
    fn test_paragraph_text() {
        assert_eq!(paragraph_text("<p>Dos &amp; nuque</p>").as_deref(), Some("Dos & nuque"));
        assert_eq!(paragraph_text("<p><em>Dos</em></p>"), None);
        assert_eq!(paragraph_text("<p>A</p><p>B</p>"), None);
        assert_eq!(paragraph_text("<h2>Soins</h2>"), None);
    }

    #[test]
    fn test_session_starts_on_first_block() {
        let session = Session::open(1, page(), None);

        assert_eq!(session.outline.len(), 4);
        assert_eq!(session.outline_state.selected(), Some(0));
        assert!(session.draft.is_none());
    }

    #[test]
    fn test_insert_after_selection_produces_draft() {
        let mut session = Session::open(1, page(), Some("<p>…</p>"));

        session.insert_after_selection(BlockKind::Text);

        assert_eq!(
            session.draft.as_ref().unwrap()[1],
            Block::text("<p>…</p>")
        );
        assert_eq!(session.outline_state.selected(), Some(1));
    }

    #[test]
    fn test_insert_into_text_is_refused() {
        let mut session = Session::open(1, page(), None);

        assert!(!session.insert_into_selection());
        assert!(session.draft.is_none());
    }

    #[test]
    fn test_plain_paragraph_is_edited_as_text() {
        let session = Session::open(1, page(), None);

        assert_eq!(session.input_for_selection(), Some(typed("Adultes")));
    }

    #[test]
    fn test_row_has_no_input() {
        let mut session = Session::open(1, page(), None);
        let row = session.outline[1].0;
        session.tree.select(row);

        assert_eq!(session.input_for_selection(), None);
    }

    #[test]
    fn test_apply_input_escapes_text() {
        let mut session = Session::open(1, page(), None);

        assert!(session.apply_input(&typed("Dos & nuque")));
        assert_eq!(
            session.body()[0],
            Block::text("<p>Dos &amp; nuque</p>")
        );
    }

    #[test]
    fn test_formatted_block_is_edited_as_html() {
        let formatted = "<h2>Soins</h2><p><em>Dos</em> et nuque</p>";
        let mut session = Session::open(
            1,
            Page {
                content: vec![Block::text(formatted)],
                ..page()
            },
            None,
        );

        let mut input = session.input_for_selection().unwrap();
        assert!(input.raw_html);
        assert_eq!(input.buffer, formatted);

        input.buffer = input.buffer.replace("Dos", "Épaules");
        assert!(session.apply_input(&input));
        assert_eq!(
            session.body(),
            vec![Block::text("<h2>Soins</h2><p><em>Épaules</em> et nuque</p>")]
        );
    }

    #[test]
    fn test_apply_input_sets_image_id() {
        let mut session = Session::open(1, page(), None);
        let image = session.outline[3].0;
        session.tree.select(image);

        assert!(!session.apply_input(&typed("logo")));
        assert!(session.apply_input(&typed("7")));
        assert_eq!(
            session.body()[1],
            Block::row(vec![Block::text("<p>A</p>"), Block::image(7)])
        );
    }

    #[test]
    fn test_shift_and_delete() {
        let mut session = Session::open(1, page(), None);

        session.shift_selection(true);
        assert_eq!(session.body()[1], Block::text("<p>Adultes</p>"));

        session.delete_selection();
        assert_eq!(session.body().len(), 1);
    }

    #[test]
    fn test_undo_reopens_the_saved_page() {
        let (_content_dir, mut app) = app_with_pages();
        app.open_page_by_slug("about").unwrap();
        type_into_selection(&mut app, "Bonjour");
        app.save();
        assert_eq!(saved_body(&app, 1), vec![Block::text("<p>Bonjour</p>")]);

        app.undo_last_save();

        assert_eq!(saved_body(&app, 1), vec![Block::text("<p>Bienvenue</p>")]);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.body(), vec![Block::text("<p>Bienvenue</p>")]);
        assert!(session.draft.is_none());
    }

    #[test]
    fn test_undo_is_refused_while_the_page_has_unsaved_changes() {
        let (_content_dir, mut app) = app_with_pages();
        app.open_page_by_slug("about").unwrap();
        type_into_selection(&mut app, "Bonjour");
        app.save();
        type_into_selection(&mut app, "Encore");

        app.undo_last_save();

        assert!(app.last_undo.is_some());
        assert_eq!(saved_body(&app, 1), vec![Block::text("<p>Bonjour</p>")]);
        assert_eq!(
            app.session.as_ref().unwrap().draft,
            Some(vec![Block::text("<p>Encore</p>")])
        );
    }

    #[test]
    fn test_undo_of_another_page_keeps_the_open_draft() {
        let (_content_dir, mut app) = app_with_pages();
        app.open_page_by_slug("about").unwrap();
        type_into_selection(&mut app, "Bonjour");
        app.save();
        app.close_session();
        app.open_page_by_slug("services").unwrap();
        type_into_selection(&mut app, "Enfants");

        app.undo_last_save();

        assert!(app.last_undo.is_none());
        assert_eq!(saved_body(&app, 1), vec![Block::text("<p>Bienvenue</p>")]);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.id, 2);
        assert_eq!(session.draft, Some(vec![Block::text("<p>Enfants</p>")]));
    }
}
