//! HTML rendering of block content for the public site

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use log::warn;

use crate::editing::{Block, ImageId};
use crate::models::{Image, Page, Post};
use crate::store::Store;

/// Lookup of image library entries by id
pub trait ImageCatalog {
    fn image(&self, id: ImageId) -> Option<&Image>;
}

impl ImageCatalog for Store<Image> {
    fn image(&self, id: ImageId) -> Option<&Image> {
        self.get_saved(id)
    }
}

/// Render a block array to an HTML fragment.
///
/// Text values are emitted verbatim since they are sanitized on edit.
/// Image blocks without a value, or pointing at an unknown image, render
/// nothing.
pub fn render_blocks(blocks: &[Block], catalog: &impl ImageCatalog) -> String {
    let mut html = String::new();
    for block in blocks {
        render_block(&mut html, block, catalog);
    }
    html
}

fn render_block(html: &mut String, block: &Block, catalog: &impl ImageCatalog) {
    match block {
        Block::Text { value } => html.push_str(value),
        Block::Image { value: None } => {}
        Block::Image { value: Some(id) } => match catalog.image(*id) {
            Some(image) => render_image(html, image),
            None => warn!("image {id} is not in the catalog, skipping"),
        },
        Block::Row { children } => {
            html.push_str(r#"<div class="row">"#);
            for child in children {
                html.push_str(r#"<div class="col">"#);
                render_block(html, child, catalog);
                html.push_str("</div>");
            }
            html.push_str("</div>");
        }
    }
}

fn render_image(html: &mut String, image: &Image) {
    let _ = write!(
        html,
        r#"<figure><img src="{}" alt="{}""#,
        encode_double_quoted_attribute(&image.url()),
        encode_double_quoted_attribute(&image.alt)
    );
    if let Some(width) = image.width {
        let _ = write!(html, r#" width="{width}""#);
    }
    if let Some(height) = image.height {
        let _ = write!(html, r#" height="{height}""#);
    }
    html.push_str("></figure>");
}

/// Full page body with its title
pub fn render_page(page: &Page, catalog: &impl ImageCatalog) -> String {
    format!(
        "<article><h1>{}</h1>{}</article>",
        encode_text(&page.title),
        render_blocks(&page.content, catalog)
    )
}

/// Published post with title and summary; unpublished posts render as `None`
pub fn render_post(post: &Post, catalog: &impl ImageCatalog) -> Option<String> {
    if !post.published {
        return None;
    }
    Some(format!(
        r#"<article><h1>{}</h1><p class="summary">{}</p>{}</article>"#,
        encode_text(&post.title),
        encode_text(&post.summary),
        render_blocks(&post.content, catalog)
    ))
}
