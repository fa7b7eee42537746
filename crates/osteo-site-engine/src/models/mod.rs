//! Entities managed from the backoffice

pub mod image;
pub mod page;
pub mod partner;
pub mod post;
pub mod testimonial;

use std::sync::OnceLock;

use regex::Regex;

pub use image::Image;
pub use page::Page;
pub use partner::Partner;
pub use post::Post;
pub use testimonial::Testimonial;

use crate::editing::Block;
use crate::store::ValidationError;

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

/// Lowercase words joined by single dashes, e.g. `soins-enfants`
pub(crate) fn require_slug(field: &'static str, value: &str) -> Result<(), ValidationError> {
    static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    let slug_regex = SLUG_REGEX
        .get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("Invalid slug regex"));

    if !slug_regex.is_match(value) {
        return Err(ValidationError::new(
            field,
            format!("'{value}' is not a valid slug"),
        ));
    }
    Ok(())
}

pub(crate) fn require_http_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ValidationError::new(
            field,
            format!("'{value}' is not an http(s) url"),
        )),
    }
}

/// Image references inside a block tree must point at real catalog ids
pub(crate) fn require_valid_content(
    field: &'static str,
    blocks: &[Block],
) -> Result<(), ValidationError> {
    for block in blocks {
        match block {
            Block::Image { value: Some(id) } if *id <= 0 => {
                return Err(ValidationError::new(
                    field,
                    format!("image reference {id} is not a valid id"),
                ));
            }
            Block::Row { children } => require_valid_content(field, children)?,
            _ => {}
        }
    }
    Ok(())
}
