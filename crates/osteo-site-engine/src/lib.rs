pub mod editing;
pub mod io;
pub mod models;
pub mod site;
pub mod store;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{Block, BlockId, BlockKind, BlockTree};
pub use io::{IoError, JsonCollection, Saved, Stored};
pub use models::{Image, Page, Partner, Post, Testimonial};
pub use store::{ItemId, ItemKey, Outcome, Record, Remote, RemoteError, Store, StoreError, Undo};
