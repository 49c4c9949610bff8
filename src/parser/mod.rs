//! Line-level parsing of Obsidian notes.
//!
//! Everything here works on single lines or on a [`crate::model::Document`]
//! and never touches the filesystem.

mod assets;
pub mod classify;
pub mod frontmatter;
pub mod math;
mod options;
pub mod table;

pub use assets::AssetMatcher;
pub use classify::{HeadingLevel, LineKind};
pub use options::{
    ConvertOptions, ErrorMode, UnderscoreStyle, DEFAULT_DRAWING_EXTENSION,
    DEFAULT_IMAGE_EXTENSIONS,
};
