//! Turning markdown files into typed content.
//!
//! [`frontmatter::parse`] splits a file into metadata and body,
//! [`blocks::Segmenter`] cuts the body into classified blocks and
//! [`render`] shapes those blocks for display.

pub mod blocks;
pub mod frontmatter;
pub mod render;
pub mod sentence;

pub use blocks::{BlockKind, ContentBlock, Segmenter, segment, split_sections};
pub use frontmatter::{ContentDocument, Meta, MetaValue, parse};
pub use render::{RenderedBlock, render_block, render_blocks, render_inline};
pub use sentence::{Sentence, TranslationLine};
