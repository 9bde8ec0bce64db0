pub mod catalog;
pub mod content;
pub mod repository;
pub mod speech;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use catalog::{Catalog, INFO_FOLDER, InfoItem, LESSONS_FOLDER, LessonItem};
pub use content::{
    BlockKind, ContentBlock, ContentDocument, Meta, MetaValue, RenderedBlock, Segmenter, Sentence,
};
pub use repository::{
    ContentRepository, DEFAULT_LANGUAGE, DocumentEntry, Navigation, NavigationLink,
    RepositoryError,
};
