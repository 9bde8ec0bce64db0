use lingvo_config::Config;
use lingvo_engine::{BlockKind, ContentRepository, INFO_FOLDER, RepositoryError, Segmenter};
use std::sync::Arc;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<Site>,
}

#[derive(Debug)]
struct Site {
    repo: ContentRepository,
    lessons: Segmenter,
    pages: Segmenter,
}

impl AppState {
    pub fn new(repo: ContentRepository, segmenter: Segmenter) -> Self {
        let pages = segmenter.clone().with_default_kind(BlockKind::Paragraph);
        Self {
            inner: Arc::new(Site {
                repo,
                lessons: segmenter.with_default_kind(BlockKind::Audio),
                pages,
            }),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, RepositoryError> {
        let repo = ContentRepository::open(&config.content_path)?
            .with_default_language(config.default_language.clone());
        let segmenter =
            Segmenter::new().with_translation_titles(config.translation_titles.iter().cloned());
        Ok(Self::new(repo, segmenter))
    }

    pub fn repository(&self) -> &ContentRepository {
        &self.inner.repo
    }

    /// Info pages are prose; everything else is read aloud.
    pub fn segmenter_for(&self, folder: &str) -> &Segmenter {
        if folder == INFO_FOLDER || folder.starts_with("info/") {
            &self.inner.pages
        } else {
            &self.inner.lessons
        }
    }
}
