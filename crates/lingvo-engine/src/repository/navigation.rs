use serde::Serialize;

use super::{ContentRepository, DocumentEntry, RepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationLink {
    pub alias: String,
    pub order: i64,
}

impl From<&DocumentEntry> for NavigationLink {
    fn from(entry: &DocumentEntry) -> Self {
        Self {
            alias: entry.alias.clone(),
            order: entry.order,
        }
    }
}

/// Neighbours of a document in its folder's order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Navigation {
    #[serde(rename = "nextLesson")]
    pub next: Option<NavigationLink>,
    #[serde(rename = "prevLesson")]
    pub prev: Option<NavigationLink>,
}

impl Navigation {
    /// Locate `current` in an order-sorted listing. An unknown alias has no
    /// neighbours.
    pub fn between(entries: &[DocumentEntry], current: &str) -> Self {
        let Some(index) = entries.iter().position(|e| e.alias == current) else {
            return Self::default();
        };
        Self {
            next: entries.get(index + 1).map(NavigationLink::from),
            prev: index
                .checked_sub(1)
                .and_then(|i| entries.get(i))
                .map(NavigationLink::from),
        }
    }
}

impl ContentRepository {
    pub fn next_and_prev(
        &self,
        folder: &str,
        current: &str,
    ) -> Result<Navigation, RepositoryError> {
        let entries = self.list_documents(folder)?;
        Ok(Navigation::between(&entries, current))
    }
}
