//! Site-wide listing of lessons and info pages.

use serde::Serialize;

use crate::content::ContentDocument;
use crate::repository::{ContentRepository, RepositoryError};

pub const LESSONS_FOLDER: &str = "lessons";
pub const INFO_FOLDER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonItem {
    pub slug: String,
    pub alias: String,
    pub order: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoItem {
    pub slug: String,
    pub alias: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub lessons: Vec<LessonItem>,
    pub info: Vec<InfoItem>,
}

impl Catalog {
    /// Lessons in order plus one entry per info page directory, titled in the
    /// first of `languages` that page exists in.
    pub fn build<S: AsRef<str>>(
        repo: &ContentRepository,
        languages: &[S],
    ) -> Result<Self, RepositoryError> {
        let mut lessons = Vec::new();
        for entry in repo.list_documents(LESSONS_FOLDER)? {
            let doc = repo.get_by_alias(LESSONS_FOLDER, &entry.alias)?;
            let title = doc
                .as_ref()
                .and_then(document_title)
                .unwrap_or_else(|| format!("Lesson {}", entry.alias));
            lessons.push(LessonItem {
                slug: entry.slug,
                alias: entry.alias,
                order: entry.order,
                title,
            });
        }

        let mut info = Vec::new();
        for page in repo.list_subfolders(INFO_FOLDER)? {
            let doc = repo.get_by_language(&format!("{INFO_FOLDER}/{page}"), languages)?;
            let title = doc
                .as_ref()
                .and_then(document_title)
                .unwrap_or_else(|| page.clone());
            info.push(InfoItem {
                slug: page.clone(),
                alias: page,
                title,
            });
        }

        Ok(Self { lessons, info })
    }
}

/// First level-one heading, else the frontmatter title.
fn document_title(doc: &ContentDocument) -> Option<String> {
    doc.first_heading()
        .or_else(|| doc.meta.title())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_content_dir, create_test_file};
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_lessons_and_info_pages() {
        let dir = create_content_dir();
        create_test_file(
            &dir,
            "lessons/02.md",
            "---\nalias: verbs\norder: 2\n---\n# Verbs\nI go / ай гоу",
        );
        create_test_file(
            &dir,
            "lessons/01.md",
            "---\nalias: hello\norder: 1\n---\n## No top heading\nHi",
        );
        create_test_file(&dir, "info/about/en.md", "# About us");
        create_test_file(&dir, "info/about/ru.md", "# О нас");
        create_test_file(&dir, "info/empty/de.md", "no heading");

        let repo = ContentRepository::open(dir.path()).unwrap();
        let catalog = Catalog::build(&repo, &["ru"]).unwrap();

        assert_eq!(
            catalog.lessons,
            vec![
                LessonItem {
                    slug: "01".into(),
                    alias: "hello".into(),
                    order: 1,
                    title: "Lesson hello".into(),
                },
                LessonItem {
                    slug: "02".into(),
                    alias: "verbs".into(),
                    order: 2,
                    title: "Verbs".into(),
                },
            ]
        );
        assert_eq!(
            catalog.info,
            vec![
                InfoItem {
                    slug: "about".into(),
                    alias: "about".into(),
                    title: "О нас".into(),
                },
                InfoItem {
                    slug: "empty".into(),
                    alias: "empty".into(),
                    title: "empty".into(),
                },
            ]
        );
    }

    #[test]
    fn frontmatter_title_used_without_heading() {
        let dir = create_content_dir();
        create_test_file(
            &dir,
            "lessons/x.md",
            "---\nalias: x\ntitle: Numbers\n---\nOne / уан",
        );

        let repo = ContentRepository::open(dir.path()).unwrap();
        let catalog = Catalog::build(&repo, &["en"]).unwrap();
        assert_eq!(catalog.lessons[0].title, "Numbers");
    }

    #[test]
    fn empty_content_root_gives_empty_catalog() {
        let dir = create_content_dir();
        let repo = ContentRepository::open(dir.path()).unwrap();
        assert_eq!(Catalog::build(&repo, &["en"]).unwrap(), Catalog::default());
    }
}
