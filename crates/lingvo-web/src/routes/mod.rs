mod content;
mod documents;
mod health;
mod lessons;

pub use content::content_routes;
pub use documents::document_routes;
pub use health::health_routes;
pub use lessons::lesson_routes;
