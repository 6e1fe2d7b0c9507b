//! Content module - front-matter, markdown rendering, and the post repository

mod frontmatter;
mod markdown;
mod post;
pub mod repository;

pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, RenderedMarkdown, TocEntry};
pub use post::{keys, matches_query, Post, PostMetadata};
pub use repository::{FsPostRepository, PostRepository};
