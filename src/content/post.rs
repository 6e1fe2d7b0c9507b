//! Post models

use serde::{Deserialize, Serialize};

use super::{FrontMatter, TocEntry};

/// Front-matter keys understood by the post pipeline
pub mod keys {
    pub const TITLE: &str = "title";
    pub const DATE: &str = "date";
    pub const TAGS: &str = "tags";
    pub const PUBLISHED: &str = "published";
    pub const COVER_IMAGE: &str = "coverImage";
}

/// Listing-level data of a post, derived from its file name and front-matter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    /// File name without the `.md` extension
    pub slug: String,

    /// Post title (empty when missing)
    pub title: String,

    /// Date as written in the front-matter, compared as a plain string
    pub date: String,

    /// Tags in source order, case preserved
    pub tags: Vec<String>,

    /// Unpublished posts never appear in listings
    pub published: bool,

    /// Cover image URL (empty when missing)
    pub cover_image: String,
}

impl PostMetadata {
    /// Build metadata, defaulting every missing or malformed field
    pub fn from_front_matter(slug: impl Into<String>, fm: &FrontMatter) -> Self {
        Self {
            slug: slug.into(),
            title: fm.string(keys::TITLE),
            date: fm.string(keys::DATE),
            tags: fm.string_list(keys::TAGS),
            published: fm.bool_or(keys::PUBLISHED, true),
            cover_image: fm.string(keys::COVER_IMAGE),
        }
    }

    /// Case-insensitive substring match on the title or any tag
    pub fn matches_query(&self, query: &str) -> bool {
        matches_query(&self.title, &self.tags, query)
    }
}

/// A fully rendered post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    #[serde(flatten)]
    pub metadata: PostMetadata,

    /// Rendered HTML content
    pub content: String,

    /// Headings of the rendered content, in document order
    pub toc: Vec<TocEntry>,
}

impl Post {
    pub fn slug(&self) -> &str {
        &self.metadata.slug
    }

    /// Get the previous (older) post in a newest-first listing
    pub fn prev<'a>(&self, posts: &'a [PostMetadata]) -> Option<&'a PostMetadata> {
        let pos = posts.iter().position(|p| p.slug == self.metadata.slug)?;
        posts.get(pos + 1)
    }

    /// Get the next (newer) post in a newest-first listing
    pub fn next<'a>(&self, posts: &'a [PostMetadata]) -> Option<&'a PostMetadata> {
        let pos = posts.iter().position(|p| p.slug == self.metadata.slug)?;
        if pos > 0 {
            posts.get(pos - 1)
        } else {
            None
        }
    }
}

/// The search predicate shared by server-side search and the exported index.
/// An empty query matches everything.
pub fn matches_query(title: &str, tags: &[String], query: &str) -> bool {
    let query = query.to_lowercase();
    title.to_lowercase().contains(&query) || tags.iter().any(|t| t.to_lowercase().contains(&query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(slug: &str, title: &str, tags: &[&str]) -> PostMetadata {
        PostMetadata {
            slug: slug.to_string(),
            title: title.to_string(),
            date: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published: true,
            cover_image: String::new(),
        }
    }

    #[test]
    fn test_defaults_from_empty_front_matter() {
        let m = PostMetadata::from_front_matter("hello", &FrontMatter::default());
        assert_eq!(m.slug, "hello");
        assert_eq!(m.title, "");
        assert_eq!(m.date, "");
        assert!(m.tags.is_empty());
        assert!(m.published);
        assert_eq!(m.cover_image, "");
    }

    #[test]
    fn test_serializes_camel_case() {
        let m = meta("a", "A", &["x"]);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["coverImage"], "");
        assert!(json.get("cover_image").is_none());
    }

    #[test]
    fn test_matches_query() {
        let m = meta("a", "Learning Rust", &["Machine Learning"]);
        assert!(m.matches_query("rust"));
        assert!(m.matches_query("MACHINE"));
        assert!(m.matches_query(""));
        assert!(!m.matches_query("python"));
    }

    #[test]
    fn test_prev_next() {
        let posts = vec![meta("new", "", &[]), meta("mid", "", &[]), meta("old", "", &[])];
        let post = Post {
            metadata: posts[1].clone(),
            content: String::new(),
            toc: Vec::new(),
        };
        assert_eq!(post.prev(&posts).map(|p| p.slug.as_str()), Some("old"));
        assert_eq!(post.next(&posts).map(|p| p.slug.as_str()), Some("new"));

        let newest = Post {
            metadata: posts[0].clone(),
            content: String::new(),
            toc: Vec::new(),
        };
        assert!(newest.next(&posts).is_none());
    }
}
