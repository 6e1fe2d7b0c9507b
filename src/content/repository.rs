//! Post repository - the read-only query surface over the content directory
//!
//! Nothing is cached: every call re-reads the directory, so adding or
//! removing a `<slug>.md` file is visible on the next query.

use percent_encoding::percent_decode_str;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Post, PostMetadata};
use crate::error::{Error, Result};
use crate::helpers::normalize_tag;

/// Query operations over a set of posts.
///
/// Only `list_posts` and `get_post_by_slug` touch storage; tag, search and
/// tag-list queries are derived from the published listing.
pub trait PostRepository {
    /// Published posts, newest first (plain string comparison of `date`)
    fn list_posts(&self) -> Vec<PostMetadata>;

    /// A single rendered post, or `None` when it does not exist or fails
    fn get_post_by_slug(&self, slug: &str) -> Option<Post>;

    /// Published posts carrying `tag`, ignoring case and whitespace style
    fn get_posts_by_tag(&self, tag: &str) -> Vec<PostMetadata> {
        let wanted = normalize_tag(tag);
        self.list_posts()
            .into_iter()
            .filter(|post| post.tags.iter().any(|t| normalize_tag(t) == wanted))
            .collect()
    }

    /// Published posts whose title or a tag contains `query`, ignoring case.
    /// An empty query matches every post.
    fn search_posts(&self, query: &str) -> Vec<PostMetadata> {
        self.list_posts()
            .into_iter()
            .filter(|post| post.matches_query(query))
            .collect()
    }

    /// Distinct tags of all published posts, sorted
    fn list_tags(&self) -> Vec<String> {
        self.list_posts()
            .into_iter()
            .flat_map(|post| post.tags)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Repository backed by a directory of `<slug>.md` files
#[derive(Clone)]
pub struct FsPostRepository {
    content_dir: PathBuf,
    renderer: Arc<MarkdownRenderer>,
}

impl FsPostRepository {
    pub fn new<P: Into<PathBuf>>(content_dir: P, renderer: Arc<MarkdownRenderer>) -> Self {
        Self {
            content_dir: content_dir.into(),
            renderer,
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Load and render a post, reporting why it could not be loaded
    pub fn load_post(&self, slug: &str) -> Result<Post> {
        let decoded = decode_slug(slug)?;
        let path = self.content_dir.join(format!("{}.md", decoded));
        if !path.is_file() {
            return Err(Error::NotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(&path)?;
        let (fm, body) = FrontMatter::parse(&content);
        let rendered = self.renderer.render_document(body)?;

        Ok(Post {
            // The caller's slug is kept as given, encoded or not
            metadata: PostMetadata::from_front_matter(slug, &fm),
            content: rendered.html,
            toc: rendered.toc,
        })
    }

    fn load_metadata(&self, path: &Path, slug: &str) -> Result<PostMetadata> {
        let content = fs::read_to_string(path)?;
        let (fm, _) = FrontMatter::parse(&content);
        Ok(PostMetadata::from_front_matter(slug, &fm))
    }
}

impl PostRepository for FsPostRepository {
    fn list_posts(&self) -> Vec<PostMetadata> {
        if !self.content_dir.is_dir() {
            tracing::debug!("Content directory {:?} does not exist", self.content_dir);
            return Vec::new();
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&self.content_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(slug) = slug_from_path(path) else {
                continue;
            };

            match self.load_metadata(path, slug) {
                Ok(post) => posts.push(post),
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {}", path, e);
                }
            }
        }

        posts.retain(|post| post.published);

        // Stable sort: equal dates keep file-name order
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        posts
    }

    fn get_post_by_slug(&self, slug: &str) -> Option<Post> {
        match self.load_post(slug) {
            Ok(post) => Some(post),
            Err(e @ (Error::NotFound(_) | Error::InvalidSlug(_))) => {
                tracing::debug!("Post {:?} not available: {}", slug, e);
                None
            }
            Err(e) => {
                tracing::error!("Error getting post by slug {}: {}", slug, e);
                None
            }
        }
    }
}

/// Slug of a `<slug>.md` file, if the path is one
fn slug_from_path(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(".md"))
        .filter(|slug| !slug.is_empty())
}

/// Percent-decode a slug and make sure it names a file directly inside the
/// content directory
fn decode_slug(slug: &str) -> Result<String> {
    let decoded = percent_decode_str(slug)
        .decode_utf8()
        .map_err(|_| Error::InvalidSlug(slug.to_string()))?;

    let unsafe_path = decoded.is_empty()
        || decoded == "."
        || decoded == ".."
        || decoded.contains(['/', '\\', '\0']);
    if unsafe_path {
        return Err(Error::InvalidSlug(slug.to_string()));
    }

    Ok(decoded.into_owned())
}
