//! Search index export
//!
//! The index is a JSON array of lightweight post metadata that the browser
//! fetches once and filters locally, using the same predicate as
//! [`PostRepository::search_posts`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::content::{matches_query, PostMetadata, PostRepository};
use crate::error::Result;

/// One entry of the exported search index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub cover_image: String,
}

impl From<PostMetadata> for SearchEntry {
    fn from(post: PostMetadata) -> Self {
        Self {
            slug: post.slug,
            title: post.title,
            date: post.date,
            tags: post.tags,
            cover_image: post.cover_image,
        }
    }
}

/// The full index, in listing order (newest first)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchIndex {
    pub entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Build the index from the published listing
    pub fn build<R: PostRepository + ?Sized>(repo: &R) -> Self {
        Self {
            entries: repo.list_posts().into_iter().map(SearchEntry::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Client-side filter: case-insensitive substring on title or tags
    pub fn filter(&self, query: &str) -> Vec<&SearchEntry> {
        self.entries
            .iter()
            .filter(|entry| matches_query(&entry.title, &entry.tags, query))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the index to `path`, replacing any previous file.
    ///
    /// The JSON goes to a sibling temporary file first and is renamed into
    /// place, so a failed write leaves the old artifact intact.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = temp_path_for(path);
        let result = (|| -> Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Recompute the index and write it to every target. Stops at the first
/// failed write.
pub fn export<R: PostRepository + ?Sized>(repo: &R, targets: &[PathBuf]) -> Result<SearchIndex> {
    let index = SearchIndex::build(repo);
    for target in targets {
        index.write_to(target)?;
        tracing::info!("Wrote search index ({} posts) to {:?}", index.len(), target);
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{FsPostRepository, MarkdownRenderer};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, FsPostRepository) {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("rust-intro.md"),
            "---\ntitle: Rust Intro\ndate: 2024-02-01\ntags: [Rust]\ncoverImage: /c.png\n---\nbody",
        )
        .unwrap();
        fs::write(
            posts.join("go-tips.md"),
            "---\ntitle: Go tips\ndate: 2024-01-01\ntags: [Go, Tooling]\n---\nbody",
        )
        .unwrap();
        fs::write(
            posts.join("hidden.md"),
            "---\ntitle: Hidden Rust\npublished: false\n---\nbody",
        )
        .unwrap();
        let repo = FsPostRepository::new(posts, Arc::new(MarkdownRenderer::new()));
        (dir, repo)
    }

    #[test]
    fn test_build_index() {
        let (_dir, repo) = fixture();
        let index = SearchIndex::build(&repo);
        let slugs: Vec<_> = index.entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["rust-intro", "go-tips"]);
        assert_eq!(index.entries[0].cover_image, "/c.png");
        assert_eq!(index.entries[1].cover_image, "");
    }

    #[test]
    fn test_json_shape() {
        let (_dir, repo) = fixture();
        let json = SearchIndex::build(&repo).to_json().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains(r#""coverImage":"/c.png""#));
        assert!(!json.contains("published"));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_filter_agrees_with_search_posts() {
        let (_dir, repo) = fixture();
        let index = SearchIndex::build(&repo);
        for query in ["rust", "GO", "tool", "", "nothing"] {
            let from_index: Vec<_> = index.filter(query).iter().map(|e| e.slug.clone()).collect();
            let from_repo: Vec<_> = repo.search_posts(query).into_iter().map(|p| p.slug).collect();
            assert_eq!(from_index, from_repo, "query {:?}", query);
        }
    }

    #[test]
    fn test_export_writes_all_targets() {
        let (dir, repo) = fixture();
        let public = dir.path().join("public/search-data.json");
        let out = dir.path().join("out/search-data.json");

        let index = export(&repo, &[public.clone(), out.clone()]).unwrap();
        assert_eq!(index.len(), 2);

        let written = SearchIndex::from_json(&fs::read_to_string(&public).unwrap()).unwrap();
        assert_eq!(written, index);
        assert_eq!(fs::read_to_string(&public).unwrap(), fs::read_to_string(&out).unwrap());
        assert!(!dir.path().join("public/search-data.json.tmp").exists());
    }

    #[test]
    fn test_export_overwrites() {
        let (dir, repo) = fixture();
        let target = dir.path().join("search-data.json");
        fs::write(&target, "stale").unwrap();
        export(&repo, &[target.clone()]).unwrap();
        assert!(fs::read_to_string(&target).unwrap().contains("rust-intro"));
    }

    #[test]
    fn test_failed_write_is_error() {
        let (dir, repo) = fixture();
        // a regular file where a directory is expected
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let result = export(&repo, &[blocker.join("search-data.json")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_content_dir_exports_empty_array() {
        let dir = TempDir::new().unwrap();
        let repo = FsPostRepository::new(dir.path().join("none"), Arc::new(MarkdownRenderer::new()));
        let target = dir.path().join("search-data.json");
        export(&repo, &[target.clone()]).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "[]");
    }
}
