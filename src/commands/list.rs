//! List site content

use anyhow::Result;
use std::collections::BTreeMap;

use crate::content::PostRepository;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let repo = folio.repository();

    match content_type {
        "post" | "posts" => {
            let posts = repo.list_posts();
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!("  {} - {} [{}]", post.date, post.title, post.slug);
            }
        }
        "tag" | "tags" => {
            let counts = tag_counts(&repo);
            println!("Tags ({}):", counts.len());
            let mut tags: Vec<_> = counts.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(())
}

/// Published-post count per tag, as written in the posts
fn tag_counts<R: PostRepository + ?Sized>(repo: &R) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for post in repo.list_posts() {
        for tag in post.tags {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_tag_counts_skip_unpublished() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::with_config(tmp.path().to_path_buf(), SiteConfig::default());
        fs::create_dir_all(&folio.content_dir).unwrap();
        fs::write(folio.content_dir.join("a.md"), "---\ntags: [Rust, Go]\n---\n").unwrap();
        fs::write(folio.content_dir.join("b.md"), "---\ntags: [Rust]\n---\n").unwrap();
        fs::write(
            folio.content_dir.join("c.md"),
            "---\ntags: [Go]\npublished: false\n---\n",
        )
        .unwrap();

        let counts = tag_counts(&folio.repository());
        assert_eq!(counts.get("Rust"), Some(&2));
        assert_eq!(counts.get("Go"), Some(&1));
    }

    #[test]
    fn test_unknown_type() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::with_config(tmp.path().to_path_buf(), SiteConfig::default());
        assert!(run(&folio, "category").is_err());
    }
}
