//! Static export: renders every page route into `out_dir` as `index.html` files

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::content::{FsPostRepository, PostRepository};
use crate::helpers::{encode_segment, normalize_tag, Paginator};
use crate::pages::{HomePage, ListingPage, PostPage, SearchPage, TagPage, TagsPage};
use crate::templates;
use crate::Folio;

/// Counts reported after an export
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateStats {
    pub pages: usize,
    pub posts: usize,
    pub tags: usize,
    pub assets: usize,
}

/// Static site generator
pub struct Generator {
    folio: Folio,
    repo: FsPostRepository,
}

impl Generator {
    pub fn new(folio: &Folio) -> Self {
        Self {
            folio: folio.clone(),
            repo: folio.repository(),
        }
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<GenerateStats> {
        let out_dir = &self.folio.out_dir;
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {:?}", out_dir))?;

        let mut stats = GenerateStats::default();

        // Assets first so rendered pages win on path collisions
        stats.assets = self.copy_public_assets()?;

        self.generate_home(&mut stats)?;
        self.generate_listing_pages(&mut stats)?;
        self.generate_post_pages(&mut stats)?;
        self.generate_tag_pages(&mut stats)?;
        self.generate_search_page(&mut stats)?;
        self.write_not_found()?;

        let target = out_dir.join(&self.folio.config.search_index);
        crate::search::export(&self.repo, &[target])?;

        Ok(stats)
    }

    fn config(&self) -> &crate::config::SiteConfig {
        &self.folio.config
    }

    fn generate_home(&self, stats: &mut GenerateStats) -> Result<()> {
        let page = HomePage::build(&self.repo, self.config());
        self.write_page("", &templates::render_home(self.config(), &page), stats)
    }

    fn generate_listing_pages(&self, stats: &mut GenerateStats) -> Result<()> {
        let per_page = self.config().per_page;
        let listing = ListingPage::build(&self.repo, None, per_page)?;
        self.write_page("posts", &templates::render_listing(self.config(), &listing), stats)?;

        let total_pages = Paginator::new(listing.total_posts, per_page).total_pages();
        for n in 1..=total_pages {
            let page = ListingPage::build(&self.repo, Some(n), per_page)?;
            self.write_page(
                &format!("posts/page/{}", n),
                &templates::render_listing(self.config(), &page),
                stats,
            )?;
        }

        Ok(())
    }

    fn generate_post_pages(&self, stats: &mut GenerateStats) -> Result<()> {
        for meta in self.repo.list_posts() {
            if !is_plain_segment(&meta.slug) {
                tracing::warn!("Skipping post {:?}: not usable as a directory name", meta.slug);
                continue;
            }
            // Page models take the slug as it appears in a URL
            let page = match PostPage::build(&self.repo, &encode_segment(&meta.slug)) {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Skipping post {}: {}", meta.slug, e);
                    continue;
                }
            };
            self.write_page(
                &format!("posts/{}", meta.slug),
                &templates::render_post(self.config(), &page),
                stats,
            )?;
            stats.posts += 1;
        }

        tracing::info!("Generated {} post pages", stats.posts);
        Ok(())
    }

    fn generate_tag_pages(&self, stats: &mut GenerateStats) -> Result<()> {
        let tags = TagsPage::build(&self.repo);
        self.write_page("tags", &templates::render_tags(self.config(), &tags), stats)?;

        let per_page = self.config().per_page;
        // Tags that normalize to the same path share one page
        let normalized: BTreeSet<String> = tags
            .tags
            .iter()
            .map(|t| normalize_tag(t))
            .filter(|t| {
                let ok = is_plain_segment(t);
                if !ok {
                    tracing::warn!("Skipping tag {:?}: not usable as a directory name", t);
                }
                ok
            })
            .collect();

        for tag in &normalized {
            let segment = encode_segment(tag);
            let first = match TagPage::build(&self.repo, &segment, 1, per_page) {
                Ok(page) => page,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e.into()),
            };
            let total_pages = first.links.total_pages;
            self.write_page(
                &format!("tags/{}", tag),
                &templates::render_tag(self.config(), &first),
                stats,
            )?;

            for n in 1..=total_pages {
                let page = TagPage::build(&self.repo, &segment, n, per_page)?;
                self.write_page(
                    &format!("tags/{}/page/{}", tag, n),
                    &templates::render_tag(self.config(), &page),
                    stats,
                )?;
            }
            stats.tags += 1;
        }

        tracing::info!("Generated {} tag pages", stats.tags);
        Ok(())
    }

    fn generate_search_page(&self, stats: &mut GenerateStats) -> Result<()> {
        let page = SearchPage::build(&self.repo, "", None, self.config().per_page)?;
        self.write_page("search", &templates::render_search(self.config(), &page), stats)
    }

    fn write_not_found(&self) -> Result<()> {
        let path = self.folio.out_dir.join("404.html");
        fs::write(&path, templates::render_not_found(self.config()))
            .with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    /// Write `html` to `<out_dir>/<route>/index.html`
    fn write_page(&self, route: &str, html: &str, stats: &mut GenerateStats) -> Result<()> {
        let output_path = route_output_path(&self.folio.out_dir, route);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        stats.pages += 1;
        Ok(())
    }

    /// Copy everything under `public_dir` into `out_dir`
    fn copy_public_assets(&self) -> Result<usize> {
        let public_dir = &self.folio.public_dir;
        if !public_dir.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(public_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(public_dir)?;
            let dest = self.folio.out_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest).with_context(|| format!("Failed to copy {:?}", path))?;
            copied += 1;
        }

        Ok(copied)
    }
}

/// Whether `segment` maps to exactly one directory under `out_dir`
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

fn route_output_path(out_dir: &Path, route: &str) -> PathBuf {
    let route = route.trim_matches('/');
    if route.is_empty() {
        out_dir.join("index.html")
    } else {
        out_dir.join(route).join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn write_post(dir: &Path, slug: &str, front_matter: &str) {
        fs::write(
            dir.join(format!("{}.md", slug)),
            format!("---\n{}\n---\n# Heading\n\nBody text.\n", front_matter),
        )
        .unwrap();
    }

    fn site() -> (TempDir, Folio) {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::with_config(tmp.path().to_path_buf(), SiteConfig::default());
        fs::create_dir_all(&folio.content_dir).unwrap();
        fs::create_dir_all(folio.public_dir.join("css")).unwrap();
        fs::write(folio.public_dir.join("css/style.css"), "body {}").unwrap();
        (tmp, folio)
    }

    #[test]
    fn test_route_output_path() {
        let out = Path::new("/out");
        assert_eq!(route_output_path(out, ""), PathBuf::from("/out/index.html"));
        assert_eq!(
            route_output_path(out, "/posts/page/2/"),
            PathBuf::from("/out/posts/page/2/index.html")
        );
    }

    #[test]
    fn test_is_plain_segment() {
        assert!(is_plain_segment("machine-learning"));
        assert!(!is_plain_segment(".."));
        assert!(!is_plain_segment("a/b"));
        assert!(!is_plain_segment(""));
    }

    #[test]
    fn test_generate_site() {
        let (_tmp, folio) = site();
        write_post(
            &folio.content_dir,
            "first",
            "title: First\ndate: 2024-01-01\ntags: [Machine Learning, Rust]",
        );
        write_post(
            &folio.content_dir,
            "second",
            "title: Second\ndate: 2024-02-01\ntags: [rust]",
        );
        write_post(
            &folio.content_dir,
            "draft",
            "title: Draft\ndate: 2024-03-01\npublished: false",
        );

        let stats = Generator::new(&folio).generate().unwrap();
        assert_eq!(stats.posts, 2);
        assert_eq!(stats.tags, 2);
        assert_eq!(stats.assets, 1);

        let out = &folio.out_dir;
        assert!(out.join("index.html").is_file());
        assert!(out.join("posts/index.html").is_file());
        assert!(out.join("posts/page/1/index.html").is_file());
        assert!(!out.join("posts/page/2/index.html").exists());
        assert!(out.join("posts/first/index.html").is_file());
        assert!(!out.join("posts/draft").exists());
        assert!(out.join("tags/index.html").is_file());
        assert!(out.join("tags/machine-learning/index.html").is_file());
        assert!(out.join("tags/rust/page/1/index.html").is_file());
        assert!(out.join("search/index.html").is_file());
        assert!(out.join("404.html").is_file());
        assert!(out.join("css/style.css").is_file());

        let index = fs::read_to_string(out.join("search-data.json")).unwrap();
        assert!(index.contains("\"second\""));
        assert!(!index.contains("\"draft\""));

        let post = fs::read_to_string(out.join("posts/first/index.html")).unwrap();
        assert!(post.contains(r#"id="heading-0""#));
        assert!(post.contains(r#"href="/posts/second""#));

        let rust = fs::read_to_string(out.join("tags/rust/index.html")).unwrap();
        assert!(rust.contains("Tag: Rust"));

        let search = fs::read_to_string(out.join("search/index.html")).unwrap();
        assert!(search.contains(r#"data-index="/search-data.json""#));
        assert!(search.contains("<script>"));
    }

    #[test]
    fn test_generate_percent_in_names() {
        let (_tmp, folio) = site();
        write_post(
            &folio.content_dir,
            "a%41",
            "title: Percent\ndate: 2024-01-01\ntags: [x%41]",
        );

        let stats = Generator::new(&folio).generate().unwrap();
        assert_eq!(stats.posts, 1);
        assert_eq!(stats.tags, 1);
        let post = fs::read_to_string(folio.out_dir.join("posts/a%41/index.html")).unwrap();
        assert!(post.contains("Percent"));
        assert!(folio.out_dir.join("tags/x%41/index.html").is_file());
    }

    #[test]
    fn test_generate_empty_site() {
        let (_tmp, folio) = site();
        let stats = Generator::new(&folio).generate().unwrap();
        assert_eq!(stats.posts, 0);
        assert!(folio.out_dir.join("posts/index.html").is_file());
        assert!(!folio.out_dir.join("posts/page").exists());
        assert_eq!(
            fs::read_to_string(folio.out_dir.join("search-data.json")).unwrap(),
            "[]"
        );
    }
}
