//! Page models: the data behind each route, computed from the repository
//!
//! Each `build` function applies the route's rules (page validation, tag
//! resolution, empty-query guard) and returns `Error::NotFound` or
//! `Error::PageOutOfRange` when the route has nothing to show.

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{Post, PostMetadata, PostRepository};
use crate::error::{Error, Result};
use crate::helpers::{
    encode_segment, humanize, normalize_tag, reading_time, search_path, strip_html, LinkMode,
    PageLinks, Paginator,
};

/// Home: most recent posts and a slice of the tag list
#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub recent_posts: Vec<PostMetadata>,
    pub tags: Vec<String>,
}

impl HomePage {
    pub fn build<R: PostRepository + ?Sized>(repo: &R, config: &SiteConfig) -> Self {
        let mut recent_posts = repo.list_posts();
        recent_posts.truncate(config.home_recent_posts);
        let mut tags = repo.list_tags();
        tags.truncate(config.home_tags);
        Self { recent_posts, tags }
    }
}

/// `/posts` and `/posts/page/{n}`
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub posts: Vec<PostMetadata>,
    pub total_posts: usize,
    pub links: PageLinks,
}

impl ListingPage {
    pub const BASE_PATH: &'static str = "/posts";

    /// `page` is `None` for the bare `/posts` route, which always shows the
    /// first page even when there are no posts
    pub fn build<R: PostRepository + ?Sized>(
        repo: &R,
        page: Option<usize>,
        per_page: usize,
    ) -> Result<Self> {
        let all = repo.list_posts();
        let paginator = Paginator::new(all.len(), per_page);

        let (current, posts) = match page {
            Some(n) => (n, paginator.page(&all, n)?.to_vec()),
            None => (1, all.iter().take(paginator.per_page()).cloned().collect()),
        };

        Ok(Self {
            posts,
            total_posts: all.len(),
            links: PageLinks::new(
                current,
                paginator.total_pages(),
                Self::BASE_PATH,
                LinkMode::PathSuffix,
            ),
        })
    }
}

/// `/posts/{slug}`
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub post: Post,
    /// Older neighbour in the listing
    pub prev: Option<PostMetadata>,
    /// Newer neighbour in the listing
    pub next: Option<PostMetadata>,
    pub reading_minutes: usize,
}

impl PostPage {
    pub fn build<R: PostRepository + ?Sized>(repo: &R, slug: &str) -> Result<Self> {
        let post = repo
            .get_post_by_slug(slug)
            .ok_or_else(|| Error::NotFound(format!("post {}", slug)))?;

        let all = repo.list_posts();
        let prev = post.prev(&all).cloned();
        let next = post.next(&all).cloned();
        let reading_minutes = reading_time(&strip_html(&post.content));

        Ok(Self {
            post,
            prev,
            next,
            reading_minutes,
        })
    }
}

/// `/tags`
#[derive(Debug, Clone, Serialize)]
pub struct TagsPage {
    pub tags: Vec<String>,
}

impl TagsPage {
    pub fn build<R: PostRepository + ?Sized>(repo: &R) -> Self {
        Self {
            tags: repo.list_tags(),
        }
    }
}

/// `/tags/{tag}` and `/tags/{tag}/page/{n}`
#[derive(Debug, Clone, Serialize)]
pub struct TagPage {
    /// Tag as written in the posts, when one matches
    pub tag: String,
    pub posts: Vec<PostMetadata>,
    pub total_posts: usize,
    pub links: PageLinks,
}

impl TagPage {
    pub fn build<R: PostRepository + ?Sized>(
        repo: &R,
        raw_tag: &str,
        page: usize,
        per_page: usize,
    ) -> Result<Self> {
        let decoded = percent_decode_str(raw_tag).decode_utf8_lossy().into_owned();
        let wanted = normalize_tag(&decoded);

        let tag = repo
            .list_tags()
            .into_iter()
            .find(|t| normalize_tag(t) == wanted)
            .unwrap_or_else(|| humanize(&decoded));

        let all = repo.get_posts_by_tag(&decoded);
        if all.is_empty() {
            return Err(Error::NotFound(format!("tag {}", decoded)));
        }

        let paginator = Paginator::new(all.len(), per_page);
        let posts = paginator.page(&all, page)?.to_vec();

        Ok(Self {
            tag,
            posts,
            total_posts: all.len(),
            links: PageLinks::new(
                page,
                paginator.total_pages().max(1),
                format!("/tags/{}", encode_segment(&decoded)),
                LinkMode::PathSuffix,
            ),
        })
    }
}

/// `/search?q=...&page=...`
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub posts: Vec<PostMetadata>,
    pub total_results: usize,
    /// Absent when there is nothing to paginate
    pub links: Option<PageLinks>,
}

impl SearchPage {
    pub fn build<R: PostRepository + ?Sized>(
        repo: &R,
        query: &str,
        page: Option<usize>,
        per_page: usize,
    ) -> Result<Self> {
        // An empty query would match every post
        let results = if query.trim().is_empty() {
            Vec::new()
        } else {
            repo.search_posts(query)
        };

        if results.is_empty() {
            return Ok(Self {
                query: query.to_string(),
                posts: Vec::new(),
                total_results: 0,
                links: None,
            });
        }

        let current = page.unwrap_or(1);
        let paginator = Paginator::new(results.len(), per_page);
        let posts = paginator.page(&results, current)?.to_vec();

        Ok(Self {
            query: query.to_string(),
            posts,
            total_results: results.len(),
            links: Some(PageLinks::new(
                current,
                paginator.total_pages(),
                search_path(query),
                LinkMode::QueryParam,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::TocEntry;

    /// In-memory repository for page tests
    struct MemoryRepo {
        posts: Vec<PostMetadata>,
    }

    impl MemoryRepo {
        fn with_posts(n: usize, tag: &str) -> Self {
            let posts = (0..n)
                .map(|i| PostMetadata {
                    slug: format!("post-{:02}", i),
                    title: format!("Post {}", i),
                    date: format!("2024-01-{:02}", 28 - i.min(27)),
                    tags: vec![tag.to_string()],
                    published: true,
                    cover_image: String::new(),
                })
                .collect();
            Self { posts }
        }
    }

    impl PostRepository for MemoryRepo {
        fn list_posts(&self) -> Vec<PostMetadata> {
            self.posts.clone()
        }

        fn get_post_by_slug(&self, slug: &str) -> Option<Post> {
            self.posts.iter().find(|p| p.slug == slug).map(|p| Post {
                metadata: p.clone(),
                content: "<p>a few words here</p>".to_string(),
                toc: Vec::<TocEntry>::new(),
            })
        }
    }

    #[test]
    fn test_home_page_truncates() {
        let repo = MemoryRepo::with_posts(10, "Rust");
        let home = HomePage::build(&repo, &SiteConfig::default());
        assert_eq!(home.recent_posts.len(), 6);
        assert_eq!(home.tags, vec!["Rust"]);
    }

    #[test]
    fn test_listing_pages() {
        let repo = MemoryRepo::with_posts(25, "Rust");

        let first = ListingPage::build(&repo, None, 12).unwrap();
        assert_eq!(first.posts.len(), 12);
        assert_eq!(first.links.total_pages, 3);

        let third = ListingPage::build(&repo, Some(3), 12).unwrap();
        assert_eq!(third.posts.len(), 1);
        assert_eq!(third.links.href(2), "/posts/page/2");

        assert!(ListingPage::build(&repo, Some(4), 12).unwrap_err().is_not_found());
        assert!(ListingPage::build(&repo, Some(0), 12).is_err());
    }

    #[test]
    fn test_empty_listing_has_no_pagination() {
        let repo = MemoryRepo::with_posts(0, "Rust");
        let listing = ListingPage::build(&repo, None, 12).unwrap();
        assert!(listing.posts.is_empty());
        assert!(!listing.links.is_visible());
        assert!(ListingPage::build(&repo, Some(1), 12).is_err());
    }

    #[test]
    fn test_post_page_neighbours() {
        let repo = MemoryRepo::with_posts(3, "Rust");
        let page = PostPage::build(&repo, "post-01").unwrap();
        assert_eq!(page.prev.unwrap().slug, "post-02");
        assert_eq!(page.next.unwrap().slug, "post-00");
        assert_eq!(page.reading_minutes, 1);

        assert!(PostPage::build(&repo, "missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_tag_page_resolves_display_name() {
        let repo = MemoryRepo::with_posts(13, "Machine Learning");
        let page = TagPage::build(&repo, "machine-learning", 1, 12).unwrap();
        assert_eq!(page.tag, "Machine Learning");
        assert_eq!(page.total_posts, 13);
        assert_eq!(page.links.total_pages, 2);
        assert_eq!(page.links.href(2), "/tags/machine-learning/page/2");

        let second = TagPage::build(&repo, "machine%20learning", 2, 12).unwrap();
        assert_eq!(second.posts.len(), 1);

        assert!(TagPage::build(&repo, "machine-learning", 3, 12).is_err());
        assert!(TagPage::build(&repo, "unknown", 1, 12).unwrap_err().is_not_found());
    }

    #[test]
    fn test_search_page() {
        let repo = MemoryRepo::with_posts(14, "Go");
        let page = SearchPage::build(&repo, "go", None, 12).unwrap();
        assert_eq!(page.total_results, 14);
        let links = page.links.unwrap();
        assert_eq!(links.href(1), "/search?q=go");
        assert_eq!(links.href(2), "/search?q=go&page=2");

        let second = SearchPage::build(&repo, "go", Some(2), 12).unwrap();
        assert_eq!(second.posts.len(), 2);
        assert!(SearchPage::build(&repo, "go", Some(3), 12).is_err());
    }

    #[test]
    fn test_search_page_guards_empty_query() {
        let repo = MemoryRepo::with_posts(3, "Go");
        let page = SearchPage::build(&repo, "   ", None, 12).unwrap();
        assert_eq!(page.total_results, 0);
        assert!(page.links.is_none());

        let none = SearchPage::build(&repo, "python", Some(9), 12).unwrap();
        assert!(none.posts.is_empty());
    }
}
