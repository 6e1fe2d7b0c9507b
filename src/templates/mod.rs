//! HTML templates for the blog pages
//!
//! Pages are assembled from small string-building helpers; every value that
//! came from a post file is escaped except the rendered markdown body.

use crate::config::SiteConfig;
use crate::content::{PostMetadata, TocEntry};
use crate::helpers::{escape_html, format_date, post_path, tag_path, PageLinks};
use crate::pages::{HomePage, ListingPage, PostPage, SearchPage, TagPage, TagsPage};

/// Wrap page content in the site layout
pub fn layout(config: &SiteConfig, title: &str, description: &str, body: &str) -> String {
    let page_title = if title.is_empty() {
        escape_html(&config.title)
    } else {
        format!("{} | {}", escape_html(title), escape_html(&config.title))
    };

    let mut header = String::new();
    if !title.is_empty() {
        header.push_str(&format!(r#"<h1 class="page-title">{}</h1>"#, escape_html(title)));
    }
    if !description.is_empty() {
        header.push_str(&format!(
            r#"<p class="page-description">{}</p>"#,
            escape_html(description)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{page_title}</title>
<meta name="description" content="{site_description}">
<link rel="stylesheet" href="/css/style.css">
</head>
<body>
<nav class="navbar">
<a class="brand" href="/">{site_title}</a>
<a href="/posts">Posts</a>
<a href="/tags">Tags</a>
<form class="search-form" action="/search" method="get"><input type="search" name="q" placeholder="Search"></form>
</nav>
<div class="page">
<header>{header}</header>
<main>
{body}
</main>
</div>
</body>
</html>
"#,
        page_title = page_title,
        site_description = escape_html(&config.description),
        site_title = escape_html(&config.title),
        header = header,
        body = body,
    )
}

/// Date line of a post
fn post_meta(date: &str, reading_minutes: Option<usize>) -> String {
    let mut html = format!(
        r#"<div class="post-meta"><time datetime="{}">{}</time>"#,
        escape_html(date),
        escape_html(&format_date(date))
    );
    if let Some(minutes) = reading_minutes {
        html.push_str(&format!(
            r#"<span class="reading-time">{} min read</span>"#,
            minutes
        ));
    }
    html.push_str("</div>");
    html
}

fn tag_badge(tag: &str) -> String {
    format!(
        r#"<a class="tag-badge" href="{}">{}</a>"#,
        escape_html(&tag_path(tag)),
        escape_html(tag)
    )
}

fn tag_list(tags: &[String]) -> String {
    let mut html = String::from(r#"<div class="tag-list">"#);
    for tag in tags {
        html.push_str(&tag_badge(tag));
    }
    html.push_str("</div>");
    html
}

fn post_card(post: &PostMetadata) -> String {
    let mut html = format!(
        r#"<a class="post-card" href="{}"><article>"#,
        escape_html(&post_path(&post.slug))
    );
    if !post.cover_image.is_empty() {
        html.push_str(&format!(
            r#"<img class="cover" src="{}" alt="{}" loading="lazy">"#,
            escape_html(&post.cover_image),
            escape_html(&post.title)
        ));
    }
    html.push_str(&format!("<h2>{}</h2>", escape_html(&post.title)));
    html.push_str(&post_meta(&post.date, None));
    html.push_str("</article></a>");
    html
}

fn post_grid(posts: &[PostMetadata], empty_message: &str) -> String {
    if posts.is_empty() {
        return format!(r#"<p class="empty">{}</p>"#, escape_html(empty_message));
    }
    let mut html = String::from(r#"<div class="post-grid">"#);
    for post in posts {
        html.push_str(&post_card(post));
    }
    html.push_str("</div>");
    html
}

/// Pagination control; empty when there are no pages
pub fn pagination(links: &PageLinks) -> String {
    if !links.is_visible() {
        return String::new();
    }

    let mut html = String::from(r#"<nav class="pagination">"#);
    let edge = |html: &mut String, href: Option<String>, label: &str, class: &str| {
        if let Some(href) = href {
            html.push_str(&format!(
                r#"<a class="{}" href="{}" aria-label="{}">{}</a>"#,
                class,
                escape_html(&href),
                label,
                match class {
                    "first" => "&laquo;",
                    "prev" => "&lsaquo;",
                    "next" => "&rsaquo;",
                    _ => "&raquo;",
                }
            ));
        }
    };

    edge(&mut html, links.first(), "First page", "first");
    edge(&mut html, links.prev(), "Previous page", "prev");

    for page in links.window() {
        if page == links.current {
            html.push_str(&format!(
                r#"<a class="page current" href="{}" aria-current="page">{}</a>"#,
                escape_html(&links.href(page)),
                page
            ));
        } else {
            html.push_str(&format!(
                r#"<a class="page" href="{}">{}</a>"#,
                escape_html(&links.href(page)),
                page
            ));
        }
    }

    edge(&mut html, links.next(), "Next page", "next");
    edge(&mut html, links.last(), "Last page", "last");

    html.push_str("</nav>");
    html
}

fn table_of_contents(toc: &[TocEntry]) -> String {
    if toc.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<aside class="toc"><p class="toc-title">Contents</p><ul>"#);
    for entry in toc {
        html.push_str(&format!(
            r##"<li class="toc-level-{}"><a href="#{}">{}</a></li>"##,
            entry.level,
            escape_html(&entry.id),
            escape_html(&entry.text)
        ));
    }
    html.push_str("</ul></aside>");
    html
}

pub fn render_home(config: &SiteConfig, page: &HomePage) -> String {
    let mut body = String::from(r#"<section class="recent"><h2>Recent posts</h2>"#);
    body.push_str(&post_grid(&page.recent_posts, "No posts yet."));
    body.push_str(r#"<a class="more" href="/posts">All posts</a></section>"#);

    if !page.tags.is_empty() {
        body.push_str(r#"<section class="tags"><h2>Tags</h2>"#);
        body.push_str(&tag_list(&page.tags));
        body.push_str(r#"<a class="more" href="/tags">All tags</a></section>"#);
    }

    layout(config, &config.title, &config.description, &body)
}

pub fn render_listing(config: &SiteConfig, page: &ListingPage) -> String {
    let mut body = post_grid(&page.posts, "There are no posts on this page.");
    body.push_str(&pagination(&page.links));
    layout(config, "Posts", "All posts on this blog.", &body)
}

pub fn render_post(config: &SiteConfig, page: &PostPage) -> String {
    let meta = &page.post.metadata;
    let mut body = String::from(r#"<div class="post-layout"><article class="post">"#);

    if !meta.cover_image.is_empty() {
        body.push_str(&format!(
            r#"<img class="cover" src="{}" alt="{}">"#,
            escape_html(&meta.cover_image),
            escape_html(&meta.title)
        ));
    }

    body.push_str(&format!(
        r#"<header><h1 class="post-title">{}</h1>"#,
        escape_html(&meta.title)
    ));
    body.push_str(&post_meta(&meta.date, Some(page.reading_minutes)));
    body.push_str(&tag_list(&meta.tags));
    body.push_str("</header>");

    // Rendered markdown; raw HTML was already dropped by the renderer
    body.push_str(r#"<div id="post-content" class="prose">"#);
    body.push_str(&page.post.content);
    body.push_str("</div>");

    body.push_str(r#"<nav class="post-nav">"#);
    match &page.prev {
        Some(prev) => body.push_str(&format!(
            r#"<a class="prev" href="{}"><span>Previous post</span>{}</a>"#,
            escape_html(&post_path(&prev.slug)),
            escape_html(&prev.title)
        )),
        None => body.push_str("<div></div>"),
    }
    match &page.next {
        Some(next) => body.push_str(&format!(
            r#"<a class="next" href="{}"><span>Next post</span>{}</a>"#,
            escape_html(&post_path(&next.slug)),
            escape_html(&next.title)
        )),
        None => body.push_str("<div></div>"),
    }
    body.push_str("</nav>");
    body.push_str(r#"<a class="back" href="/posts">Back to all posts</a></article>"#);

    body.push_str(&table_of_contents(&page.post.toc));
    body.push_str("</div>");

    layout(config, "", "", &body)
}

pub fn render_tags(config: &SiteConfig, page: &TagsPage) -> String {
    let body = if page.tags.is_empty() {
        r#"<p class="empty">No tags yet.</p>"#.to_string()
    } else {
        tag_list(&page.tags)
    };
    layout(config, "Tags", "Every tag used on this blog.", &body)
}

pub fn render_tag(config: &SiteConfig, page: &TagPage) -> String {
    let mut body = post_grid(&page.posts, "No posts with this tag.");
    body.push_str(&pagination(&page.links));
    layout(
        config,
        &format!("Tag: {}", page.tag),
        &format!("{} posts tagged {}", page.total_posts, page.tag),
        &body,
    )
}

/// Client-side search over the exported index, for pages served without a
/// server-side query (the static export). Mirrors `matches_query`, the card
/// markup and the query-parameter pagination.
const CLIENT_SEARCH_SCRIPT: &str = r#"<script>
(function () {
  var params = new URLSearchParams(location.search);
  var query = params.get('q') || '';
  if (!query.trim()) return;
  var root = document.getElementById('search-results');
  var perPage = parseInt(root.dataset.perPage, 10) || 12;
  var current = parseInt(params.get('page'), 10) || 1;
  var needle = query.toLowerCase();
  var base = '/search?q=' + encodeURIComponent(query);

  function el(tag, attrs, text) {
    var node = document.createElement(tag);
    for (var key in attrs) node.setAttribute(key, attrs[key]);
    if (text !== undefined) node.textContent = text;
    return node;
  }
  function href(page) { return page <= 1 ? base : base + '&page=' + page; }
  function formatDate(date) {
    var m = /^(\d{4})-(\d{2})-(\d{2})/.exec(date);
    return m ? m[1] + '.' + m[2] + '.' + m[3] : date;
  }
  function card(post) {
    var link = el('a', { 'class': 'post-card', href: '/posts/' + encodeURIComponent(post.slug) });
    var article = el('article', {});
    if (post.coverImage) {
      article.appendChild(el('img', { 'class': 'cover', src: post.coverImage, alt: post.title, loading: 'lazy' }));
    }
    article.appendChild(el('h2', {}, post.title));
    var meta = el('div', { 'class': 'post-meta' });
    meta.appendChild(el('time', { datetime: post.date }, formatDate(post.date)));
    article.appendChild(meta);
    link.appendChild(article);
    return link;
  }
  function pagination(total) {
    var nav = el('nav', { 'class': 'pagination' });
    function edge(show, page, cls, label) {
      if (show) nav.appendChild(el('a', { 'class': cls, href: href(page) }, label));
    }
    edge(current > 2, 1, 'first', '«');
    edge(current > 1, current - 1, 'prev', '‹');
    var start = Math.max(1, current - 2);
    var end = Math.min(total, start + 4);
    start = Math.max(1, Math.min(start, end - 4));
    for (var n = start; n <= end; n++) {
      nav.appendChild(el('a', { 'class': n === current ? 'page current' : 'page', href: href(n) }, String(n)));
    }
    edge(current < total, current + 1, 'next', '›');
    edge(current + 1 < total, total, 'last', '»');
    return nav;
  }

  fetch(root.dataset.index).then(function (r) { return r.json(); }).then(function (posts) {
    var hits = posts.filter(function (post) {
      return post.title.toLowerCase().indexOf(needle) !== -1 ||
        post.tags.some(function (tag) { return tag.toLowerCase().indexOf(needle) !== -1; });
    });
    var title = document.querySelector('.page-title');
    if (title) title.textContent = 'Search: ' + query;
    var total = Math.ceil(hits.length / perPage);
    if (!hits.length || current < 1 || current > total) {
      root.appendChild(el('p', { 'class': 'empty' }, 'No results. Try another search term.'));
      return;
    }
    var grid = el('div', { 'class': 'post-grid' });
    hits.slice((current - 1) * perPage, current * perPage).forEach(function (post) {
      grid.appendChild(card(post));
    });
    root.appendChild(el('p', { 'class': 'page-description' }, hits.length + ' results for "' + query + '"'));
    root.appendChild(grid);
    root.appendChild(pagination(total));
  });
})();
</script>"#;

pub fn render_search(config: &SiteConfig, page: &SearchPage) -> String {
    let mut body = String::new();
    if page.total_results > 0 {
        body.push_str(&post_grid(&page.posts, ""));
    } else if !page.query.trim().is_empty() {
        body.push_str(r#"<p class="empty">No results. Try another search term.</p>"#);
    }
    if let Some(links) = &page.links {
        body.push_str(&pagination(links));
    }
    if page.query.trim().is_empty() {
        body.push_str(&format!(
            r#"<div id="search-results" data-index="{}" data-per-page="{}"></div>"#,
            escape_html(&config.search_index_path()),
            config.per_page
        ));
        body.push_str(CLIENT_SEARCH_SCRIPT);
    }

    let description = if page.query.is_empty() {
        String::new()
    } else {
        format!("{} results for \"{}\"", page.total_results, page.query)
    };
    layout(config, &format!("Search: {}", page.query), &description, &body)
}

pub fn render_not_found(config: &SiteConfig) -> String {
    let body = r#"<p class="empty">The page you were looking for does not exist.</p><a class="back" href="/">Go home</a>"#;
    layout(config, "Page not found", "", body)
}
