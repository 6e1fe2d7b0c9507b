//! HTTP server: page routes, the search API and static files from `public_dir`

use anyhow::Result;
use axum::{
    extract::{Query, RawPathParams, State},
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::{FsPostRepository, PostRepository};
use crate::helpers::parse_page;
use crate::pages::{HomePage, ListingPage, PostPage, SearchPage, TagPage, TagsPage};
use crate::templates;
use crate::Folio;

/// Shared by every handler; the repository re-reads the content directory
/// on each call
#[derive(Clone)]
struct AppState {
    config: Arc<SiteConfig>,
    repo: FsPostRepository,
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    q: Option<String>,
    page: Option<String>,
}

/// Build the application router
pub fn router(folio: &Folio) -> Router {
    let state = AppState {
        config: Arc::new(folio.config.clone()),
        repo: folio.repository(),
    };

    let not_found_config = Arc::clone(&state.config);
    let not_found = move || {
        let config = Arc::clone(&not_found_config);
        async move { not_found_page(&config) }
    };
    let static_files = ServeDir::new(&folio.public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .route("/", get(home))
        .route("/posts", get(listing))
        .route("/posts/page/:page", get(listing_page))
        .route("/posts/:slug", get(post))
        .route("/tags", get(tags))
        .route("/tags/:tag", get(tag))
        .route("/tags/:tag/page/:page", get(tag_page))
        .route("/search", get(search))
        .route("/api/search", get(search_api))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Watching {} for changes...", folio.content_dir.display());
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let folio = folio.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_rebuild(&folio) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(folio)).await?;

    Ok(())
}

/// Re-export the search index whenever the content directory changes
fn watch_and_rebuild(folio: &Folio) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if !folio.content_dir.exists() {
        tracing::warn!("Content directory {:?} does not exist", folio.content_dir);
        return Ok(());
    }
    debouncer
        .watcher()
        .watch(&folio.content_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", folio.content_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<&PathBuf> = events
                    .iter()
                    .map(|e| &e.path)
                    .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
                    .collect();
                if changed.is_empty() {
                    continue;
                }

                for path in &changed {
                    tracing::info!("File changed: {}", path.display());
                }
                if let Err(e) = crate::commands::build::run(folio) {
                    tracing::error!("Search index rebuild failed: {:#}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

fn not_found_page(config: &SiteConfig) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(templates::render_not_found(config)),
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Run a page build on the blocking pool and turn its outcome into a
/// response
async fn render<F>(state: AppState, build: F) -> Response
where
    F: FnOnce(&FsPostRepository, &SiteConfig) -> crate::Result<String> + Send + 'static,
{
    let config = Arc::clone(&state.config);
    let result = tokio::task::spawn_blocking(move || build(&state.repo, &state.config)).await;

    match result {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) if e.is_not_found() => {
            tracing::debug!("Not found: {}", e);
            not_found_page(&config)
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to render page: {}", e);
            internal_error("Failed to render page")
        }
        Err(e) => {
            tracing::error!("Render task failed: {}", e);
            internal_error("Failed to render page")
        }
    }
}

async fn home(State(state): State<AppState>) -> Response {
    render(state, |repo, config| {
        Ok(templates::render_home(config, &HomePage::build(repo, config)))
    })
    .await
}

async fn listing(State(state): State<AppState>) -> Response {
    render(state, |repo, config| {
        let page = ListingPage::build(repo, None, config.per_page)?;
        Ok(templates::render_listing(config, &page))
    })
    .await
}

/// A route capture exactly as it appeared in the URL, still percent-encoded.
/// The page models and the repository decode it once themselves.
fn raw_param(params: &RawPathParams, name: &str) -> Option<String> {
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

async fn listing_page(State(state): State<AppState>, params: RawPathParams) -> Response {
    let Some(page) = raw_param(&params, "page").as_deref().and_then(parse_page) else {
        return not_found_page(&state.config);
    };
    render(state, move |repo, config| {
        let page = ListingPage::build(repo, Some(page), config.per_page)?;
        Ok(templates::render_listing(config, &page))
    })
    .await
}

async fn post(State(state): State<AppState>, params: RawPathParams) -> Response {
    let Some(slug) = raw_param(&params, "slug") else {
        return not_found_page(&state.config);
    };
    render(state, move |repo, config| {
        let page = PostPage::build(repo, &slug)?;
        Ok(templates::render_post(config, &page))
    })
    .await
}

async fn tags(State(state): State<AppState>) -> Response {
    render(state, |repo, config| {
        Ok(templates::render_tags(config, &TagsPage::build(repo)))
    })
    .await
}

async fn tag(State(state): State<AppState>, params: RawPathParams) -> Response {
    let Some(tag) = raw_param(&params, "tag") else {
        return not_found_page(&state.config);
    };
    render(state, move |repo, config| {
        let page = TagPage::build(repo, &tag, 1, config.per_page)?;
        Ok(templates::render_tag(config, &page))
    })
    .await
}

async fn tag_page(State(state): State<AppState>, params: RawPathParams) -> Response {
    let tag = raw_param(&params, "tag");
    let page = raw_param(&params, "page").as_deref().and_then(parse_page);
    let (Some(tag), Some(page)) = (tag, page) else {
        return not_found_page(&state.config);
    };
    render(state, move |repo, config| {
        let page = TagPage::build(repo, &tag, page, config.per_page)?;
        Ok(templates::render_tag(config, &page))
    })
    .await
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = params.q.unwrap_or_default();
    // Anything but a positive number means the first page
    let page = params
        .page
        .as_deref()
        .and_then(parse_page)
        .filter(|&n| n > 0);

    render(state, move |repo, config| {
        let page = SearchPage::build(repo, &query, page, config.per_page)?;
        Ok(templates::render_search(config, &page))
    })
    .await
}

/// `GET /api/search?q=`: matching post metadata as JSON
async fn search_api(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = params.q.unwrap_or_default();
    let result = tokio::task::spawn_blocking(move || state.repo.search_posts(&query)).await;

    match result {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            internal_error("Failed to search posts")
        }
    }
}
