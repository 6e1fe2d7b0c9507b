//! folio: a markdown blog engine
//!
//! Posts are `<slug>.md` files with YAML front-matter. This crate reads them
//! into listing metadata and rendered HTML, answers listing/tag/search
//! queries over them, exports a client-side search index, and serves or
//! statically exports the blog pages.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod pages;
pub mod search;
pub mod server;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::{FsPostRepository, MarkdownRenderer};

/// The main application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory of `<slug>.md` files
    pub content_dir: PathBuf,
    /// Public assets directory, served at `/`
    pub public_dir: PathBuf,
    /// Static export directory
    pub out_dir: PathBuf,
    renderer: Arc<MarkdownRenderer>,
}

impl Folio {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let out_dir = base_dir.join(&config.out_dir);
        let renderer = Arc::new(MarkdownRenderer::with_theme(&config.highlight.theme));

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            out_dir,
            renderer,
        }
    }

    /// The post repository over the content directory
    pub fn repository(&self) -> FsPostRepository {
        FsPostRepository::new(&self.content_dir, Arc::clone(&self.renderer))
    }

    /// Where `build` writes the search index: the public directory, plus
    /// the export directory when one already exists
    pub fn search_index_targets(&self) -> Vec<PathBuf> {
        let mut targets = vec![self.public_dir.join(&self.config.search_index)];
        if self.out_dir.is_dir() {
            targets.push(self.out_dir.join(&self.config.search_index));
        }
        targets
    }

    /// Export the search index
    pub fn build(&self) -> anyhow::Result<()> {
        commands::build::run(self)
    }

    /// Export the static site
    pub fn generate(&self) -> anyhow::Result<()> {
        commands::generate::run(self)
    }
}
