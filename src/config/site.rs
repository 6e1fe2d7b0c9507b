//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::helpers::POSTS_PER_PAGE;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub url: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub out_dir: String,

    // Search artifact file name, served from the site root
    pub search_index: String,

    // Pagination
    pub per_page: usize,

    // Home page
    pub home_recent_posts: usize,
    pub home_tags: usize,

    #[serde(default)]
    pub highlight: HighlightConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            description: String::new(),
            url: "http://localhost:3000".to_string(),

            content_dir: "src/content/posts".to_string(),
            public_dir: "public".to_string(),
            out_dir: "out".to_string(),

            search_index: "search-data.json".to_string(),

            per_page: POSTS_PER_PAGE,

            home_recent_posts: 6,
            home_tags: 20,

            highlight: HighlightConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;

        // A zero page size would make every listing divide by zero
        if config.per_page == 0 {
            tracing::warn!("per_page must be positive, using {}", POSTS_PER_PAGE);
            config.per_page = POSTS_PER_PAGE;
        }

        Ok(config)
    }

    /// Public path of the search artifact, e.g. `/search-data.json`
    pub fn search_index_path(&self) -> String {
        format!("/{}", self.search_index.trim_start_matches('/'))
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
        }
    }
}
