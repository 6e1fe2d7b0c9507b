//! Export the client-side search index

use anyhow::{Context, Result};

use crate::Folio;

/// Write the search index to every target; any failed write is fatal
pub fn run(folio: &Folio) -> Result<()> {
    let targets = folio.search_index_targets();
    let repo = folio.repository();

    let index = crate::search::export(&repo, &targets).with_context(|| {
        format!(
            "Error generating search data in {:?}",
            folio.public_dir
        )
    })?;

    println!("Search data generated with {} posts", index.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_writes_public_and_existing_out() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::with_config(tmp.path().to_path_buf(), SiteConfig::default());
        fs::create_dir_all(&folio.content_dir).unwrap();
        fs::write(
            folio.content_dir.join("hello.md"),
            "---\ntitle: Hello\ndate: 2024-01-01\n---\nHi",
        )
        .unwrap();

        run(&folio).unwrap();
        assert!(folio.public_dir.join("search-data.json").is_file());
        assert!(!folio.out_dir.exists());

        fs::create_dir_all(&folio.out_dir).unwrap();
        run(&folio).unwrap();
        let json = fs::read_to_string(folio.out_dir.join("search-data.json")).unwrap();
        assert!(json.contains("\"title\":\"Hello\""));
    }

    #[test]
    fn test_build_fails_when_target_is_unwritable() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::with_config(tmp.path().to_path_buf(), SiteConfig::default());
        // A file where the public directory should be
        fs::write(&folio.public_dir, "not a directory").unwrap();
        assert!(run(&folio).is_err());
    }
}
