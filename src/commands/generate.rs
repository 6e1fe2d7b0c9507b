//! Generate the static site

use anyhow::Result;

use crate::generator::Generator;
use crate::Folio;

pub fn run(folio: &Folio) -> Result<()> {
    let start = std::time::Instant::now();

    let stats = Generator::new(folio).generate()?;

    tracing::info!(
        "Generated {} pages ({} posts, {} tags, {} assets) in {:?}",
        stats.pages,
        stats.posts,
        stats.tags,
        stats.assets,
        start.elapsed()
    );
    println!(
        "Generated {} pages into {}",
        stats.pages,
        folio.out_dir.display()
    );

    Ok(())
}
