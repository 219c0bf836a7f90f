// ============================================================
// Layer 6 - Dataset Download
// ============================================================
// Fetching and unpacking the archives is delegated to the
// `mnist` crate's downloader (switched to the Fashion-MNIST
// mirror). It drops the four uncompressed IDX files straight
// into the data directory, where FashionMnistLoader finds them.
//
// Compiled only with `--features download`; without it the
// command explains how to enable it instead of failing silently.

use anyhow::Result;
use std::path::Path;

use crate::data::loader::FashionMnistLoader;
use crate::domain::traits::Split;

/// True if both splits are already present in any layout the
/// loader reads.
pub fn is_downloaded(dir: &Path) -> bool {
    let loader = FashionMnistLoader::new(dir);
    [Split::Train, Split::Test].into_iter().all(|split| loader.has_split(split))
}

#[cfg(feature = "download")]
pub fn download(dir: &Path) -> Result<()> {
    use anyhow::{anyhow, Context};
    use std::panic::{self, AssertUnwindSafe};

    if is_downloaded(dir) {
        tracing::info!("Fashion-MNIST already present in '{}'", dir.display());
        return Ok(());
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create data directory '{}'", dir.display()))?;

    // The builder wants a trailing separator on its base path
    let base = format!("{}/", dir.display());
    tracing::info!("Downloading Fashion-MNIST into '{}'", base);

    let fetched = panic::catch_unwind(AssertUnwindSafe(|| {
        let mnist = mnist::MnistBuilder::new()
            .base_path(&base)
            .use_fashion_data()
            .download_and_extract()
            .finalize();
        mnist.trn_lbl.len() + mnist.tst_lbl.len()
    }))
    .map_err(|cause| {
        let reason = cause
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| cause.downcast_ref::<&str>().copied())
            .unwrap_or("unknown error");
        anyhow!("Fashion-MNIST download into '{}' failed: {reason}", dir.display())
    })?;
    tracing::info!("Downloaded {} labelled images", fetched);

    anyhow::ensure!(
        is_downloaded(dir),
        "Download finished but the IDX files are missing from '{}'",
        dir.display()
    );
    Ok(())
}

#[cfg(not(feature = "download"))]
pub fn download(dir: &Path) -> Result<()> {
    if is_downloaded(dir) {
        tracing::info!("Fashion-MNIST already present in '{}'", dir.display());
        return Ok(());
    }
    anyhow::bail!(
        "This build has no downloader. Rebuild with `--features download`, \
         or place the four Fashion-MNIST IDX files in '{}'.",
        dir.display()
    )
}
