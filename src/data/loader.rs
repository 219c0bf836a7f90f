// ============================================================
// Layer 4 - Fashion-MNIST Loader
// ============================================================
// Reads the four IDX files of Fashion-MNIST from a directory.
//
// Expected file names (the same names the upstream release
// uses, uncompressed):
//
//   train-images-idx3-ubyte   60,000 x 28 x 28
//   train-labels-idx1-ubyte   60,000
//   t10k-images-idx3-ubyte    10,000 x 28 x 28
//   t10k-labels-idx1-ubyte    10,000
//
// The files are looked up directly in the data directory first,
// then in `<dir>/FashionMNIST/raw`, which is where other
// toolkits cache the same files. That lets an existing download
// be reused without copying it around.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (Reading Files)

use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::idx::{parse_images, parse_labels};
use crate::domain::fashion_class::NUM_CLASSES;
use crate::domain::image::{RawImage, IMAGE_HEIGHT, IMAGE_WIDTH};
use crate::domain::traits::{ImageSource, Split};

/// Loads labelled images for a split from IDX files on disk.
/// Implements the ImageSource trait from Layer 3.
pub struct FashionMnistLoader {
    /// Directory holding the IDX files (or a FashionMNIST/raw subfolder)
    dir: PathBuf,
}

impl FashionMnistLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// (images file, labels file) for a split
    pub fn file_names(split: Split) -> (&'static str, &'static str) {
        match split {
            Split::Train => ("train-images-idx3-ubyte", "train-labels-idx1-ubyte"),
            Split::Test => ("t10k-images-idx3-ubyte", "t10k-labels-idx1-ubyte"),
        }
    }

    /// Directory that actually contains the split's files, if any.
    fn locate(&self, split: Split) -> Option<PathBuf> {
        let (images, labels) = Self::file_names(split);
        [self.dir.clone(), self.dir.join("FashionMNIST").join("raw")]
            .into_iter()
            .find(|dir| dir.join(images).is_file() && dir.join(labels).is_file())
    }

    /// True if both IDX files of the split can be found.
    pub fn has_split(&self, split: Split) -> bool {
        self.locate(split).is_some()
    }

    fn resolve_dir(&self, split: Split) -> Result<PathBuf> {
        if let Some(dir) = self.locate(split) {
            return Ok(dir);
        }
        let (images, labels) = Self::file_names(split);

        bail!(
            "Cannot find '{images}' and '{labels}' under '{}'. \
             Run the 'download' command first or point --data-dir at the IDX files.",
            self.dir.display()
        )
    }
}

impl ImageSource for FashionMnistLoader {
    fn load_split(&self, split: Split) -> Result<Vec<RawImage>> {
        let dir = self.resolve_dir(split)?;
        let (images_name, labels_name) = Self::file_names(split);

        let images_bytes = read_file(&dir.join(images_name))?;
        let labels_bytes = read_file(&dir.join(labels_name))?;

        let images = parse_images(&images_bytes)
            .with_context(|| format!("Malformed image file '{images_name}'"))?;
        let labels = parse_labels(&labels_bytes)
            .with_context(|| format!("Malformed label file '{labels_name}'"))?;

        let samples = pair_samples(images.images, images.rows, images.cols, labels)?;
        tracing::info!("Loaded {} {:?} images from '{}'", samples.len(), split, dir.display());
        Ok(samples)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Cannot read '{}'", path.display()))
}

/// Zip images with labels, validating the dataset invariants:
/// equal counts, 28x28 images, labels within the class table.
fn pair_samples(
    images: Vec<Vec<u8>>,
    rows: usize,
    cols: usize,
    labels: Vec<u8>,
) -> Result<Vec<RawImage>> {
    if images.len() != labels.len() {
        bail!("{} images but {} labels", images.len(), labels.len());
    }
    if (rows, cols) != (IMAGE_HEIGHT, IMAGE_WIDTH) {
        bail!("Expected {IMAGE_HEIGHT}x{IMAGE_WIDTH} images, found {rows}x{cols}");
    }
    if let Some(bad) = labels.iter().find(|&&l| l as usize >= NUM_CLASSES) {
        bail!("Label {bad} is outside the {NUM_CLASSES} Fashion-MNIST classes");
    }

    Ok(images
        .into_iter()
        .zip(labels)
        .map(|(pixels, label)| RawImage::new(pixels, label))
        .collect())
}

/// Writes a split's two IDX files into `dir`; image `i` has every
/// pixel set to `i`.
#[cfg(test)]
pub(crate) fn write_split(dir: &Path, split: Split, labels: &[u8]) {
    use crate::data::idx::{IMAGE_MAGIC, LABEL_MAGIC};
    use crate::domain::image::IMAGE_SIZE;

    let (images_name, labels_name) = FashionMnistLoader::file_names(split);

    let mut images = IMAGE_MAGIC.to_be_bytes().to_vec();
    for d in [labels.len() as u32, 28, 28] {
        images.extend_from_slice(&d.to_be_bytes());
    }
    for (i, _) in labels.iter().enumerate() {
        images.extend(std::iter::repeat(i as u8).take(IMAGE_SIZE));
    }

    let mut label_bytes = LABEL_MAGIC.to_be_bytes().to_vec();
    label_bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    label_bytes.extend_from_slice(labels);

    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(images_name), images).unwrap();
    fs::write(dir.join(labels_name), label_bytes).unwrap();
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::IMAGE_SIZE;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fmq-loader-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_loads_split_from_flat_dir() {
        let dir = temp_dir("flat");
        write_split(&dir, Split::Test, &[9, 2, 1]);

        let samples = FashionMnistLoader::new(&dir).load_split(Split::Test).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].label, 9);
        assert_eq!(samples[2].pixels, vec![2u8; IMAGE_SIZE]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_loads_split_from_raw_subdir() {
        let dir = temp_dir("raw");
        write_split(&dir.join("FashionMNIST").join("raw"), Split::Train, &[0, 5]);

        let samples = FashionMnistLoader::new(&dir).load_split(Split::Train).unwrap();
        assert_eq!(samples.len(), 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_files_mention_download() {
        let dir = temp_dir("missing");
        let err = FashionMnistLoader::new(&dir).load_split(Split::Train).unwrap_err();
        assert!(err.to_string().contains("download"));
    }

    #[test]
    fn test_count_mismatch_is_rejected() {
        let err = pair_samples(vec![vec![0; IMAGE_SIZE]], 28, 28, vec![1, 2]).unwrap_err();
        assert!(err.to_string().contains("1 images but 2 labels"));
    }

    #[test]
    fn test_label_out_of_range_is_rejected() {
        let err = pair_samples(vec![vec![0; IMAGE_SIZE]], 28, 28, vec![10]).unwrap_err();
        assert!(err.to_string().contains("Label 10"));
    }
}
