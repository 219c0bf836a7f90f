// ============================================================
// Layer 4 - IDX Format Parser
// ============================================================
// Fashion-MNIST ships as four IDX files. The format is tiny:
//
//   bytes 0..4   magic number (big-endian u32)
//                  0x00000801 → 1-D vector of u8 (labels)
//                  0x00000803 → 3-D array of u8 (images)
//   next 4*D     one big-endian u32 per dimension
//   rest         the raw u8 payload, row-major
//
// Parsing is pure (bytes in, vectors out) so it is tested
// without touching the filesystem; the loader does the I/O.

use thiserror::Error;

pub const LABEL_MAGIC: u32 = 0x0000_0801;
pub const IMAGE_MAGIC: u32 = 0x0000_0803;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdxError {
    #[error("IDX data truncated: needed {needed} bytes, found {found}")]
    Truncated { needed: usize, found: usize },

    #[error("bad IDX magic number: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("IDX payload length mismatch: header declares {declared} bytes, file holds {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("IDX image dimensions {count}x{rows}x{cols} are too large to address")]
    DimensionOverflow { count: usize, rows: usize, cols: usize },

    #[error("IDX image file declares {count} images of size {rows}x{cols}")]
    EmptyImages { count: usize, rows: usize, cols: usize },
}

/// Decoded image file: one Vec<u8> per image plus the image dims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxImages {
    pub images: Vec<Vec<u8>>,
    pub rows: usize,
    pub cols: usize,
}

/// Parse an IDX1 label file.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<u8>, IdxError> {
    let dims = read_header(bytes, LABEL_MAGIC, 1)?;
    let payload = checked_payload(bytes, 8, dims[0])?;
    Ok(payload.to_vec())
}

/// Parse an IDX3 image file.
pub fn parse_images(bytes: &[u8]) -> Result<IdxImages, IdxError> {
    let dims = read_header(bytes, IMAGE_MAGIC, 3)?;
    let (count, rows, cols) = (dims[0], dims[1], dims[2]);

    let overflow = || IdxError::DimensionOverflow { count, rows, cols };
    let image_len = rows.checked_mul(cols).ok_or_else(overflow)?;
    let declared = image_len.checked_mul(count).ok_or_else(overflow)?;

    if image_len == 0 {
        if count > 0 {
            return Err(IdxError::EmptyImages { count, rows, cols });
        }
        checked_payload(bytes, 16, 0)?;
        return Ok(IdxImages { images: Vec::new(), rows, cols });
    }

    let payload = checked_payload(bytes, 16, declared)?;
    let images = payload.chunks_exact(image_len).map(<[u8]>::to_vec).collect();

    Ok(IdxImages { images, rows, cols })
}

fn read_header(bytes: &[u8], magic: u32, ndims: usize) -> Result<Vec<usize>, IdxError> {
    let header_len = 4 + 4 * ndims;
    if bytes.len() < header_len {
        return Err(IdxError::Truncated { needed: header_len, found: bytes.len() });
    }

    let found = read_u32(bytes, 0);
    if found != magic {
        return Err(IdxError::BadMagic { expected: magic, found });
    }

    Ok((0..ndims).map(|d| read_u32(bytes, 4 + 4 * d) as usize).collect())
}

fn checked_payload(bytes: &[u8], offset: usize, declared: usize) -> Result<&[u8], IdxError> {
    let actual = bytes.len() - offset;
    if actual != declared {
        return Err(IdxError::LengthMismatch { declared, actual });
    }
    Ok(&bytes[offset..])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn label_file(labels: &[u8]) -> Vec<u8> {
        let mut out = LABEL_MAGIC.to_be_bytes().to_vec();
        out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        out.extend_from_slice(labels);
        out
    }

    fn image_file(count: u32, rows: u32, cols: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = IMAGE_MAGIC.to_be_bytes().to_vec();
        for d in [count, rows, cols] {
            out.extend_from_slice(&d.to_be_bytes());
        }
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_parse_labels() {
        let labels = parse_labels(&label_file(&[9, 0, 0, 3])).unwrap();
        assert_eq!(labels, vec![9, 0, 0, 3]);
    }

    #[test]
    fn test_parse_images_splits_payload_per_image() {
        let payload: Vec<u8> = (0..12).collect();
        let parsed = parse_images(&image_file(3, 2, 2, &payload)).unwrap();
        assert_eq!(parsed.rows, 2);
        assert_eq!(parsed.cols, 2);
        assert_eq!(parsed.images.len(), 3);
        assert_eq!(parsed.images[1], vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_label_file_rejected_as_images() {
        let err = parse_images(&label_file(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12])).unwrap_err();
        assert_eq!(err, IdxError::BadMagic { expected: IMAGE_MAGIC, found: LABEL_MAGIC });
    }

    #[test]
    fn test_huge_dimensions_are_an_error() {
        let max = u32::MAX as usize;
        let err = parse_images(&image_file(u32::MAX, u32::MAX, u32::MAX, &[])).unwrap_err();
        assert_eq!(err, IdxError::DimensionOverflow { count: max, rows: max, cols: max });
    }

    #[test]
    fn test_zero_sized_images_are_an_error() {
        let err = parse_images(&image_file(u32::MAX, 0, 28, &[])).unwrap_err();
        assert_eq!(err, IdxError::EmptyImages { count: u32::MAX as usize, rows: 0, cols: 28 });

        let parsed = parse_images(&image_file(0, 0, 0, &[])).unwrap();
        assert!(parsed.images.is_empty());
    }

    #[test]
    fn test_truncated_header() {
        let err = parse_labels(&[0, 0, 8]).unwrap_err();
        assert_eq!(err, IdxError::Truncated { needed: 8, found: 3 });
    }

    #[test]
    fn test_payload_shorter_than_declared() {
        let mut bytes = label_file(&[1, 2, 3]);
        bytes.pop();
        let err = parse_labels(&bytes).unwrap_err();
        assert_eq!(err, IdxError::LengthMismatch { declared: 3, actual: 2 });
    }
}
