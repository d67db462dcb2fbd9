//! Byte layout of the combined file
//!
//! ```text
//! [0, P)            ICO header + directory     P = 6 + 16 * N
//! [P, P + L)        shifted PDF                L = PDF length
//! [P + L, total)    ICO image blobs, back to back in entry order
//! ```
//!
//! The directory has to fit in front of the PDF header window, which is
//! what limits the icon to 63 images (6 + 16 * 63 = 1014).

use tracing::debug;

use crate::error::PolyglotError;
use crate::ico::{ICO_DIR_ENTRY_LEN, ICO_HEADER_LEN};
use crate::xref::PDF_HEADER_WINDOW;

/// Largest sub-image count whose directory fits the header window
pub const MAX_SUB_IMAGES: usize = (PDF_HEADER_WINDOW - ICO_HEADER_LEN) / ICO_DIR_ENTRY_LEN;

/// Largest file the 32-bit ICO offset fields can address
pub const MAX_OUTPUT_LEN: u64 = u32::MAX as u64;

/// Absolute placement of every part of the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyglotPlan {
    pub prefix_len: usize,
    pub pdf_start: usize,
    pub pdf_len: usize,
    /// New absolute offset of each blob, in entry order
    pub blob_offsets: Vec<u32>,
    pub total_len: usize,
}

impl PolyglotPlan {
    /// Lay out `blob_lens.len()` sub-images around a PDF of `pdf_len` bytes
    pub fn new(pdf_len: usize, blob_lens: &[usize]) -> Result<Self, PolyglotError> {
        let count = blob_lens.len();
        let prefix_len = ICO_HEADER_LEN + count * ICO_DIR_ENTRY_LEN;
        if prefix_len > PDF_HEADER_WINDOW {
            return Err(PolyglotError::TooManySubImages { count, prefix_len });
        }

        let blobs_total: u64 = blob_lens.iter().map(|&len| len as u64).sum();
        let total = prefix_len as u64 + pdf_len as u64 + blobs_total;
        if total > MAX_OUTPUT_LEN {
            return Err(PolyglotError::FileTooLarge { total_len: total });
        }

        // Every offset is below `total`, so none of these casts truncate
        let mut next = prefix_len as u64 + pdf_len as u64;
        let mut blob_offsets = Vec::with_capacity(count);
        for &len in blob_lens {
            blob_offsets.push(next as u32);
            next += len as u64;
        }

        let plan = PolyglotPlan {
            prefix_len,
            pdf_start: prefix_len,
            pdf_len,
            blob_offsets,
            total_len: total as usize,
        };
        debug!(
            prefix_len = plan.prefix_len,
            pdf_len = plan.pdf_len,
            total_len = plan.total_len,
            "planned polyglot layout"
        );
        Ok(plan)
    }

    /// Constant shift applied to every PDF offset
    pub fn shift(&self) -> u64 {
        self.pdf_start as u64
    }
}
