//! Final concatenation of the polyglot

use crate::ico::{IcoDirEntry, IcoHeader};
use crate::layout::PolyglotPlan;

/// Concatenate header, relocated directory, shifted PDF and blobs
///
/// All checks happen before this point; the plan, entries and blobs are
/// expected to agree in count and lengths.
pub fn assemble(
    header: &IcoHeader,
    entries: &[IcoDirEntry],
    plan: &PolyglotPlan,
    pdf: &[u8],
    blobs: &[Vec<u8>],
) -> Vec<u8> {
    debug_assert_eq!(entries.len(), plan.blob_offsets.len());
    debug_assert_eq!(blobs.len(), plan.blob_offsets.len());
    debug_assert_eq!(pdf.len(), plan.pdf_len);

    let mut output = Vec::with_capacity(plan.total_len);

    output.extend_from_slice(&header.to_bytes());
    for (entry, &offset) in entries.iter().zip(&plan.blob_offsets) {
        output.extend_from_slice(&entry.relocated(offset).to_bytes());
    }
    output.extend_from_slice(pdf);
    for blob in blobs {
        output.extend_from_slice(blob);
    }

    debug_assert_eq!(output.len(), plan.total_len);
    output
}
