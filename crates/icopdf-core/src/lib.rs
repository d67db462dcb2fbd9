//! ICO/PDF polyglot builder
//!
//! Produces a single file that icon loaders read as an ICO and PDF readers
//! read as a PDF. The ICO header and directory go first, the PDF follows
//! with its xref offsets shifted past them, and the icon images are
//! appended after the PDF's `%%EOF`.
//!
//! The build is one linear pipeline over borrowed input buffers:
//! - `ico::IcoFile::parse` / `xref::PdfXref::parse`: read structure
//! - `layout::PolyglotPlan::new`: place every part, enforce limits
//! - `patch::shift_offsets`: rewrite xref fields in a copy of the PDF
//! - `assemble::assemble`: concatenate
//!
//! Every check runs before the first output byte is produced.

pub mod assemble;
pub mod error;
pub mod ico;
pub mod layout;
pub mod patch;
pub mod report;
pub mod verify;
pub mod xref;

#[cfg(test)]
mod testutil;

pub use error::PolyglotError;
pub use ico::{IcoDirEntry, IcoFile, IcoHeader};
pub use layout::{PolyglotPlan, MAX_SUB_IMAGES};
pub use report::BuildReport;
pub use verify::{verify_polyglot, VerifyReport};
pub use xref::PdfXref;

use tracing::info;

/// Finished polyglot bytes and what went into them
#[derive(Debug, Clone)]
pub struct Polyglot {
    pub bytes: Vec<u8>,
    pub report: BuildReport,
}

/// Build an ICO/PDF polyglot from an icon and a single-section PDF
pub fn build_polyglot(ico: &[u8], pdf: &[u8]) -> Result<Polyglot, PolyglotError> {
    let icon = IcoFile::parse(ico)?;
    let xref = PdfXref::parse(pdf)?;

    let plan = PolyglotPlan::new(pdf.len(), &icon.blob_lens())?;
    let patched = patch::shift_offsets(pdf, &xref, plan.shift())?;

    let bytes = assemble::assemble(
        &icon.header,
        &icon.entries,
        &plan,
        &patched.bytes,
        &icon.blobs,
    );

    let report = BuildReport {
        sub_images: icon.entries.len(),
        prefix_len: plan.prefix_len,
        pdf_len: plan.pdf_len,
        output_len: bytes.len(),
        fields_patched: patched.fields_patched,
        startxref_before: xref.startxref.value,
        startxref_after: patched.startxref,
    };
    info!(
        sub_images = report.sub_images,
        output_len = report.output_len,
        "built ICO/PDF polyglot"
    );

    Ok(Polyglot { bytes, report })
}
