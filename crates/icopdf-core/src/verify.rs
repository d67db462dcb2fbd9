//! Independent re-reading of a finished polyglot
//!
//! The checks mirror what an icon loader and a PDF reader do with the
//! file: walk the ICO directory from byte 0, then find `%PDF` in the
//! header window and follow `startxref` to every object.

use serde::Serialize;
use tracing::debug;

use crate::error::PolyglotError;
use crate::ico::IcoFile;
use crate::xref::{parse_object_header, PdfXref};

/// What the verifier saw in a polyglot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub sub_images: usize,
    pub pdf_offset: usize,
    pub objects_checked: usize,
}

/// Check that `bytes` reads both as an icon and as a PDF
pub fn verify_polyglot(bytes: &[u8]) -> Result<VerifyReport, PolyglotError> {
    let ico = IcoFile::parse(bytes)?;
    let xref = PdfXref::parse_embedded(bytes)?;

    if xref.header_offset < ico.prefix_len() {
        return Err(PolyglotError::Format(format!(
            "%PDF at {} overlaps the ICO directory ending at {}",
            xref.header_offset,
            ico.prefix_len()
        )));
    }

    let mut objects_checked = 0;
    for entry in xref.in_use() {
        let offset = entry.field.value as usize;
        let found = bytes.get(offset..).and_then(parse_object_header);
        if found != Some((entry.object, entry.generation)) {
            return Err(PolyglotError::Format(format!(
                "xref entry for object {} points at offset {} which does not hold it",
                entry.object, offset
            )));
        }
        objects_checked += 1;
    }

    let report = VerifyReport {
        sub_images: ico.entries.len(),
        pdf_offset: xref.header_offset,
        objects_checked,
    };
    debug!(?report, "polyglot verified");
    Ok(report)
}
