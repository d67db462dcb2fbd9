//! In-place shifting of PDF offsets
//!
//! Moving a PDF forward by `P` bytes invalidates every absolute offset it
//! stores. In a classic xref table those live in fixed-width decimal
//! fields, so they can be rewritten digit for digit without the document
//! changing length and without any other offset going stale.
//!
//! `startxref` is the one free-form integer. When its shifted value needs
//! more digits it borrows redundant whitespace next to it, such as the
//! `\r` of a `\r\n` line ending.

use tracing::debug;

use crate::error::PolyglotError;
use crate::xref::{FieldSlack, FieldSpan, PdfXref};

/// PDF bytes with every offset field shifted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedPdf {
    pub bytes: Vec<u8>,
    pub fields_patched: usize,
    pub startxref: u64,
}

/// Shift every xref offset and the startxref value of `pdf` by `shift`
///
/// Returns a new buffer of the same length as `pdf`; only the digits of
/// the recorded fields and any whitespace borrowed by `startxref` differ.
pub fn shift_offsets(
    pdf: &[u8],
    xref: &PdfXref,
    shift: u64,
) -> Result<PatchedPdf, PolyglotError> {
    let mut bytes = pdf.to_vec();
    let mut fields_patched = 0;

    for entry in xref.in_use() {
        let name = format!("object {} offset", entry.object);
        write_field(&mut bytes, &name, &entry.field, shift)?;
        fields_patched += 1;
    }

    let startxref = write_startxref(&mut bytes, &xref.startxref, xref.startxref_slack, shift)?;
    fields_patched += 1;
    debug!(fields = fields_patched, shift, startxref, "shifted PDF offsets");

    Ok(PatchedPdf {
        bytes,
        fields_patched,
        startxref,
    })
}

/// Render `value` zero-padded to exactly `width` digits
pub fn render_fixed_width(value: u64, width: usize) -> Option<String> {
    let digits = format!("{:0width$}", value, width = width);
    (digits.len() == width).then_some(digits)
}

fn write_field(
    bytes: &mut [u8],
    name: &str,
    field: &FieldSpan,
    shift: u64,
) -> Result<(), PolyglotError> {
    let overflow = |value| PolyglotError::OffsetOverflow {
        field: name.to_string(),
        value,
        width: field.width,
    };

    let value = field
        .value
        .checked_add(shift)
        .ok_or_else(|| overflow(u64::MAX))?;
    let digits = render_fixed_width(value, field.width).ok_or_else(|| overflow(value))?;

    bytes[field.start..field.end()].copy_from_slice(digits.as_bytes());
    Ok(())
}

/// Rewrite the startxref integer, growing into `slack` if it needs more digits
fn write_startxref(
    bytes: &mut [u8],
    field: &FieldSpan,
    slack: FieldSlack,
    shift: u64,
) -> Result<u64, PolyglotError> {
    let room = field.width + slack.before + slack.after;
    let overflow = |value| PolyglotError::OffsetOverflow {
        field: "startxref".to_string(),
        value,
        width: room,
    };

    let value = field
        .value
        .checked_add(shift)
        .ok_or_else(|| overflow(u64::MAX))?;
    let digits = value.to_string();
    if digits.len() > room {
        return Err(overflow(value));
    }

    // Borrow from the line ending first so the keyword keeps its own line
    let extra = digits.len().saturating_sub(field.width);
    let after = extra.min(slack.after);
    let before = extra - after;
    let start = field.start - before;
    let end = field.end() + after;

    if extra > 0 {
        debug!(value, before, after, "startxref grew into surrounding whitespace");
    }
    let text = render_fixed_width(value, end - start).ok_or_else(|| overflow(value))?;
    bytes[start..end].copy_from_slice(text.as_bytes());
    Ok(value)
}
