//! Classic cross-reference table reading
//!
//! Only what is needed to shift a PDF inside a larger file is parsed:
//! ```text
//! %PDF-1.x
//! ... objects ...
//! xref                       <- xref_offset
//! 0 N
//! 0000000000 65535 f         <- 20-byte entries, 10-digit offset field
//! 0000000015 00000 n
//! ...
//! trailer
//! << /Root X 0 R /Size N >>
//! startxref
//! OFFSET                     <- startxref field
//! %%EOF
//! ```
//!
//! Every numeric field that holds a byte offset is recorded as a
//! [`FieldSpan`] so it can later be rewritten without moving any byte.

use tracing::debug;

use crate::error::PolyglotError;

/// PDF readers look for the header within this many leading bytes
pub const PDF_HEADER_WINDOW: usize = 1024;

/// Width of the offset field in a cross-reference entry
pub const XREF_OFFSET_WIDTH: usize = 10;

/// Length of one cross-reference entry line including its EOL
pub const XREF_ENTRY_LEN: usize = 20;

const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Location and value of a fixed-width ASCII decimal field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub start: usize,
    pub width: usize,
    pub value: u64,
}

impl FieldSpan {
    pub fn end(&self) -> usize {
        self.start + self.width
    }
}

/// Cross-reference entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrefEntry {
    pub object: u32,
    pub generation: u16,
    pub in_use: bool,
    /// First field of the entry: a byte offset for in-use entries, the
    /// next free object number for free ones
    pub field: FieldSpan,
}

impl XrefEntry {
    /// Byte offset of the object, if this entry is in use
    pub fn offset(&self) -> Option<u64> {
        self.in_use.then_some(self.field.value)
    }
}

/// Parsed xref section and trailer of a single-section PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfXref {
    /// Where `%PDF` starts in the buffer
    pub header_offset: usize,
    /// Where the `xref` keyword starts in the buffer
    pub xref_offset: usize,
    /// The integer following the last `startxref`
    pub startxref: FieldSpan,
    /// Whitespace around the startxref integer it may grow into
    pub startxref_slack: FieldSlack,
    /// Entries in table order
    pub entries: Vec<XrefEntry>,
    /// `/Size` from the trailer, when present
    pub size: Option<u32>,
}

impl PdfXref {
    /// Parse a standalone PDF, which must start with `%PDF`
    pub fn parse(bytes: &[u8]) -> Result<Self, PolyglotError> {
        if !bytes.starts_with(PDF_SIGNATURE) {
            return Err(PolyglotError::Format("not a PDF".into()));
        }
        Self::parse_with_header(bytes, 0)
    }

    /// Parse a PDF whose header may sit anywhere in the first 1024 bytes,
    /// the way PDF readers accept it. Offsets are relative to the buffer.
    pub fn parse_embedded(bytes: &[u8]) -> Result<Self, PolyglotError> {
        let header_offset = find_header(bytes).ok_or_else(|| {
            PolyglotError::Format(format!(
                "%PDF not found in first {} bytes",
                PDF_HEADER_WINDOW
            ))
        })?;
        Self::parse_with_header(bytes, header_offset)
    }

    fn parse_with_header(bytes: &[u8], header_offset: usize) -> Result<Self, PolyglotError> {
        let window_end = bytes.len().min(header_offset + PDF_HEADER_WINDOW);
        if contains_pattern(&bytes[header_offset..window_end], b"/Linearized") {
            return Err(PolyglotError::UnsupportedFormat(
                "linearized PDFs are not supported".into(),
            ));
        }

        let (startxref, startxref_slack) = find_startxref(bytes)?;
        let xref_offset = usize::try_from(startxref.value)
            .ok()
            .filter(|&off| off < bytes.len())
            .ok_or_else(|| {
                PolyglotError::Format(format!(
                    "startxref {} points past end of file ({} bytes)",
                    startxref.value,
                    bytes.len()
                ))
            })?;

        let (entries, trailer_offset) = parse_xref_table(bytes, xref_offset)?;
        let size = parse_trailer(bytes, trailer_offset, startxref.start)?;

        debug!(
            header_offset,
            xref_offset,
            entries = entries.len(),
            "parsed cross-reference table"
        );

        Ok(PdfXref {
            header_offset,
            xref_offset,
            startxref,
            startxref_slack,
            entries,
            size,
        })
    }

    /// Byte offset of an in-use object
    pub fn object_offset(&self, object: u32) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.object == object)
            .and_then(XrefEntry::offset)
    }

    /// Entries holding byte offsets
    pub fn in_use(&self) -> impl Iterator<Item = &XrefEntry> {
        self.entries.iter().filter(|e| e.in_use)
    }

    /// Every field that has to move when the document moves
    pub fn offset_fields(&self) -> Vec<(String, FieldSpan)> {
        let mut fields: Vec<(String, FieldSpan)> = self
            .in_use()
            .map(|e| (format!("object {} offset", e.object), e.field))
            .collect();
        fields.push(("startxref".to_string(), self.startxref));
        fields
    }
}

/// Position of `%PDF` within the header window
pub fn find_header(bytes: &[u8]) -> Option<usize> {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW + PDF_SIGNATURE.len() - 1)];
    find_pattern(window, PDF_SIGNATURE)
}

/// Redundant whitespace on either side of a field
///
/// One whitespace byte on each side is kept as a separator, so a run of
/// `\r\n` leaves one byte of slack and a lone `\n` leaves none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSlack {
    pub before: usize,
    pub after: usize,
}

/// Find the last startxref, the span of its integer and the slack around it
fn find_startxref(bytes: &[u8]) -> Result<(FieldSpan, FieldSlack), PolyglotError> {
    let pos = rfind_pattern(bytes, b"startxref")
        .ok_or_else(|| PolyglotError::UnsupportedFormat("startxref not found".into()))?;

    let keyword_end = pos + b"startxref".len();
    let start = skip_whitespace(bytes, keyword_end);
    let end = skip_digits(bytes, start);
    if start == end {
        return Err(PolyglotError::Format("startxref has no offset".into()));
    }

    let after = skip_whitespace(bytes, end);
    if !bytes[after..].starts_with(b"%%EOF") {
        return Err(PolyglotError::UnsupportedFormat(
            "%%EOF does not follow startxref".into(),
        ));
    }

    let field = FieldSpan {
        start,
        width: end - start,
        value: parse_decimal(&bytes[start..end], "startxref")?,
    };
    let slack = FieldSlack {
        before: (start - keyword_end).saturating_sub(1),
        after: (after - end).saturating_sub(1),
    };
    Ok((field, slack))
}

/// Parse xref table starting at given offset
fn parse_xref_table(
    bytes: &[u8],
    offset: usize,
) -> Result<(Vec<XrefEntry>, usize), PolyglotError> {
    if !bytes[offset..].starts_with(b"xref") {
        if looks_like_object_header(&bytes[offset..]) {
            return Err(PolyglotError::UnsupportedFormat(
                "cross-reference streams are not supported".into(),
            ));
        }
        return Err(PolyglotError::Format(format!(
            "expected 'xref' keyword at offset {}",
            offset
        )));
    }

    let mut entries = Vec::new();
    let mut pos = skip_whitespace(bytes, offset + 4);

    // Subsections run until the trailer keyword
    while pos < bytes.len() && !bytes[pos..].starts_with(b"trailer") {
        let line_end = bytes[pos..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .map_or(bytes.len(), |p| p + pos);
        let line = std::str::from_utf8(&bytes[pos..line_end])
            .map_err(|_| PolyglotError::Format("Invalid xref subsection".into()))?;

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(PolyglotError::Format(format!(
                "invalid xref subsection header at offset {}",
                pos
            )));
        }

        let first: u32 = parts[0]
            .parse()
            .map_err(|_| PolyglotError::Format("Invalid xref start".into()))?;
        let count: u32 = parts[1]
            .parse()
            .map_err(|_| PolyglotError::Format("Invalid xref count".into()))?;
        debug!(first, count, "xref subsection");

        pos = skip_eol(bytes, line_end);

        for i in 0..count {
            if pos + XREF_ENTRY_LEN > bytes.len() {
                return Err(PolyglotError::Format(format!(
                    "xref entry {} truncated",
                    first as u64 + i as u64
                )));
            }
            let object = first.checked_add(i).ok_or_else(|| {
                PolyglotError::Format("xref object number overflows".into())
            })?;
            entries.push(parse_entry(bytes, pos, object)?);
            pos += XREF_ENTRY_LEN;
        }

        pos = skip_whitespace(bytes, pos);
    }

    if pos >= bytes.len() {
        return Err(PolyglotError::Format("trailer not found".into()));
    }

    Ok((entries, pos))
}

/// Parse one 20-byte entry: `nnnnnnnnnn ggggg n\r\n`
fn parse_entry(bytes: &[u8], pos: usize, object: u32) -> Result<XrefEntry, PolyglotError> {
    let line = &bytes[pos..pos + XREF_ENTRY_LEN];
    let malformed = || PolyglotError::Format(format!("malformed xref entry at offset {}", pos));

    if line[10] != b' ' || line[16] != b' ' {
        return Err(malformed());
    }
    if !line[..XREF_OFFSET_WIDTH].iter().all(u8::is_ascii_digit)
        || !line[11..16].iter().all(u8::is_ascii_digit)
    {
        return Err(malformed());
    }

    let in_use = match line[17] {
        b'n' => true,
        b'f' => false,
        _ => return Err(malformed()),
    };

    let value = parse_decimal(&line[..XREF_OFFSET_WIDTH], "xref offset")?;
    let generation: u16 = parse_decimal(&line[11..16], "xref generation")?
        .try_into()
        .map_err(|_| malformed())?;

    Ok(XrefEntry {
        object,
        generation,
        in_use,
        field: FieldSpan {
            start: pos,
            width: XREF_OFFSET_WIDTH,
            value,
        },
    })
}

/// Parse trailer dictionary, rejecting incremental updates and hybrid files
fn parse_trailer(
    bytes: &[u8],
    offset: usize,
    startxref_field: usize,
) -> Result<Option<u32>, PolyglotError> {
    let trailer_bytes = &bytes[offset..startxref_field.max(offset)];

    if !contains_pattern(trailer_bytes, b"<<") {
        return Err(PolyglotError::Format("Trailer dict not found".into()));
    }
    if contains_pattern(trailer_bytes, b"/Prev") {
        return Err(PolyglotError::UnsupportedFormat(
            "incremental updates (/Prev) are not supported".into(),
        ));
    }
    if contains_pattern(trailer_bytes, b"/XRefStm") {
        return Err(PolyglotError::UnsupportedFormat(
            "hybrid xref streams (/XRefStm) are not supported".into(),
        ));
    }

    Ok(extract_int_after(trailer_bytes, b"/Size").and_then(|n| u32::try_from(n).ok()))
}

/// `N G obj` at the start of the slice
fn looks_like_object_header(bytes: &[u8]) -> bool {
    parse_object_header(bytes).is_some()
}

/// Parse a leading `N G obj`, returning object and generation numbers
pub fn parse_object_header(bytes: &[u8]) -> Option<(u32, u16)> {
    let num_end = skip_digits(bytes, 0);
    if num_end == 0 {
        return None;
    }
    let gen_start = skip_whitespace(bytes, num_end);
    let gen_end = skip_digits(bytes, gen_start);
    if gen_start == num_end || gen_end == gen_start {
        return None;
    }
    let kw_start = skip_whitespace(bytes, gen_end);
    if kw_start == gen_end || !bytes[kw_start..].starts_with(b"obj") {
        return None;
    }

    let object = std::str::from_utf8(&bytes[..num_end]).ok()?.parse().ok()?;
    let generation = std::str::from_utf8(&bytes[gen_start..gen_end])
        .ok()?
        .parse()
        .ok()?;
    Some((object, generation))
}

fn parse_decimal(digits: &[u8], what: &str) -> Result<u64, PolyglotError> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| PolyglotError::Format(format!("Invalid {} number", what)))
}

fn is_pdf_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\r' | b'\t' | b'\x0c' | b'\0')
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_pdf_whitespace(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn skip_digits(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    pos
}

/// Step over one `\n`, `\r` or `\r\n`
fn skip_eol(bytes: &[u8], pos: usize) -> usize {
    if bytes[pos..].starts_with(b"\r\n") {
        pos + 2
    } else if pos < bytes.len() {
        pos + 1
    } else {
        pos
    }
}

/// Find pattern in bytes
fn find_pattern(bytes: &[u8], pattern: &[u8]) -> Option<usize> {
    bytes
        .windows(pattern.len())
        .position(|window| window == pattern)
}

/// Find last occurrence of pattern in bytes
fn rfind_pattern(bytes: &[u8], pattern: &[u8]) -> Option<usize> {
    bytes
        .windows(pattern.len())
        .rposition(|window| window == pattern)
}

/// Check if bytes contain pattern
fn contains_pattern(bytes: &[u8], pattern: &[u8]) -> bool {
    find_pattern(bytes, pattern).is_some()
}

/// Extract integer after a key (e.g., "/Size 100")
fn extract_int_after(bytes: &[u8], key: &[u8]) -> Option<i64> {
    let pos = find_pattern(bytes, key)?;
    let after = &bytes[pos + key.len()..];

    // Skip whitespace
    let start = after
        .iter()
        .position(|&b| b.is_ascii_digit() || b == b'-')?;
    let after = &after[start..];

    // Read number
    let end = after
        .iter()
        .position(|&b| !b.is_ascii_digit() && b != b'-')
        .unwrap_or(after.len());

    std::str::from_utf8(&after[..end]).ok()?.parse().ok()
}
