use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyglotError {
    #[error("Malformed input: {0}")]
    Format(String),

    #[error("Unsupported PDF: {0}")]
    UnsupportedFormat(String),

    #[error(
        "Too many sub-images: {count} (prefix of {prefix_len} bytes exceeds the {window}-byte PDF header window, max {max})",
        window = crate::xref::PDF_HEADER_WINDOW,
        max = crate::layout::MAX_SUB_IMAGES
    )]
    TooManySubImages { count: usize, prefix_len: usize },

    #[error("Output would be {total_len} bytes, ICO offsets are limited to 4294967295")]
    FileTooLarge { total_len: u64 },

    #[error("Shifted value {value} does not fit the {width}-digit {field} field")]
    OffsetOverflow {
        field: String,
        value: u64,
        width: usize,
    },
}

impl PolyglotError {
    /// Stable machine-readable code for this error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PolyglotError::Format(_) => "FORMAT_ERROR",
            PolyglotError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            PolyglotError::TooManySubImages { .. } => "TOO_MANY_SUB_IMAGES",
            PolyglotError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            PolyglotError::OffsetOverflow { .. } => "OFFSET_OVERFLOW",
        }
    }
}
