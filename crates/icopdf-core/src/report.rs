use serde::Serialize;

/// Summary of one polyglot build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub sub_images: usize,
    /// ICO header + directory bytes in front of the PDF
    pub prefix_len: usize,
    pub pdf_len: usize,
    pub output_len: usize,
    /// Xref offsets plus the startxref value
    pub fields_patched: usize,
    pub startxref_before: u64,
    pub startxref_after: u64,
}

impl BuildReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for BuildReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} images, PDF at byte {} ({} bytes), {} offsets shifted, {} bytes total",
            self.sub_images, self.prefix_len, self.pdf_len, self.fields_patched, self.output_len
        )
    }
}
