//! Fixtures shared by the unit tests

use crate::ico::{ICO_DIR_ENTRY_LEN, ICO_HEADER_LEN};

/// How to lay out a minimal three-object PDF
pub struct PdfFixture {
    pub header: String,
    pub trailer_extra: String,
    /// Comment bytes inserted between the last object and `xref`, at least two
    pub padding: usize,
}

impl Default for PdfFixture {
    fn default() -> Self {
        PdfFixture {
            header: "%PDF-1.4\n".into(),
            trailer_extra: String::new(),
            padding: 0,
        }
    }
}

pub struct BuiltPdf {
    pub bytes: Vec<u8>,
    /// Offsets of objects 1..=3
    pub object_offsets: Vec<usize>,
    pub xref_offset: usize,
}

/// Build PDF with correct offsets
pub fn build_pdf(fixture: &PdfFixture) -> BuiltPdf {
    let mut pdf = fixture.header.as_bytes().to_vec();
    let mut object_offsets = Vec::new();

    object_offsets.push(pdf.len());
    pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    object_offsets.push(pdf.len());
    pdf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

    object_offsets.push(pdf.len());
    pdf.extend_from_slice(
        b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>\nendobj\n",
    );

    if fixture.padding > 0 {
        pdf.push(b'%');
        pdf.extend(std::iter::repeat(b'x').take(fixture.padding.saturating_sub(2)));
        pdf.push(b'\n');
    }

    let xref_offset = pdf.len();
    pdf.extend_from_slice(b"xref\n0 4\n");
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for off in &object_offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }

    pdf.extend_from_slice(
        format!("trailer\n<< /Size 4 /Root 1 0 R{} >>\n", fixture.trailer_extra).as_bytes(),
    );
    pdf.extend_from_slice(format!("startxref\n{}\n%%EOF\n", xref_offset).as_bytes());

    BuiltPdf {
        bytes: pdf,
        object_offsets,
        xref_offset,
    }
}

/// Build an ICO whose blobs follow the directory back to back
pub fn build_ico(blobs: &[Vec<u8>]) -> Vec<u8> {
    let mut ico = Vec::new();
    ico.extend_from_slice(&0u16.to_le_bytes());
    ico.extend_from_slice(&1u16.to_le_bytes());
    ico.extend_from_slice(&(blobs.len() as u16).to_le_bytes());

    let mut offset = ICO_HEADER_LEN + blobs.len() * ICO_DIR_ENTRY_LEN;
    for (i, blob) in blobs.iter().enumerate() {
        let size = 16u8 << (i % 4);
        ico.extend_from_slice(&[size, size, 0, 0]);
        ico.extend_from_slice(&1u16.to_le_bytes());
        ico.extend_from_slice(&32u16.to_le_bytes());
        ico.extend_from_slice(&(blob.len() as u32).to_le_bytes());
        ico.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += blob.len();
    }

    for blob in blobs {
        ico.extend_from_slice(blob);
    }
    ico
}
