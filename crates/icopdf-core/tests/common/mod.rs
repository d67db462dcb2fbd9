//! Input builders for the integration tests

/// Binary comment line most PDF writers put after the header
pub const PDF_HEADER: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n";

/// A one-object PDF whose object sits right after the header and whose
/// xref table starts exactly at `xref_at`
pub fn single_object_pdf(xref_at: usize) -> Vec<u8> {
    let mut pdf = PDF_HEADER.to_vec();
    let object_at = pdf.len();
    pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog >>\nendobj\n");

    assert!(xref_at >= pdf.len() + 2, "xref_at too small");
    pdf.push(b'%');
    while pdf.len() < xref_at - 1 {
        pdf.push(b'-');
    }
    pdf.push(b'\n');

    pdf.extend_from_slice(b"xref\n0 2\n0000000000 65535 f \n");
    pdf.extend_from_slice(format!("{:010} 00000 n \n", object_at).as_bytes());
    pdf.extend_from_slice(b"trailer\n<< /Size 2 /Root 1 0 R >>\n");
    pdf.extend_from_slice(format!("startxref\n{}\n%%EOF\n", xref_at).as_bytes());
    pdf
}

/// An ICO with one blob per entry of `lens`, stored in reverse order
/// after the directory so entry offsets are not increasing
pub fn ico_with_images(lens: &[usize]) -> Vec<u8> {
    let count = lens.len();
    let mut ico = vec![0, 0, 1, 0];
    ico.extend_from_slice(&(count as u16).to_le_bytes());

    let data_start = 6 + 16 * count;
    let total: usize = lens.iter().sum();
    let mut end = data_start + total;
    let mut offsets = vec![0usize; count];
    for (i, &len) in lens.iter().enumerate() {
        end -= len;
        offsets[i] = end;
    }

    for (i, &len) in lens.iter().enumerate() {
        let side = (i % 256) as u8;
        ico.extend_from_slice(&[side, side, 16, 0]);
        ico.extend_from_slice(&1u16.to_le_bytes());
        ico.extend_from_slice(&8u16.to_le_bytes());
        ico.extend_from_slice(&(len as u32).to_le_bytes());
        ico.extend_from_slice(&(offsets[i] as u32).to_le_bytes());
    }

    ico.resize(data_start + total, 0);
    for (i, &len) in lens.iter().enumerate() {
        for (j, byte) in ico[offsets[i]..offsets[i] + len].iter_mut().enumerate() {
            *byte = (i * 31 + j) as u8;
        }
    }
    ico
}
