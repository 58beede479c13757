//! PDF text extraction wrapper
//!
//! Wraps the pdf-extract crate with error handling for:
//! - Non-PDF uploads (magic byte check)
//! - Corrupted or encrypted PDFs
//! - Scanned/image-only PDFs (no text layer; OCR is out of scope)
//!
//! Extraction is deterministic: the same bytes always yield the same text,
//! concatenated in page order.

use crate::error::AppError;

/// Extract the full text of a PDF from raw bytes
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, AppError> {
    if pdf_bytes.len() < 4 || &pdf_bytes[0..4] != b"%PDF" {
        return Err(AppError::Extraction(
            "not a valid PDF (missing %PDF header)".to_string(),
        ));
    }

    let text = pdf_extract::extract_text_from_mem(pdf_bytes)
        .map_err(|e| AppError::Extraction(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(AppError::Extraction(
            "no text layer found (scanned or image-only PDF)".to_string(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a minimal one-page PDF with a single text object. Offsets in
    /// the xref table are computed from the actual byte positions.
    fn minimal_pdf(text: &str) -> Vec<u8> {
        let stream = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                stream.len(),
                stream
            ),
        ];

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, obj) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, obj).as_bytes());
        }

        let xref_pos = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for off in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_pos
            )
            .as_bytes(),
        );
        out
    }

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let err = extract_text(b"this is not a pdf at all").unwrap_err();
        assert!(err.to_string().contains("%PDF"));
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(extract_text(&[]).is_err());
    }

    #[test]
    fn test_rejects_truncated_pdf() {
        // Valid magic but nothing behind it
        assert!(extract_text(b"%PDF-1.4\n").is_err());
    }

    #[test]
    fn test_extracts_text_from_minimal_pdf() {
        let pdf = minimal_pdf("Patent test document");
        let text = extract_text(&pdf).unwrap();
        assert!(text.contains("Patent"), "extracted: {:?}", text);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let pdf = minimal_pdf("Deterministic extraction check");
        let first = extract_text(&pdf).unwrap();
        let second = extract_text(&pdf).unwrap();
        assert_eq!(first, second);
    }
}
