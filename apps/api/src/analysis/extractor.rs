//! Document Extractor — decodes the uploaded resume (PDF, DOCX or plain text) and
//! normalizes it together with the job description.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use bytes::Bytes;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCellContent};
use docx_rs::{TableChild, TableRowChild};
use tracing::{debug, warn};

use crate::analysis::text::{normalize, tokenize};
use crate::analysis::AnalyzeError;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
    PlainText,
}

impl ResumeFormat {
    /// Detects the format from the file extension, falling back to the declared
    /// content type only when the file name carries no extension.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Result<Self, AnalyzeError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("docx") => Ok(Self::Docx),
            Some("txt") => Ok(Self::PlainText),
            Some(other) => Err(AnalyzeError::UnsupportedFormat(format!(
                "Unsupported resume format '.{other}'. Upload a PDF, DOCX, or TXT file."
            ))),
            None => Self::from_content_type(content_type).ok_or_else(|| {
                AnalyzeError::UnsupportedFormat(format!(
                    "Could not determine the format of '{file_name}'. Upload a PDF, DOCX, or TXT file."
                ))
            }),
        }
    }

    fn from_content_type(content_type: Option<&str>) -> Option<Self> {
        let mime = content_type?.split(';').next()?.trim().to_ascii_lowercase();
        match mime.as_str() {
            "application/pdf" => Some(Self::Pdf),
            DOCX_CONTENT_TYPE => Some(Self::Docx),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::PlainText => "txt",
        }
    }
}

/// The resume as received from the multipart form.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Normalized text plus its token sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn from_raw(raw: &str) -> Self {
        let text = normalize(raw);
        let tokens = tokenize(&text);
        Self { text, tokens }
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedDocuments {
    pub format: ResumeFormat,
    pub resume: Document,
    pub job: Document,
}

/// Validates the inputs, decodes the resume and normalizes both documents.
pub fn extract(
    upload: &ResumeUpload,
    job_description: &str,
    max_resume_bytes: usize,
) -> Result<ExtractedDocuments, AnalyzeError> {
    let job = Document::from_raw(job_description);
    if job.is_blank() {
        return Err(AnalyzeError::EmptyInput(
            "Job description is required".to_string(),
        ));
    }
    if upload.bytes.is_empty() {
        return Err(AnalyzeError::EmptyInput(
            "Uploaded resume file is empty".to_string(),
        ));
    }

    let format = ResumeFormat::detect(&upload.file_name, upload.content_type.as_deref())?;

    if upload.bytes.len() > max_resume_bytes {
        return Err(AnalyzeError::FileTooLarge {
            limit: max_resume_bytes,
        });
    }

    let raw = match format {
        ResumeFormat::Pdf => extract_pdf_text(upload)?,
        ResumeFormat::Docx => extract_docx_text(upload)?,
        ResumeFormat::PlainText => decode_text_bytes(upload),
    };
    let resume = Document::from_raw(&raw);

    debug!(
        format = format.as_str(),
        bytes = upload.bytes.len(),
        resume_tokens = resume.tokens.len(),
        job_tokens = job.tokens.len(),
        "Documents extracted"
    );

    Ok(ExtractedDocuments {
        format,
        resume,
        job,
    })
}

fn extract_pdf_text(upload: &ResumeUpload) -> Result<String, AnalyzeError> {
    let data = upload.bytes.as_ref();
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(data)
    }));

    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            warn!(file = %upload.file_name, error = %e, "PDF extraction failed");
            Err(extraction_failed(upload))
        }
        Err(_) => {
            warn!(file = %upload.file_name, "PDF decoder panicked");
            Err(extraction_failed(upload))
        }
    }
}

fn extract_docx_text(upload: &ResumeUpload) -> Result<String, AnalyzeError> {
    let package = docx_rs::read_docx(upload.bytes.as_ref()).map_err(|e| {
        warn!(file = %upload.file_name, error = %e, "DOCX extraction failed");
        extraction_failed(upload)
    })?;

    let mut segments = Vec::new();
    for child in &package.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => push_paragraph(paragraph, &mut segments),
            DocumentChild::Table(table) => push_table(table, &mut segments),
            _ => {}
        }
    }
    Ok(segments.join("\n"))
}

fn push_paragraph(paragraph: &Paragraph, segments: &mut Vec<String>) {
    let mut buffer = String::new();
    for child in &paragraph.children {
        append_paragraph_child(child, &mut buffer);
    }
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
}

fn append_paragraph_child(child: &ParagraphChild, buffer: &mut String) {
    match child {
        ParagraphChild::Run(run) => append_run(run, buffer),
        ParagraphChild::Hyperlink(hyperlink) => {
            for inner in &hyperlink.children {
                append_paragraph_child(inner, buffer);
            }
        }
        _ => {}
    }
}

fn append_run(run: &Run, buffer: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => buffer.push_str(&text.text),
            RunChild::Tab(_) => buffer.push('\t'),
            RunChild::Break(_) => buffer.push('\n'),
            _ => {}
        }
    }
}

fn push_table(table: &Table, segments: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => push_paragraph(paragraph, segments),
                    TableCellContent::Table(inner) => push_table(inner, segments),
                    _ => {}
                }
            }
        }
    }
}

fn decode_text_bytes(upload: &ResumeUpload) -> String {
    match std::str::from_utf8(&upload.bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!(file = %upload.file_name, "Resume contains invalid UTF-8; replacing invalid sequences");
            String::from_utf8_lossy(&upload.bytes).into_owned()
        }
    }
}

fn extraction_failed(upload: &ResumeUpload) -> AnalyzeError {
    AnalyzeError::ExtractionFailed {
        file: upload.file_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024 * 1024;

    fn upload(name: &str, bytes: &[u8]) -> ResumeUpload {
        ResumeUpload {
            file_name: name.to_string(),
            content_type: None,
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    #[test]
    fn test_detect_by_extension_is_case_insensitive() {
        assert_eq!(ResumeFormat::detect("cv.PDF", None).unwrap(), ResumeFormat::Pdf);
        assert_eq!(ResumeFormat::detect("cv.docx", None).unwrap(), ResumeFormat::Docx);
        assert_eq!(ResumeFormat::detect("cv.txt", None).unwrap(), ResumeFormat::PlainText);
    }

    #[test]
    fn test_detect_rejects_exe_even_with_text_content_type() {
        let err = ResumeFormat::detect("resume.exe", Some("text/plain")).unwrap_err();
        assert!(matches!(err, AnalyzeError::UnsupportedFormat(ref m) if m.contains(".exe")));
    }

    #[test]
    fn test_detect_falls_back_to_content_type() {
        assert_eq!(
            ResumeFormat::detect("resume", Some("application/pdf")).unwrap(),
            ResumeFormat::Pdf
        );
        assert_eq!(
            ResumeFormat::detect("resume", Some("text/plain; charset=utf-8")).unwrap(),
            ResumeFormat::PlainText
        );
        assert_eq!(
            ResumeFormat::detect("resume", Some(DOCX_CONTENT_TYPE)).unwrap(),
            ResumeFormat::Docx
        );
        assert!(ResumeFormat::detect("resume", Some("image/png")).is_err());
        assert!(ResumeFormat::detect("resume", None).is_err());
    }

    #[test]
    fn test_extract_plain_text_normalizes_both_documents() {
        let docs = extract(
            &upload("cv.txt", b"Python,\n\n  SQL  and Communication"),
            "  Requires Python, Java ",
            LIMIT,
        )
        .unwrap();
        assert_eq!(docs.format, ResumeFormat::PlainText);
        assert_eq!(docs.resume.text, "python, sql and communication");
        assert_eq!(docs.resume.tokens, vec!["python", "sql", "communication"]);
        assert_eq!(docs.job.text, "requires python, java");
    }

    #[test]
    fn test_blank_job_description_is_empty_input() {
        let err = extract(&upload("cv.txt", b"Python"), " \n\t", LIMIT).unwrap_err();
        assert!(matches!(err, AnalyzeError::EmptyInput(_)));
    }

    #[test]
    fn test_zero_byte_resume_is_empty_input() {
        let err = extract(&upload("cv.txt", b""), "Python", LIMIT).unwrap_err();
        assert!(matches!(err, AnalyzeError::EmptyInput(_)));
    }

    #[test]
    fn test_oversized_resume_is_rejected() {
        let err = extract(&upload("cv.txt", &[b'a'; 32]), "Python", 16).unwrap_err();
        assert!(matches!(err, AnalyzeError::FileTooLarge { limit: 16 }));
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let docs = extract(&upload("cv.txt", b"Rust \xff\xfe Go"), "Rust", LIMIT).unwrap();
        assert!(docs.resume.tokens.contains(&"rust".to_string()));
        assert!(docs.resume.tokens.contains(&"go".to_string()));
    }

    #[test]
    fn test_whitespace_only_resume_is_allowed() {
        let docs = extract(&upload("cv.txt", b"   \n "), "Rust", LIMIT).unwrap();
        assert!(docs.resume.is_blank());
        assert!(docs.resume.tokens.is_empty());
    }

    /// Single-page PDF showing `text` in Helvetica, with a correct xref table.
    fn one_page_pdf(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 712 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
        }
        let xref_offset = pdf.len();
        pdf.extend_from_slice(
            format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes(),
        );
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_pdf_text_is_extracted() {
        let pdf = one_page_pdf("Senior Rust Engineer with Kubernetes");
        let docs = extract(&upload("cv.pdf", &pdf), "Rust", LIMIT).unwrap();
        assert_eq!(docs.format, ResumeFormat::Pdf);
        for expected in ["senior", "rust", "engineer", "kubernetes"] {
            assert!(
                docs.resume.tokens.iter().any(|t| t == expected),
                "missing {expected} in {:?}",
                docs.resume.tokens
            );
        }
    }

    #[test]
    fn test_corrupt_pdf_reports_file_name_only() {
        let err = extract(
            &upload("broken.pdf", b"not really a pdf, secret content"),
            "Rust",
            LIMIT,
        )
        .unwrap_err();
        match err {
            AnalyzeError::ExtractionFailed { file } => assert_eq!(file, "broken.pdf"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_docx_reports_file_name_only() {
        let err = extract(&upload("broken.docx", b"PK\x03\x04garbage"), "Rust", LIMIT).unwrap_err();
        assert!(matches!(err, AnalyzeError::ExtractionFailed { ref file } if file == "broken.docx"));
    }

    #[test]
    fn test_docx_paragraphs_and_tables_are_extracted() {
        use docx_rs::{Docx, TableCell, TableRow};

        let mut buffer = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Senior Rust Engineer")))
            .add_table(Table::new(vec![TableRow::new(vec![TableCell::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Kubernetes")))])]))
            .build()
            .pack(&mut buffer)
            .unwrap();

        let docs = extract(&upload("cv.docx", &buffer.into_inner()), "Rust", LIMIT).unwrap();
        assert_eq!(docs.resume.tokens, vec!["senior", "rust", "engineer", "kubernetes"]);
    }
}
