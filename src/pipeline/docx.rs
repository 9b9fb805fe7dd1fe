//! DOCX text extraction.
//!
//! A `.docx` file is a ZIP container whose main body lives in
//! `word/document.xml` (WordprocessingML). Extraction pulls the text runs of
//! each paragraph in document order and joins paragraphs with `\n`. Table
//! cell text shows up the same way, one cell paragraph per line.
//!
//! Legacy `.doc` files (OLE/CFB containers) are accepted by extension but
//! cannot be parsed here; they fail with an explicit message instead of a
//! generic ZIP error.

use crate::error::AnalysisError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Magic bytes of an OLE compound file, the container of legacy `.doc`.
const CFB_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

/// Extract concatenated paragraph text from a DOCX file.
///
/// Returns the paragraphs joined with `\n`; blank paragraphs are skipped.
/// The result may be empty for a document with no text at all (the caller
/// decides what that means).
pub fn extract_text(bytes: &[u8]) -> Result<String, AnalysisError> {
    if bytes.starts_with(&CFB_MAGIC) {
        return Err(AnalysisError::DocumentCorrupt {
            detail: "legacy .doc (OLE) format cannot be parsed; convert the file to .docx".into(),
        });
    }

    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| AnalysisError::DocumentCorrupt {
            detail: format!("not a valid DOCX archive: {e}"),
        })?;

    let mut xml = Vec::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AnalysisError::DocumentCorrupt {
            detail: format!("DOCX archive has no word/document.xml: {e}"),
        })?
        .read_to_end(&mut xml)
        .map_err(|e| AnalysisError::DocumentCorrupt {
            detail: format!("failed to read word/document.xml: {e}"),
        })?;

    paragraphs_from_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

/// Pull non-empty paragraph texts out of a WordprocessingML body, in order.
fn paragraphs_from_xml(xml: &[u8]) -> Result<Vec<String>, AnalysisError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut paragraph = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => paragraph.clear(),
                b"t" => in_text_run = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => paragraph.push('\t'),
                b"br" => paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t.unescape().map_err(|e| AnalysisError::DocumentCorrupt {
                    detail: format!("invalid XML text in document body: {e}"),
                })?;
                paragraph.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => {
                    if !paragraph.trim().is_empty() {
                        paragraphs.push(paragraph.trim_end().to_string());
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(AnalysisError::DocumentCorrupt {
                    detail: format!("invalid XML in document body: {e}"),
                })
            }
        }
        buf.clear();
    }

    Ok(paragraphs)
}

/// Build a minimal in-memory DOCX containing the given paragraphs.
/// Shared fixture for the unit tests here and in the normalizer.
#[cfg(test)]
pub(crate) fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{body}</w:body></w:document>"#
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer
        .write_all(br#"<?xml version="1.0"?><Types/>"#)
        .unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
