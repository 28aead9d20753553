use super::{ExtractionError, TextExtractor};
use crate::format::DocumentKind;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Raw text layer of an OOXML word-processing package. Only `word/document.xml` is read,
/// so headers, footers and embedded parts never contribute text.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordExtractor;

impl TextExtractor for WordExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::WordDoc
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let xml = document_xml(bytes)?;
        body_text(&xml)
    }
}

#[cfg(feature = "office")]
fn document_xml(bytes: &[u8]) -> Result<String, ExtractionError> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractionError::Word(format!("not a word-processing package: {e}")))?;
    let mut part = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::Word(format!("word/document.xml: {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

#[cfg(not(feature = "office"))]
fn document_xml(_bytes: &[u8]) -> Result<String, ExtractionError> {
    Err(ExtractionError::FeatureDisabled("Word document"))
}

/// Concatenates `w:t` runs; `w:tab` becomes a tab, breaks and paragraph ends a newline.
pub fn body_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut out = String::new();
    let mut in_text = false;
    loop {
        let event = match reader.read_event() {
            Ok(ev) => ev,
            Err(e) => {
                return Err(ExtractionError::Word(format!(
                    "malformed document.xml at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        };
        match event {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" | b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::Word(format!("bad text run: {e}")))?;
                out.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}
