use super::{ExtractionError, TextExtractor};
use crate::format::DocumentKind;

/// `TJ` adjustments below this (thousandths of text space) read as a word gap.
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
const WORD_GAP: f64 = -100.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        pdf_text(bytes)
    }
}

/// Pages in order, one line per page. Every shown string is its own fragment and
/// fragments are joined with single spaces.
#[cfg(feature = "pdf")]
fn pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    let mut out = Vec::with_capacity(pages.len());
    for (number, page_id) in &pages {
        let fragments = page_fragments(&doc, *page_id)
            .map_err(|e| ExtractionError::Pdf(format!("page {number}: {e}")))?;
        out.push(join_fragments(&fragments));
    }
    Ok(out.join("\n"))
}

#[cfg(not(feature = "pdf"))]
fn pdf_text(_bytes: &[u8]) -> Result<String, ExtractionError> {
    Err(ExtractionError::FeatureDisabled("PDF"))
}

#[cfg(feature = "pdf")]
fn page_fragments(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Result<Vec<String>, lopdf::Error> {
    use lopdf::content::Content;
    use std::collections::BTreeMap;

    let encodings: BTreeMap<Vec<u8>, &str> = doc
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();
    let content = Content::decode(&doc.get_page_content(page_id)?)?;

    let mut fragments = Vec::new();
    let mut encoding = None;
    for op in &content.operations {
        match op.operator.as_str() {
            "Tf" => {
                encoding = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name).copied());
            }
            // `"` carries word and char spacing before the string; only strings are kept.
            "Tj" | "'" | "\"" => {
                for operand in &op.operands {
                    if let lopdf::Object::String(raw, _) = operand {
                        fragments.push(lopdf::Document::decode_text(encoding, raw));
                    }
                }
            }
            "TJ" => {
                if let Some(lopdf::Object::Array(items)) = op.operands.first() {
                    shown_array(items, encoding, &mut fragments);
                }
            }
            _ => {}
        }
    }
    Ok(fragments)
}

/// Kerned pieces of one `TJ` stay glued; a wide negative adjustment starts a new fragment.
#[cfg(feature = "pdf")]
fn shown_array(items: &[lopdf::Object], encoding: Option<&str>, fragments: &mut Vec<String>) {
    use lopdf::Object;

    let mut current = String::new();
    for item in items {
        let adjust = match item {
            Object::String(raw, _) => {
                current.push_str(&lopdf::Document::decode_text(encoding, raw));
                continue;
            }
            Object::Integer(i) => *i as f64,
            Object::Real(r) => f64::from(*r),
            _ => continue,
        };
        if adjust < WORD_GAP && !current.is_empty() {
            fragments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        fragments.push(current);
    }
}

#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .flat_map(|f| f.as_ref().split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::join_fragments;

    #[test]
    fn fragments_collapse_to_one_spaced_line() {
        assert_eq!(
            join_fragments(&["Discharge summary", "", "  Patient stable \n"]),
            "Discharge summary Patient stable"
        );
        assert_eq!(join_fragments::<&str>(&[]), "");
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn kerned_pieces_stay_in_one_word_until_a_wide_gap() {
        use lopdf::Object;

        let items = vec![
            Object::string_literal("hea"),
            Object::Integer(-20),
            Object::string_literal("rt"),
            Object::Integer(-250),
            Object::string_literal("failure"),
            Object::Real(12.5),
        ];
        let mut fragments = Vec::new();
        super::shown_array(&items, None, &mut fragments);
        assert_eq!(fragments, vec!["heart".to_string(), "failure".to_string()]);
    }
}
