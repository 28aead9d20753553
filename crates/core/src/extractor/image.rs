use super::{ExtractionError, TextExtractor};
use crate::format::DocumentKind;
use tracing::debug;

/// OCR over scanned pages and photos. A Tesseract engine is created for each call and
/// dropped before `extract` returns, on success and on failure alike.
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    language: String,
    tessdata_dir: Option<String>,
}

impl ImageExtractor {
    pub fn new(language: &str, tessdata_dir: Option<&str>) -> Self {
        Self {
            language: language.to_string(),
            tessdata_dir: tessdata_dir.map(str::to_string),
        }
    }
}

impl TextExtractor for ImageExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Image
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let (width, height) = check_raster(bytes)?;
        debug!(width, height, language = %self.language, "running OCR");
        recognize(bytes, &self.language, self.tessdata_dir.as_deref())
    }
}

// The decoded image only lives for the size check.
#[cfg(feature = "image-meta")]
fn check_raster(bytes: &[u8]) -> Result<(u32, u32), ExtractionError> {
    use ::image::GenericImageView;
    let decoded =
        ::image::load_from_memory(bytes).map_err(|e| ExtractionError::Image(e.to_string()))?;
    Ok(decoded.dimensions())
}

#[cfg(not(feature = "image-meta"))]
fn check_raster(bytes: &[u8]) -> Result<(u32, u32), ExtractionError> {
    if infer::is_image(bytes) {
        Ok((0, 0))
    } else {
        Err(ExtractionError::Image(
            "content is not a recognized raster image".to_string(),
        ))
    }
}

#[cfg(feature = "ocr")]
struct OcrSession {
    engine: leptess::LepTess,
}

#[cfg(feature = "ocr")]
impl OcrSession {
    fn acquire(language: &str, tessdata_dir: Option<&str>) -> Result<Self, ExtractionError> {
        let engine = leptess::LepTess::new(tessdata_dir, language)
            .map_err(|e| ExtractionError::Ocr(format!("engine init: {e:?}")))?;
        Ok(Self { engine })
    }

    fn recognize(&mut self, bytes: &[u8]) -> Result<String, ExtractionError> {
        self.engine
            .set_image_from_mem(bytes)
            .map_err(|e| ExtractionError::Ocr(format!("load image: {e:?}")))?;
        self.engine
            .get_utf8_text()
            .map_err(|e| ExtractionError::Ocr(format!("read text: {e:?}")))
    }
}

#[cfg(feature = "ocr")]
impl Drop for OcrSession {
    fn drop(&mut self) {
        debug!("released OCR engine");
    }
}

#[cfg(feature = "ocr")]
fn recognize(
    bytes: &[u8],
    language: &str,
    tessdata_dir: Option<&str>,
) -> Result<String, ExtractionError> {
    let mut session = OcrSession::acquire(language, tessdata_dir)?;
    session.recognize(bytes)
}

#[cfg(not(feature = "ocr"))]
fn recognize(
    _bytes: &[u8],
    _language: &str,
    _tessdata_dir: Option<&str>,
) -> Result<String, ExtractionError> {
    Err(ExtractionError::FeatureDisabled("OCR"))
}
