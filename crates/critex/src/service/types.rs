//! Types returned by the external document processing service.

use serde::{Deserialize, Serialize};

/// Normalized bounding region on a page. Coordinates are fractions of
/// the page dimensions in `[0, 1]`, origin top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Pixel rectangle `(x, y, w, h)` for a raster of the given size,
    /// clamped to the raster bounds.
    pub fn to_pixels(&self, raster_width: u32, raster_height: u32) -> (u32, u32, u32, u32) {
        let clamp01 = |v: f64| v.clamp(0.0, 1.0);
        let x = (clamp01(self.x) * raster_width as f64).round() as u32;
        let y = (clamp01(self.y) * raster_height as f64).round() as u32;
        let w = (clamp01(self.width) * raster_width as f64).round() as u32;
        let h = (clamp01(self.height) * raster_height as f64).round() as u32;
        let x = x.min(raster_width.saturating_sub(1));
        let y = y.min(raster_height.saturating_sub(1));
        let w = w.max(1).min(raster_width - x);
        let h = h.max(1).min(raster_height - y);
        (x, y, w, h)
    }
}

/// A generic entity extracted by the processor: a labeled, located
/// piece of text with a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    /// Processor-assigned type label, e.g. "VERTICAL_LIVE_LOADS".
    pub type_label: String,
    /// The text span the entity was anchored to.
    pub mention_text: String,
    /// Processor-normalized value, when the processor provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_value: Option<String>,
    pub confidence: f64,
    pub page_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// A table detected by the processor, with its cell grid when layout
/// recognition succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub page_number: u32,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    pub confidence: f64,
}

/// A figure/image region detected by the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedImage {
    pub page_number: u32,
    pub bounding_box: BoundingBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub confidence: f64,
}

/// Rasterized page image, sufficient for cropping sub-regions.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRaster {
    pub page_number: u32,
    pub width: u32,
    pub height: u32,
    /// Encoded image bytes (PNG or JPEG) as delivered by the service.
    pub data: Vec<u8>,
}

/// Complete response of one document submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResult {
    /// Full OCR text of the document.
    pub text: String,
    pub entities: Vec<RawEntity>,
    pub tables: Vec<RawTable>,
    pub images: Vec<DetectedImage>,
    pub pages: Vec<PageRaster>,
    pub processor_version: Option<String>,
    /// Overall extraction confidence reported by the processor.
    pub confidence: f64,
}

impl ServiceResult {
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Raster for a 1-based page number.
    pub fn raster_for_page(&self, page_number: u32) -> Option<&PageRaster> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }
}
