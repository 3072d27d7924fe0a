//! Region cropping: saves table/figure sub-images from page rasters.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageReader;
use log::debug;

use crate::error::{ProcessError, StorageError};
use crate::service::{BoundingBox, PageRaster, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Table,
    Image,
}

/// A region crop saved to the job output directory.
#[derive(Debug, Clone)]
pub struct SavedRegion {
    pub index: usize,
    pub kind: RegionKind,
    pub page_number: u32,
    pub bounding_box: BoundingBox,
    /// File name relative to the job output directory.
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("{0}")]
    Process(#[from] ProcessError),

    #[error("{0}")]
    Storage(#[from] StorageError),
}

/// Crops every table/image bounding region out of the corresponding
/// page raster and writes it under the job directory.
///
/// File names are deterministic (`<job_id>_region_<index>.png`) and
/// writes truncate, so re-running the same job id overwrites earlier
/// crops instead of accumulating duplicates. Any failed save aborts the
/// whole extraction; there are no partial silent skips.
pub struct RegionExtractor;

impl RegionExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(
        &self,
        result: &ServiceResult,
        job_id: &str,
        job_dir: &Path,
    ) -> Result<Vec<SavedRegion>, RegionError> {
        if !job_dir.exists() {
            std::fs::create_dir_all(job_dir).map_err(|e| StorageError::CreateDirectory {
                path: job_dir.to_path_buf(),
                source: e,
            })?;
        }

        let regions: Vec<(RegionKind, u32, &BoundingBox)> = result
            .tables
            .iter()
            .map(|t| (RegionKind::Table, t.page_number, &t.bounding_box))
            .chain(
                result
                    .images
                    .iter()
                    .map(|i| (RegionKind::Image, i.page_number, &i.bounding_box)),
            )
            .collect();

        let mut saved = Vec::with_capacity(regions.len());

        for (index, (kind, page_number, bbox)) in regions.into_iter().enumerate() {
            let raster = result
                .raster_for_page(page_number)
                .ok_or(ProcessError::MissingPageRaster { page: page_number })?;

            let crop = crop_raster(raster, bbox)?;

            let file_name = format!("{}_region_{:03}.png", job_id, index);
            let path = job_dir.join(&file_name);

            let mut encoded = Vec::new();
            crop.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
                .map_err(|e| ProcessError::RasterDecode {
                    page: page_number,
                    reason: format!("failed to encode crop: {}", e),
                })?;

            std::fs::write(&path, &encoded).map_err(|e| StorageError::WriteFile {
                path: path.clone(),
                source: e,
            })?;

            debug!(
                "Saved {:?} region {} (page {}) to {}",
                kind,
                index,
                page_number,
                path.display()
            );

            saved.push(SavedRegion {
                index,
                kind,
                page_number,
                bounding_box: bbox.clone(),
                file_name,
                path,
            });
        }

        Ok(saved)
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn crop_raster(raster: &PageRaster, bbox: &BoundingBox) -> Result<image::DynamicImage, ProcessError> {
    let decoded = ImageReader::new(Cursor::new(&raster.data))
        .with_guessed_format()
        .map_err(|e| ProcessError::RasterDecode {
            page: raster.page_number,
            reason: e.to_string(),
        })?
        .decode()
        .map_err(|e| ProcessError::RasterDecode {
            page: raster.page_number,
            reason: e.to_string(),
        })?;

    let (x, y, w, h) = bbox.to_pixels(decoded.width(), decoded.height());
    Ok(decoded.crop_imm(x, y, w, h))
}
