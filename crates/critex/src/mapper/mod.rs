pub mod taxonomy;
pub mod units;

use chrono::{DateTime, Utc};

use crate::criteria::{
    DesignCrane, DesignCriteria, DesignVehicle, DocumentMetadata, ImageData, LoadSpecification,
    SeismicForce, TableData, UnclassifiedEntity,
};
use crate::regions::{RegionKind, SavedRegion};
use crate::service::{RawEntity, ServiceResult};
use taxonomy::Category;
use units::QuantityParser;

pub use taxonomy::{classify, TaxonomyRule, TAXONOMY};
pub use units::Quantity;

/// Job-side facts about the submitted document, passed in so that
/// mapping stays a pure function of its arguments.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    pub source_filename: String,
    pub file_size: u64,
    pub processor_id: String,
    pub processed_at: DateTime<Utc>,
    pub submission_attempts: u32,
}

/// Maps a raw service result onto the typed criteria record.
///
/// Deterministic: identical inputs produce an identical record. No I/O.
pub struct EntityMapper {
    confidence_threshold: f64,
    quantities: QuantityParser,
}

impl EntityMapper {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
            quantities: QuantityParser::new(),
        }
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn map(
        &self,
        result: &ServiceResult,
        meta: SourceMeta,
        regions: &[SavedRegion],
    ) -> DesignCriteria {
        let mut loads = Vec::new();
        let mut seismic_forces = Vec::new();
        let mut design_vehicles = Vec::new();
        let mut design_cranes = Vec::new();
        let mut unclassified = Vec::new();
        let mut low_confidence_count = 0usize;

        for entity in &result.entities {
            let category = match taxonomy::classify(&entity.type_label) {
                Some(category) => category,
                None => {
                    unclassified.push(UnclassifiedEntity {
                        type_label: entity.type_label.clone(),
                        text: entity.mention_text.clone(),
                        confidence: entity.confidence,
                        page_number: entity.page_number,
                    });
                    continue;
                }
            };

            if entity.confidence < self.confidence_threshold {
                low_confidence_count += 1;
                continue;
            }

            match category {
                Category::Load(load_type) => loads.push(self.map_load(entity, load_type)),
                Category::SeismicForce => seismic_forces.push(self.map_seismic(entity)),
                Category::DesignVehicle(vehicle_type) => {
                    design_vehicles.push(self.map_vehicle(entity, vehicle_type))
                }
                Category::DesignCrane(crane_type) => {
                    design_cranes.push(self.map_crane(entity, crane_type))
                }
            }
        }

        let tables = self.map_tables(result, regions);
        let images = self.map_images(result, regions);

        DesignCriteria {
            loads,
            seismic_forces,
            design_vehicles,
            design_cranes,
            tables,
            images,
            metadata: DocumentMetadata {
                source_filename: meta.source_filename,
                file_size: meta.file_size,
                page_count: result.page_count(),
                processed_at: meta.processed_at,
                processor_id: meta.processor_id,
                processor_version: result.processor_version.clone(),
                submission_attempts: meta.submission_attempts,
                unclassified,
                low_confidence_count,
            },
            raw_text: Some(result.text.clone()),
            confidence_score: result.confidence,
        }
    }

    fn map_load(&self, entity: &RawEntity, load_type: crate::criteria::LoadType) -> LoadSpecification {
        let quantity = self.quantities.parse(&entity.mention_text);
        LoadSpecification {
            load_type,
            magnitude: quantity.as_ref().map(|q| q.value),
            unit: quantity.and_then(|q| q.unit),
            direction: None,
            location: None,
            description: non_empty(&entity.mention_text),
            confidence: entity.confidence,
            bounding_box: entity.bounding_box.clone(),
            page_number: entity.page_number,
        }
    }

    fn map_seismic(&self, entity: &RawEntity) -> SeismicForce {
        // Numeric seismic coefficients are dimensionless and ambiguous
        // in free text; only the unit token is lifted out.
        let quantity = self.quantities.parse(&entity.mention_text);
        SeismicForce {
            seismic_zone: None,
            acceleration_coefficient: None,
            base_shear: None,
            unit: quantity.and_then(|q| q.unit),
            description: non_empty(&entity.mention_text),
            confidence: entity.confidence,
            bounding_box: entity.bounding_box.clone(),
            page_number: entity.page_number,
        }
    }

    fn map_vehicle(
        &self,
        entity: &RawEntity,
        vehicle_type: crate::criteria::VehicleType,
    ) -> DesignVehicle {
        let quantity = self.quantities.parse(&entity.mention_text);
        DesignVehicle {
            vehicle_type,
            axle_loads: vec![],
            total_weight: quantity.as_ref().map(|q| q.value),
            unit: quantity.and_then(|q| q.unit),
            description: non_empty(&entity.mention_text),
            confidence: entity.confidence,
            bounding_box: entity.bounding_box.clone(),
            page_number: entity.page_number,
        }
    }

    fn map_crane(&self, entity: &RawEntity, crane_type: crate::criteria::CraneType) -> DesignCrane {
        let quantity = self.quantities.parse(&entity.mention_text);
        DesignCrane {
            crane_type,
            capacity: quantity.as_ref().map(|q| q.value),
            boom_length: None,
            unit: quantity.and_then(|q| q.unit),
            description: non_empty(&entity.mention_text),
            confidence: entity.confidence,
            bounding_box: entity.bounding_box.clone(),
            page_number: entity.page_number,
        }
    }

    fn map_tables(&self, result: &ServiceResult, regions: &[SavedRegion]) -> Vec<TableData> {
        let crops = regions.iter().filter(|r| r.kind == RegionKind::Table);

        result
            .tables
            .iter()
            .zip(crops)
            .enumerate()
            .map(|(i, (table, crop))| TableData {
                table_id: format!("table-{}", i),
                page_number: table.page_number,
                headers: table.headers.clone(),
                rows: table.rows.clone(),
                bounding_box: table.bounding_box.clone(),
                confidence: table.confidence,
                crop_file: crop.file_name.clone(),
            })
            .collect()
    }

    fn map_images(&self, result: &ServiceResult, regions: &[SavedRegion]) -> Vec<ImageData> {
        let crops = regions.iter().filter(|r| r.kind == RegionKind::Image);

        result
            .images
            .iter()
            .zip(crops)
            .enumerate()
            .map(|(i, (image, crop))| ImageData {
                image_id: format!("image-{}", i),
                page_number: image.page_number,
                bounding_box: image.bounding_box.clone(),
                caption: image.caption.clone(),
                confidence: image.confidence,
                crop_file: crop.file_name.clone(),
            })
            .collect()
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{CraneType, LoadType};
    use crate::service::{BoundingBox, DetectedImage, PageRaster, RawTable};
    use std::path::PathBuf;

    fn meta() -> SourceMeta {
        SourceMeta {
            source_filename: "berth-layout.pdf".to_string(),
            file_size: 4096,
            processor_id: "proc-1".to_string(),
            processed_at: "2026-03-01T09:30:00Z".parse().unwrap(),
            submission_attempts: 1,
        }
    }

    fn entity(label: &str, text: &str, confidence: f64) -> RawEntity {
        RawEntity {
            type_label: label.to_string(),
            mention_text: text.to_string(),
            normalized_value: None,
            confidence,
            page_number: 1,
            bounding_box: None,
        }
    }

    fn result_with_entities(entities: Vec<RawEntity>) -> ServiceResult {
        ServiceResult {
            text: "DESIGN CRITERIA".to_string(),
            entities,
            tables: vec![],
            images: vec![],
            pages: vec![PageRaster {
                page_number: 1,
                width: 100,
                height: 100,
                data: vec![],
            }],
            processor_version: Some("v1".to_string()),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_live_load_scenario() {
        let mapper = EntityMapper::new(0.5);
        let result = result_with_entities(vec![entity(
            "VERTICAL_LIVE_LOADS",
            "Live Load, 40 psf",
            0.9,
        )]);

        let criteria = mapper.map(&result, meta(), &[]);

        assert_eq!(criteria.loads.len(), 1);
        assert_eq!(criteria.loads[0].load_type, LoadType::LiveLoad);
        assert_eq!(criteria.loads[0].magnitude, Some(40.0));
        assert_eq!(criteria.loads[0].unit.as_deref(), Some("psf"));
        assert!(criteria.seismic_forces.is_empty());
        assert!(criteria.design_vehicles.is_empty());
        assert!(criteria.design_cranes.is_empty());
    }

    #[test]
    fn test_low_confidence_excluded_but_counted() {
        let mapper = EntityMapper::new(0.5);
        let result = result_with_entities(vec![
            entity("VERTICAL_LIVE_LOADS", "Live Load, 40 psf", 0.9),
            entity("WIND_LOADS", "Wind 1.2 kPa", 0.3),
        ]);

        let criteria = mapper.map(&result, meta(), &[]);

        assert_eq!(criteria.loads.len(), 1);
        assert_eq!(criteria.metadata.low_confidence_count, 1);
    }

    #[test]
    fn test_unmatched_entities_kept_for_audit() {
        let mapper = EntityMapper::new(0.5);
        let result = result_with_entities(vec![
            entity("DRG_No", "DWG-102-A", 0.95),
            entity("Title", "BERTH 7 GENERAL ARRANGEMENT", 0.92),
        ]);

        let criteria = mapper.map(&result, meta(), &[]);

        assert_eq!(criteria.entry_count(), 0);
        assert_eq!(criteria.metadata.unclassified.len(), 2);
        assert_eq!(criteria.metadata.unclassified[0].type_label, "DRG_No");
    }

    #[test]
    fn test_crane_capacity_parsed() {
        let mapper = EntityMapper::new(0.5);
        let result = result_with_entities(vec![entity(
            "DESIGN_CRANE",
            "DESIGN CRANE: 50 t mobile crane",
            0.8,
        )]);

        let criteria = mapper.map(&result, meta(), &[]);

        assert_eq!(criteria.design_cranes.len(), 1);
        assert_eq!(criteria.design_cranes[0].crane_type, CraneType::Other);
        assert_eq!(criteria.design_cranes[0].capacity, Some(50.0));
        assert_eq!(criteria.design_cranes[0].unit.as_deref(), Some("t"));
    }

    #[test]
    fn test_map_is_deterministic() {
        let mapper = EntityMapper::new(0.5);
        let result = result_with_entities(vec![
            entity("VERTICAL_DEAD_LOADS", "Dead Load 100 psf", 0.9),
            entity("SEISMIC_FORCES", "Zone 4 per UBC", 0.7),
        ]);

        let a = mapper.map(&result, meta(), &[]);
        let b = mapper.map(&result, meta(), &[]);

        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn test_tables_and_images_reference_crops() {
        let mapper = EntityMapper::new(0.5);
        let bbox = BoundingBox {
            x: 0.1,
            y: 0.1,
            width: 0.4,
            height: 0.3,
        };

        let mut result = result_with_entities(vec![]);
        result.tables = vec![RawTable {
            page_number: 1,
            bounding_box: bbox.clone(),
            headers: vec!["Load".to_string(), "Value".to_string()],
            rows: vec![vec!["Live".to_string(), "40 psf".to_string()]],
            confidence: 0.85,
        }];
        result.images = vec![DetectedImage {
            page_number: 1,
            bounding_box: bbox.clone(),
            caption: Some("Crane outreach diagram".to_string()),
            confidence: 0.75,
        }];

        let regions = vec![
            SavedRegion {
                index: 0,
                kind: RegionKind::Table,
                page_number: 1,
                bounding_box: bbox.clone(),
                file_name: "job_region_000.png".to_string(),
                path: PathBuf::from("/out/job/job_region_000.png"),
            },
            SavedRegion {
                index: 1,
                kind: RegionKind::Image,
                page_number: 1,
                bounding_box: bbox,
                file_name: "job_region_001.png".to_string(),
                path: PathBuf::from("/out/job/job_region_001.png"),
            },
        ];

        let criteria = mapper.map(&result, meta(), &regions);

        assert_eq!(criteria.tables.len(), 1);
        assert_eq!(criteria.tables[0].crop_file, "job_region_000.png");
        assert_eq!(criteria.tables[0].headers.len(), 2);
        assert_eq!(criteria.images.len(), 1);
        assert_eq!(criteria.images[0].crop_file, "job_region_001.png");
        assert_eq!(
            criteria.images[0].caption.as_deref(),
            Some("Crane outreach diagram")
        );
    }

    #[test]
    fn test_metadata_populated() {
        let mapper = EntityMapper::new(0.5);
        let result = result_with_entities(vec![]);

        let mut m = meta();
        m.submission_attempts = 3;
        let criteria = mapper.map(&result, m, &[]);

        assert_eq!(criteria.metadata.source_filename, "berth-layout.pdf");
        assert_eq!(criteria.metadata.page_count, 1);
        assert_eq!(criteria.metadata.submission_attempts, 3);
        assert_eq!(criteria.metadata.processor_version.as_deref(), Some("v1"));
        assert_eq!(criteria.raw_text.as_deref(), Some("DESIGN CRITERIA"));
    }
}
