//! Typed engineering design criteria extracted from a document.
//!
//! These records are produced once per successful job by the entity
//! mapper and are never mutated afterwards, only serialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::service::BoundingBox;

/// Kinds of engineering loads recognised by the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadType {
    DeadLoad,
    LiveLoad,
    WindLoad,
    SnowLoad,
    SeismicLoad,
    HydrostaticLoad,
    WaveLoad,
    ImpactLoad,
    ThermalLoad,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    PassengerCar,
    Truck,
    Bus,
    Trailer,
    EmergencyVehicle,
    ConstructionVehicle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraneType {
    MobileCrane,
    TowerCrane,
    GantryCrane,
    BridgeCrane,
    JibCrane,
    FloatingCrane,
    Other,
}

/// A load entry. Fields absent from the source document stay `None` —
/// values are never fabricated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSpecification {
    pub load_type: LoadType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
    /// Unit string preserved verbatim ("psf", "kN/m²", ...). No unit
    /// conversion is performed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicForce {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seismic_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration_coefficient: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_shear: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignVehicle {
    pub vehicle_type: VehicleType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub axle_loads: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignCrane {
    pub crane_type: CraneType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boom_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    pub page_number: u32,
}

/// A table detected in the document together with its saved crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub table_id: String,
    pub page_number: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Vec<String>>,
    pub bounding_box: BoundingBox,
    pub confidence: f64,
    /// Path of the saved crop, relative to the job output directory.
    pub crop_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub image_id: String,
    pub page_number: u32,
    pub bounding_box: BoundingBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub confidence: f64,
    /// Path of the saved crop, relative to the job output directory.
    pub crop_file: String,
}

/// Entity the taxonomy did not place in any typed list. Kept for
/// auditability rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnclassifiedEntity {
    pub type_label: String,
    pub text: String,
    pub confidence: f64,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source_filename: String,
    pub file_size: u64,
    pub page_count: u32,
    pub processed_at: DateTime<Utc>,
    pub processor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_version: Option<String>,
    /// Number of attempts the submission client made against the
    /// service, including the successful one.
    pub submission_attempts: u32,
    /// Entities whose label matched no taxonomy pattern.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unclassified: Vec<UnclassifiedEntity>,
    /// Entities excluded from typed lists because their confidence fell
    /// below the configured threshold.
    pub low_confidence_count: usize,
}

/// Complete structured output of one extraction job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignCriteria {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loads: Vec<LoadSpecification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seismic_forces: Vec<SeismicForce>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub design_vehicles: Vec<DesignVehicle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub design_cranes: Vec<DesignCrane>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<TableData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageData>,
    pub metadata: DocumentMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    pub confidence_score: f64,
}

impl DesignCriteria {
    /// Total number of typed entries across all categories.
    pub fn entry_count(&self) -> usize {
        self.loads.len()
            + self.seismic_forces.len()
            + self.design_vehicles.len()
            + self.design_cranes.len()
            + self.tables.len()
            + self.images.len()
    }

    /// Crop files referenced by tables and images, in declaration order.
    pub fn referenced_crops(&self) -> Vec<&str> {
        self.tables
            .iter()
            .map(|t| t.crop_file.as_str())
            .chain(self.images.iter().map(|i| i.crop_file.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            source_filename: "plan.pdf".to_string(),
            file_size: 1024,
            page_count: 2,
            processed_at: "2026-03-01T12:00:00Z".parse().unwrap(),
            processor_id: "proc-1".to_string(),
            processor_version: Some("pretrained-v1".to_string()),
            submission_attempts: 1,
            unclassified: vec![],
            low_confidence_count: 0,
        }
    }

    #[test]
    fn test_entry_count() {
        let criteria = DesignCriteria {
            loads: vec![LoadSpecification {
                load_type: LoadType::LiveLoad,
                magnitude: Some(40.0),
                unit: Some("psf".to_string()),
                direction: None,
                location: None,
                description: None,
                confidence: 0.9,
                bounding_box: None,
                page_number: 1,
            }],
            seismic_forces: vec![],
            design_vehicles: vec![],
            design_cranes: vec![],
            tables: vec![],
            images: vec![],
            metadata: metadata(),
            raw_text: None,
            confidence_score: 0.9,
        };

        assert_eq!(criteria.entry_count(), 1);
    }

    #[test]
    fn test_referenced_crops_order() {
        let bbox = BoundingBox {
            x: 0.1,
            y: 0.1,
            width: 0.5,
            height: 0.2,
        };
        let criteria = DesignCriteria {
            loads: vec![],
            seismic_forces: vec![],
            design_vehicles: vec![],
            design_cranes: vec![],
            tables: vec![TableData {
                table_id: "table-0".to_string(),
                page_number: 1,
                headers: vec![],
                rows: vec![],
                bounding_box: bbox.clone(),
                confidence: 0.8,
                crop_file: "job_region_000.png".to_string(),
            }],
            images: vec![ImageData {
                image_id: "image-0".to_string(),
                page_number: 2,
                bounding_box: bbox,
                caption: None,
                confidence: 0.7,
                crop_file: "job_region_001.png".to_string(),
            }],
            metadata: metadata(),
            raw_text: None,
            confidence_score: 0.75,
        };

        assert_eq!(
            criteria.referenced_crops(),
            vec!["job_region_000.png", "job_region_001.png"]
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let criteria = DesignCriteria {
            loads: vec![LoadSpecification {
                load_type: LoadType::WindLoad,
                magnitude: Some(1.2),
                unit: Some("kPa".to_string()),
                direction: Some("horizontal".to_string()),
                location: None,
                description: Some("WIND LOADS: 1.2 kPa".to_string()),
                confidence: 0.85,
                bounding_box: None,
                page_number: 1,
            }],
            seismic_forces: vec![],
            design_vehicles: vec![],
            design_cranes: vec![],
            tables: vec![],
            images: vec![],
            metadata: metadata(),
            raw_text: Some("WIND LOADS: 1.2 kPa".to_string()),
            confidence_score: 0.85,
        };

        let json = serde_json::to_string(&criteria).unwrap();
        let parsed: DesignCriteria = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, criteria);
    }

    #[test]
    fn test_load_type_snake_case() {
        let json = serde_json::to_string(&LoadType::LiveLoad).unwrap();
        assert_eq!(json, "\"live_load\"");
    }
}
