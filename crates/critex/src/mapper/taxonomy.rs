//! Declarative entity-label taxonomy.
//!
//! Classification is a table lookup, not branching logic: each rule maps
//! a label pattern to a typed category. Labels are normalized (uppercase,
//! separators collapsed to `_`), matched exact-first then by prefix, and
//! the first match in declaration order wins. Extending the taxonomy
//! means adding a row here; the mapper never changes.

use crate::criteria::{CraneType, LoadType, VehicleType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Category {
    Load(LoadType),
    SeismicForce,
    DesignVehicle(VehicleType),
    DesignCrane(CraneType),
}

pub struct TaxonomyRule {
    pub pattern: &'static str,
    pub category: Category,
}

/// Label patterns as emitted by the processor's schema, most specific
/// first. Bare `LOAD`/`LOADS` prefixes intentionally come last so the
/// specific kinds win.
pub const TAXONOMY: &[TaxonomyRule] = &[
    TaxonomyRule { pattern: "VERTICAL_DEAD_LOADS", category: Category::Load(LoadType::DeadLoad) },
    TaxonomyRule { pattern: "VERTICAL_LIVE_LOADS", category: Category::Load(LoadType::LiveLoad) },
    TaxonomyRule { pattern: "WIND_LOADS", category: Category::Load(LoadType::WindLoad) },
    TaxonomyRule { pattern: "SNOW_LOADS", category: Category::Load(LoadType::SnowLoad) },
    TaxonomyRule { pattern: "BERTHING_LOADS", category: Category::Load(LoadType::Other) },
    TaxonomyRule { pattern: "MOORING_LOADS", category: Category::Load(LoadType::Other) },
    TaxonomyRule { pattern: "HYDROSTATIC_LOADS", category: Category::Load(LoadType::HydrostaticLoad) },
    TaxonomyRule { pattern: "WAVE_LOADS", category: Category::Load(LoadType::WaveLoad) },
    TaxonomyRule { pattern: "IMPACT_LOADS", category: Category::Load(LoadType::ImpactLoad) },
    TaxonomyRule { pattern: "THERMAL_LOADS", category: Category::Load(LoadType::ThermalLoad) },
    TaxonomyRule { pattern: "SEISMIC_FORCES", category: Category::SeismicForce },
    TaxonomyRule { pattern: "SEISMIC_LOADS", category: Category::Load(LoadType::SeismicLoad) },
    TaxonomyRule { pattern: "DEAD_LOAD", category: Category::Load(LoadType::DeadLoad) },
    TaxonomyRule { pattern: "LIVE_LOAD", category: Category::Load(LoadType::LiveLoad) },
    TaxonomyRule { pattern: "WIND_LOAD", category: Category::Load(LoadType::WindLoad) },
    TaxonomyRule { pattern: "SNOW_LOAD", category: Category::Load(LoadType::SnowLoad) },
    TaxonomyRule { pattern: "SEISMIC", category: Category::SeismicForce },
    TaxonomyRule { pattern: "DESIGN_TRUCK", category: Category::DesignVehicle(VehicleType::Truck) },
    TaxonomyRule { pattern: "DESIGN_VEHICLE", category: Category::DesignVehicle(VehicleType::Other) },
    TaxonomyRule { pattern: "MOBILE_CRANE", category: Category::DesignCrane(CraneType::MobileCrane) },
    TaxonomyRule { pattern: "TOWER_CRANE", category: Category::DesignCrane(CraneType::TowerCrane) },
    TaxonomyRule { pattern: "GANTRY_CRANE", category: Category::DesignCrane(CraneType::GantryCrane) },
    TaxonomyRule { pattern: "DESIGN_CRANE", category: Category::DesignCrane(CraneType::Other) },
    TaxonomyRule { pattern: "DESIGN_LOADS", category: Category::Load(LoadType::Other) },
    TaxonomyRule { pattern: "LOADS", category: Category::Load(LoadType::Other) },
    TaxonomyRule { pattern: "LOAD", category: Category::Load(LoadType::Other) },
];

/// Uppercases and collapses spaces/hyphens to `_` so labels like
/// "Live Load" and "LIVE_LOAD" normalize identically.
fn normalize(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Classifies a processor label. Exact matches are preferred over
/// prefix matches; within each pass, declaration order decides.
pub fn classify(label: &str) -> Option<Category> {
    let needle = normalize(label);

    TAXONOMY
        .iter()
        .find(|rule| rule.pattern == needle)
        .or_else(|| TAXONOMY.iter().find(|rule| needle.starts_with(rule.pattern)))
        .map(|rule| rule.category)
}
