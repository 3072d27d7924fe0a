//! Data-driven taxonomy classification tests. Adding a case is one row
//! in the `CASES` table.

use critex::criteria::{CraneType, LoadType, VehicleType};
use critex::mapper::taxonomy::{classify, Category};

struct Case {
    label: &'static str,
    expected: Option<Category>,
}

const CASES: &[Case] = &[
    // Exact processor field names
    Case { label: "VERTICAL_DEAD_LOADS", expected: Some(Category::Load(LoadType::DeadLoad)) },
    Case { label: "VERTICAL_LIVE_LOADS", expected: Some(Category::Load(LoadType::LiveLoad)) },
    Case { label: "WIND_LOADS", expected: Some(Category::Load(LoadType::WindLoad)) },
    Case { label: "BERTHING_LOADS", expected: Some(Category::Load(LoadType::Other)) },
    Case { label: "MOORING_LOADS", expected: Some(Category::Load(LoadType::Other)) },
    Case { label: "SEISMIC_FORCES", expected: Some(Category::SeismicForce) },
    Case { label: "DESIGN_VEHICLE", expected: Some(Category::DesignVehicle(VehicleType::Other)) },
    Case { label: "DESIGN_CRANE", expected: Some(Category::DesignCrane(CraneType::Other)) },
    // Case-insensitive and separator-tolerant
    Case { label: "wind_loads", expected: Some(Category::Load(LoadType::WindLoad)) },
    Case { label: "Live Load", expected: Some(Category::Load(LoadType::LiveLoad)) },
    Case { label: "design-crane", expected: Some(Category::DesignCrane(CraneType::Other)) },
    // Prefix matches
    Case { label: "WIND_LOADS_SERVICE", expected: Some(Category::Load(LoadType::WindLoad)) },
    Case { label: "SEISMIC_ZONE", expected: Some(Category::SeismicForce) },
    Case { label: "TOWER_CRANE_25T", expected: Some(Category::DesignCrane(CraneType::TowerCrane)) },
    // Exact rule beats earlier prefix rule
    Case { label: "SEISMIC_LOADS", expected: Some(Category::Load(LoadType::SeismicLoad)) },
    // Unclassified document fields
    Case { label: "DRG_No", expected: None },
    Case { label: "Title", expected: None },
    Case { label: "Date", expected: None },
    Case { label: "", expected: None },
];

#[test]
fn classification_table() {
    for case in CASES {
        assert_eq!(
            classify(case.label),
            case.expected,
            "label {:?} misclassified",
            case.label
        );
    }
}

#[test]
fn classification_is_stable_across_calls() {
    for case in CASES {
        assert_eq!(classify(case.label), classify(case.label));
    }
}
