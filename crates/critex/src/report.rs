//! Human-readable summary reports for extraction results.

use std::fmt::Write;

use crate::criteria::DesignCriteria;

/// Renders a plain-text report of the extracted criteria.
///
/// Writing to a `String` cannot fail, so the `writeln!` results are
/// intentionally discarded.
pub fn summary_report(criteria: &DesignCriteria) -> String {
    let mut out = String::new();

    out.push_str("ENGINEERING DESIGN CRITERIA EXTRACTION REPORT\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    let meta = &criteria.metadata;
    out.push_str("DOCUMENT INFORMATION:\n");
    let _ = writeln!(out, "Filename: {}", meta.source_filename);
    let _ = writeln!(out, "File Size: {} bytes", meta.file_size);
    let _ = writeln!(out, "Pages: {}", meta.page_count);
    let _ = writeln!(out, "Processed: {}", meta.processed_at.to_rfc3339());
    let _ = writeln!(out, "Processor: {}", meta.processor_id);
    let _ = writeln!(out, "Submission Attempts: {}", meta.submission_attempts);
    let _ = writeln!(
        out,
        "Overall Confidence: {:.1}%",
        criteria.confidence_score * 100.0
    );
    out.push('\n');

    let _ = writeln!(out, "LOADS EXTRACTED: {}", criteria.loads.len());
    for (i, load) in criteria.loads.iter().enumerate() {
        let magnitude = load
            .magnitude
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        let unit = load.unit.as_deref().unwrap_or("");
        let _ = writeln!(
            out,
            "  {}. {:?}: {} {} ({:.1}%)",
            i + 1,
            load.load_type,
            magnitude,
            unit,
            load.confidence * 100.0
        );
        if let Some(ref description) = load.description {
            let _ = writeln!(out, "     {}", description);
        }
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "SEISMIC FORCES EXTRACTED: {}",
        criteria.seismic_forces.len()
    );
    for (i, seismic) in criteria.seismic_forces.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} ({:.1}%)",
            i + 1,
            seismic.description.as_deref().unwrap_or("-"),
            seismic.confidence * 100.0
        );
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "DESIGN VEHICLES EXTRACTED: {}",
        criteria.design_vehicles.len()
    );
    for (i, vehicle) in criteria.design_vehicles.iter().enumerate() {
        let weight = vehicle
            .total_weight
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {}. {:?}: {} {} ({:.1}%)",
            i + 1,
            vehicle.vehicle_type,
            weight,
            vehicle.unit.as_deref().unwrap_or(""),
            vehicle.confidence * 100.0
        );
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "DESIGN CRANES EXTRACTED: {}",
        criteria.design_cranes.len()
    );
    for (i, crane) in criteria.design_cranes.iter().enumerate() {
        let capacity = crane
            .capacity
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {}. {:?}: {} {} ({:.1}%)",
            i + 1,
            crane.crane_type,
            capacity,
            crane.unit.as_deref().unwrap_or(""),
            crane.confidence * 100.0
        );
    }
    out.push('\n');

    let _ = writeln!(out, "TABLES EXTRACTED: {}", criteria.tables.len());
    for (i, table) in criteria.tables.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. Page {}, {} rows -> {}",
            i + 1,
            table.page_number,
            table.rows.len(),
            table.crop_file
        );
    }
    out.push('\n');

    let _ = writeln!(out, "IMAGES EXTRACTED: {}", criteria.images.len());
    for (i, image) in criteria.images.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. Page {} -> {}",
            i + 1,
            image.page_number,
            image.crop_file
        );
    }

    if !meta.unclassified.is_empty() || meta.low_confidence_count > 0 {
        out.push('\n');
        let _ = writeln!(
            out,
            "UNCLASSIFIED ENTITIES: {} (low confidence: {})",
            meta.unclassified.len(),
            meta.low_confidence_count
        );
        for entity in &meta.unclassified {
            let _ = writeln!(out, "  - {}: {}", entity.type_label, entity.text);
        }
    }

    out
}

/// Renders the plain-text batch summary.
pub fn batch_report(summary: &crate::orchestrator::BatchSummary) -> String {
    let mut out = String::new();

    out.push_str("BATCH PROCESSING SUMMARY\n");
    out.push_str(&"=".repeat(30));
    out.push_str("\n\n");

    let _ = writeln!(out, "Total files processed: {}", summary.total_files);
    let _ = writeln!(out, "Successful: {}", summary.succeeded);
    let _ = writeln!(out, "Failed: {}", summary.failed);
    let _ = writeln!(out, "Total time: {:.2} seconds", summary.total_time_secs);
    out.push('\n');

    out.push_str("FILE RESULTS:\n");
    out.push_str(&"-".repeat(20));
    out.push('\n');
    for file in &summary.file_results {
        let marker = if file.succeeded { "ok" } else { "FAILED" };
        let _ = writeln!(out, "[{}] {} (job {})", marker, file.filename, file.job_id);
        if let Some(ref error) = file.error {
            let _ = writeln!(out, "       {}", error);
        }
    }

    out
}
