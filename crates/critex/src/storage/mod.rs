pub mod filesystem;

pub use filesystem::{ResultWriter, REPORT_FILE, RESULT_FILE, TEXT_FILE};
