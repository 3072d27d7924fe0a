pub mod client;
pub mod http;
pub mod retry;
pub mod types;

pub use client::{ProcessorClient, Submission, SubmissionClient};
pub use http::HttpProcessorClient;
pub use retry::RetryPolicy;
pub use types::{BoundingBox, DetectedImage, PageRaster, RawEntity, RawTable, ServiceResult};
