pub mod database_lookup;
pub mod report_generation;
pub mod structure_render;
pub mod validate_request;

pub mod types;
pub mod utils;

pub use database_lookup::DatabaseLookupTask;
pub use report_generation::{ReportGenerationTask, generate_interaction_report};
pub use structure_render::{StructureRenderTask, StructureSkippedTask};
pub use validate_request::{ValidateRequestTask, validate_request};

pub use types::session_keys;
