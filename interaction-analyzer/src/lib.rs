pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod ncbi;
pub mod pages;
pub mod service;
pub mod tasks;
pub mod viewer;
pub mod workflow;

pub use config::AppConfig;
pub use error::AnalyzerError;
pub use models::*;
pub use service::{AppState, build_router, create_app};
pub use workflow::InteractionWorkflow;
