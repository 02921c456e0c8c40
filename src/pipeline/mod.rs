// Sequential multi-stage analysis pipeline

pub mod catalog;
pub mod orchestrator;
pub mod runner;

pub use catalog::{default_catalog, stage_keys, CatalogError, StageCatalog, StageDefinition};
pub use orchestrator::PipelineOrchestrator;
pub use runner::{error_sentinel, StageOutcome, StageRunner};
