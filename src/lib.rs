pub mod chem;
pub mod chemical_info;
pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod proposal;
pub mod structure;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use structure::{StructurePipeline, StructureReport, StructureRequest, StructureResult};
pub use workflow::launch;
