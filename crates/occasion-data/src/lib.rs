//! Occasion Data -- loading simulation runs from RON, JSON or TOML files.
//!
//! A run directory carries the tidied place and transition tables of one
//! simulation, plus an optional analysis configuration. [`load_run`]
//! validates them into `occasion-core` tables and works out the sampling
//! interval used for reconstruction.
//!
//! ```rust,ignore
//! let run = occasion_data::load_run(Path::new("runs/ring"))?;
//! let reconstruction = run.reconstruct()?;
//! ```

pub mod loader;
pub mod run;
pub mod schema;

pub use loader::DataLoadError;
pub use run::{RunData, load_run};
pub use schema::AnalysisConfig;
