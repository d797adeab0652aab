#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod document;
pub mod error;
pub mod models;
pub mod paths;
pub mod pipeline;
pub mod resources;
pub mod synthesize;

pub use config::BundleConfig;
pub use error::BundleError;
pub use models::{BundleRecord, EntryPointRegistry, ResourceKind, SourceKind};
pub use pipeline::run;
