//! Error types for repx-meta
//!
//! Every failure surfaces synchronously at the point of violation and
//! propagates to the caller; the library never retries, swallows, or logs
//! an error away.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// repx-meta error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment constructed with neither a metadata document nor preloaded runs
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Run metadata document missing on disk
    #[error("Metadata file not found at '{0}'")]
    MetadataNotFound(PathBuf),

    /// Document declared a type other than the expected "run" marker
    #[error("Expected metadata type '{expected}', found '{actual}'")]
    InvalidFormat {
        /// The type marker a run document must declare
        expected: String,
        /// The type marker the document actually declared
        actual: String,
    },

    /// Job id not present in the loaded metadata
    #[error("Job '{0}' not found in the experiment metadata")]
    JobNotFound(String),

    /// No loaded run contains the job id
    #[error("Could not find a run containing job '{0}'")]
    RunNotFound(String),

    /// Output key absent from a job's outputs mapping
    #[error("Output key '{key}' not found for job '{job_id}'")]
    OutputKeyNotFound {
        /// Job whose outputs were consulted
        job_id: String,
        /// The missing output key
        key: String,
    },

    /// Manifest resolver has no base path for the job
    #[error("No output path recorded for job '{0}'")]
    ManifestEntryMissing(String),

    /// Dynamic field access on a view for an undefined name
    #[error("Job '{job_id}' has no attribute '{attribute}'")]
    AttributeNotFound {
        /// Job whose view was queried
        job_id: String,
        /// The undefined attribute name
        attribute: String,
    },

    /// Same job id appeared in two loaded runs
    #[error("Job id '{job_id}' appears in both run '{first_run}' and run '{second_run}'")]
    DuplicateJobId {
        /// The colliding job id
        job_id: String,
        /// Run that introduced the id first
        first_run: String,
        /// Run that re-introduced it
        second_run: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata document parse error
    #[error("Failed to parse metadata document: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error during tabular export
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
