//! Artifact path resolution strategies
//!
//! A resolver answers one question: given a job and the relative name of one
//! of its outputs, where does that artifact live on the filesystem? The
//! [`Experiment`](crate::experiment::Experiment) holds a single resolver and
//! hands it unchanged to every [`JobView`](crate::experiment::JobView) it
//! creates, so swapping storage layouts is a one-line change at construction.
//!
//! Two strategies ship with the crate:
//!
//! - [`LocalCacheResolver`]: convention-based paths under a local cache root
//!   (`<cache>/<job-id>/out/<name>`), the layout the engine's local runner
//!   writes.
//! - [`ManifestResolver`]: an explicit job-id to base-path mapping, for
//!   store-backed layouts where every job's outputs land under an opaque
//!   per-job directory.
//!
//! Resolvers are pure: no filesystem access, no validation that the resolved
//! path exists.

mod local_cache;
mod manifest;

pub use local_cache::{LocalCacheResolver, DEFAULT_CACHE_DIR};
pub use manifest::ManifestResolver;

use crate::metadata::JobMetadata;
use crate::Result;
use std::fmt;
use std::path::PathBuf;

/// Strategy for mapping a job's named output to a filesystem location.
pub trait ArtifactResolver: fmt::Debug + Send + Sync {
    /// Resolve the absolute or base-relative location of `output` for `job`.
    ///
    /// # Errors
    ///
    /// Implementations fail only when their configuration has no answer for
    /// the job (see [`ManifestResolver`]); deterministic path formulas never
    /// fail.
    fn resolve_path(&self, job: &JobMetadata, output: &str) -> Result<PathBuf>;
}
