//! Manifest-backed resolver with an explicit job-id to base-path mapping.

use super::ArtifactResolver;
use crate::metadata::JobMetadata;
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// Resolver backed by an explicit mapping from job id to output base path.
///
/// Store-backed layouts (content-addressed stores, archived results) place
/// each job's outputs under an opaque directory that cannot be derived from
/// the job id alone. A manifest records those directories, and this resolver
/// joins the output name onto the recorded base.
///
/// Base paths are normalized to [`PathBuf`] at construction. Resolution for
/// a job absent from the mapping fails regardless of the output name.
///
/// # Example
///
/// ```
/// use repx_meta::metadata::JobMetadata;
/// use repx_meta::resolver::{ArtifactResolver, ManifestResolver};
/// use std::path::PathBuf;
///
/// let resolver = ManifestResolver::new([("j1", "/nix/store/abc-result")]);
/// let job = JobMetadata::builder("j1").build();
/// let path = resolver.resolve_path(&job, "data.csv").unwrap();
/// assert_eq!(path, PathBuf::from("/nix/store/abc-result/data.csv"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManifestResolver {
    mapping: FxHashMap<String, PathBuf>,
}

impl ManifestResolver {
    /// Create a resolver from `(job_id, base_path)` pairs.
    #[must_use]
    pub fn new<I, K, P>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<PathBuf>,
    {
        let mapping = mapping
            .into_iter()
            .map(|(id, base)| (id.into(), base.into()))
            .collect();
        Self { mapping }
    }

    /// Number of jobs the manifest records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Whether the manifest records no jobs at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// The recorded base path for a job id, if any.
    #[must_use]
    pub fn base_path(&self, job_id: &str) -> Option<&PathBuf> {
        self.mapping.get(job_id)
    }
}

impl ArtifactResolver for ManifestResolver {
    fn resolve_path(&self, job: &JobMetadata, output: &str) -> Result<PathBuf> {
        let base = self
            .mapping
            .get(job.id())
            .ok_or_else(|| Error::ManifestEntryMissing(job.id().to_string()))?;
        Ok(base.join(output))
    }
}
