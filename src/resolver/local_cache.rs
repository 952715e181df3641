//! Convention-based resolver over a local cache directory.

use super::ArtifactResolver;
use crate::metadata::JobMetadata;
use crate::Result;
use std::path::{Path, PathBuf};

/// Cache directory used when none is configured.
pub const DEFAULT_CACHE_DIR: &str = ".repx-cache";

/// Subdirectory the engine writes job outputs into.
const OUT_DIR: &str = "out";

/// Resolver for the engine's local cache layout.
///
/// Outputs live at `<cache_dir>/<job-id>/out/<name>`. The cache directory is
/// made absolute at construction so resolved paths stay stable if the
/// process later changes its working directory.
///
/// # Example
///
/// ```
/// use repx_meta::metadata::JobMetadata;
/// use repx_meta::resolver::{ArtifactResolver, LocalCacheResolver};
/// use std::path::PathBuf;
///
/// let resolver = LocalCacheResolver::new("/tmp/x");
/// let job = JobMetadata::builder("j1").build();
/// let path = resolver.resolve_path(&job, "out.csv").unwrap();
/// assert_eq!(path, PathBuf::from("/tmp/x/j1/out/out.csv"));
/// ```
#[derive(Debug, Clone)]
pub struct LocalCacheResolver {
    cache_dir: PathBuf,
}

impl LocalCacheResolver {
    /// Create a resolver rooted at `cache_dir`, made absolute against the
    /// current working directory when given relative.
    #[must_use]
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        let cache_dir = cache_dir.as_ref();
        let cache_dir = std::path::absolute(cache_dir).unwrap_or_else(|_| cache_dir.to_path_buf());
        Self { cache_dir }
    }

    /// The absolute cache root this resolver is configured with.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl Default for LocalCacheResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}

impl ArtifactResolver for LocalCacheResolver {
    fn resolve_path(&self, job: &JobMetadata, output: &str) -> Result<PathBuf> {
        Ok(self.cache_dir.join(job.id()).join(OUT_DIR).join(output))
    }
}
