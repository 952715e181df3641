//! Experiment - owner of loaded run metadata
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment (1) ──< RunMetadata (N)
//!                         │
//!                         └──< JobMetadata (N)
//!                                   │
//!                                   └──< OutputSpec (N) [named artifacts]
//! ```
//!
//! The experiment indexes every job across its runs, materializes
//! [`JobView`]s lazily through an identity-preserving cache, and hands out
//! [`JobCollection`]s for chainable filtering.
//!
//! ## Usage
//!
//! ```
//! use repx_meta::experiment::Experiment;
//! use repx_meta::metadata::{JobMetadata, RunMetadata};
//! use repx_meta::query::Predicate;
//!
//! let run = RunMetadata::new("sweep-a", [
//!     JobMetadata::builder("j1").name("train").param("seed", 7).build(),
//!     JobMetadata::builder("j2").name("eval").param("seed", 7).build(),
//! ]);
//! let exp = Experiment::builder().run(run).build()?;
//!
//! assert_eq!(exp.jobs().len(), 2);
//! let train = exp.jobs().filter([Predicate::parse("name", "train")]);
//! assert_eq!(train.len(), 1);
//! # Ok::<(), repx_meta::Error>(())
//! ```

mod collection;
mod view;

pub use collection::{Iter, JobCollection};
pub use view::JobView;

use crate::metadata::{JobMetadata, RunDocument, RunMetadata};
use crate::resolver::{ArtifactResolver, LocalCacheResolver};
use crate::{Error, Result};
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Owner of a loaded metadata graph (runs and their jobs).
///
/// Construction happens once, from one or more run metadata documents or
/// from pre-supplied [`RunMetadata`]; the graph is read-only afterwards.
/// Views are created lazily on first access and cached for the experiment's
/// lifetime, so repeated [`get_job`](Experiment::get_job) calls for one id
/// return the identical allocation.
#[derive(Debug)]
pub struct Experiment {
    runs: BTreeMap<String, RunMetadata>,
    job_index: FxHashMap<String, String>,
    job_order: Vec<String>,
    views: DashMap<String, Arc<JobView>>,
    resolver: Arc<dyn ArtifactResolver>,
}

impl Experiment {
    /// Create a builder for assembling an experiment from documents,
    /// preloaded runs, or both.
    #[must_use]
    pub fn builder() -> ExperimentBuilder {
        ExperimentBuilder::default()
    }

    /// Load an experiment from a single run metadata document, resolving
    /// artifacts out of the local cache layout under `artifact_root`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MetadataNotFound`] if `path` does not exist, with
    /// [`Error::Json`] if the document is unparseable, and with
    /// [`Error::InvalidFormat`] if its declared type is not `"run"`.
    pub fn from_run_metadata(
        path: impl AsRef<Path>,
        artifact_root: impl AsRef<Path>,
    ) -> Result<Self> {
        Self::builder()
            .run_document(path)
            .artifact_root(artifact_root)
            .build()
    }

    /// Loaded runs, keyed by run name. Empty if nothing was loaded; never
    /// lazy-fails.
    #[must_use]
    pub fn runs(&self) -> &BTreeMap<String, RunMetadata> {
        &self.runs
    }

    /// A collection spanning every known job id, in discovery order.
    #[must_use]
    pub fn jobs(&self) -> JobCollection<'_> {
        JobCollection::new(self, self.job_order.clone())
    }

    /// Total number of jobs across all runs.
    #[must_use]
    pub fn job_count(&self) -> usize {
        self.job_order.len()
    }

    /// The cached view for a job id, constructed on first call.
    ///
    /// Repeated calls with the same id return the same allocation; callers
    /// may rely on `Arc::ptr_eq` for memoization.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::JobNotFound`] if the id is not in the loaded
    /// metadata.
    pub fn get_job(&self, id: &str) -> Result<Arc<JobView>> {
        if let Some(view) = self.views.get(id) {
            return Ok(Arc::clone(view.value()));
        }
        let job = self
            .job_metadata(id)
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?
            .clone();
        let view = Arc::new(JobView::new(job, Arc::clone(&self.resolver)));
        // entry() keeps the first write if another caller raced us here, so
        // identity holds either way.
        let entry = self.views.entry(id.to_string()).or_insert(view);
        Ok(Arc::clone(entry.value()))
    }

    /// The run record containing the given job id.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::RunNotFound`] if no loaded run contains the id.
    pub fn get_run_for_job(&self, id: &str) -> Result<&RunMetadata> {
        self.job_index
            .get(id)
            .and_then(|run_name| self.runs.get(run_name))
            .ok_or_else(|| Error::RunNotFound(id.to_string()))
    }

    /// Merged mapping of parameters applicable experiment-wide: a key is
    /// included when every job that defines it agrees on a single value.
    /// Per-job sweeps are the domain of
    /// [`varying_params`](crate::export::varying_params).
    #[must_use]
    pub fn effective_params(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        let mut conflicted: Vec<String> = Vec::new();
        for id in &self.job_order {
            let Some(job) = self.job_metadata(id) else {
                continue;
            };
            for (key, value) in job.params() {
                if conflicted.iter().any(|k| k == key) {
                    continue;
                }
                match merged.get(key) {
                    None => {
                        merged.insert(key.clone(), value.clone());
                    }
                    Some(existing) if existing == value => {}
                    Some(_) => {
                        merged.remove(key);
                        conflicted.push(key.clone());
                    }
                }
            }
        }
        merged
    }

    /// The resolver every view of this experiment delegates to.
    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn ArtifactResolver> {
        &self.resolver
    }

    fn job_metadata(&self, id: &str) -> Option<&JobMetadata> {
        let run_name = self.job_index.get(id)?;
        self.runs.get(run_name)?.jobs().get(id)
    }
}

/// Builder for [`Experiment`].
///
/// At least one run metadata document or one preloaded [`RunMetadata`] must
/// be supplied; [`build`](ExperimentBuilder::build) rejects an empty
/// configuration.
#[derive(Debug, Default)]
pub struct ExperimentBuilder {
    documents: Vec<PathBuf>,
    artifact_root: Option<PathBuf>,
    preloaded: Vec<RunMetadata>,
    resolver: Option<Arc<dyn ArtifactResolver>>,
}

impl ExperimentBuilder {
    /// Queue a run metadata document to load. May be called more than once;
    /// the engine emits one document per run.
    #[must_use]
    pub fn run_document(mut self, path: impl AsRef<Path>) -> Self {
        self.documents.push(path.as_ref().to_path_buf());
        self
    }

    /// Root directory for the default local cache resolver. Ignored when an
    /// explicit resolver is supplied.
    #[must_use]
    pub fn artifact_root(mut self, root: impl AsRef<Path>) -> Self {
        self.artifact_root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Add a pre-supplied run record.
    #[must_use]
    pub fn run(mut self, run: RunMetadata) -> Self {
        self.preloaded.push(run);
        self
    }

    /// Inject the artifact resolver wired into every view.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn ArtifactResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the [`Experiment`]: load queued documents, index jobs, and wire
    /// the resolver.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidConfiguration`] when neither a document
    /// nor preloaded metadata was supplied, with the loading errors of
    /// [`Experiment::from_run_metadata`] for each queued document, and with
    /// [`Error::DuplicateJobId`] when two runs claim the same job id.
    pub fn build(self) -> Result<Experiment> {
        if self.documents.is_empty() && self.preloaded.is_empty() {
            return Err(Error::InvalidConfiguration(
                "either a run metadata document or preloaded run metadata is required".to_string(),
            ));
        }

        let resolver = self.resolver.unwrap_or_else(|| {
            let root = self
                .artifact_root
                .unwrap_or_else(|| PathBuf::from(crate::resolver::DEFAULT_CACHE_DIR));
            Arc::new(LocalCacheResolver::new(root))
        });

        let mut loaded = Vec::with_capacity(self.documents.len() + self.preloaded.len());
        for path in &self.documents {
            loaded.push(load_run_document(path)?);
        }
        loaded.extend(self.preloaded);

        let mut runs = BTreeMap::new();
        let mut job_index = FxHashMap::default();
        let mut job_order = Vec::new();
        for run in loaded {
            for id in run.jobs().keys() {
                if let Some(first_run) = job_index.insert(id.clone(), run.name().to_string()) {
                    return Err(Error::DuplicateJobId {
                        job_id: id.clone(),
                        first_run,
                        second_run: run.name().to_string(),
                    });
                }
                job_order.push(id.clone());
            }
            tracing::debug!("Indexed run '{}' with {} jobs", run.name(), run.jobs().len());
            runs.insert(run.name().to_string(), run);
        }

        tracing::debug!(
            "Experiment ready. Total runs: {}, total jobs: {}",
            runs.len(),
            job_order.len()
        );

        Ok(Experiment {
            runs,
            job_index,
            job_order,
            views: DashMap::new(),
            resolver,
        })
    }
}

/// Read and validate one run metadata document.
fn load_run_document(path: &Path) -> Result<RunMetadata> {
    if !path.is_file() {
        return Err(Error::MetadataNotFound(path.to_path_buf()));
    }
    tracing::debug!("Loading run metadata from '{}'", path.display());
    let content = fs::read_to_string(path)?;
    let document: RunDocument = serde_json::from_str(&content)?;
    document.into_run()
}
