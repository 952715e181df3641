//! Run and job metadata records
//!
//! These types mirror the documents emitted by the repx execution engine.
//! They are loaded verbatim once and never mutated afterwards; everything
//! downstream (views, collections, exports) reads through shared references.
//!
//! ## Document shape
//!
//! ```json
//! {
//!   "type": "run",
//!   "name": "sweep-a",
//!   "jobs": {
//!     "abc123-train": {
//!       "name": "train",
//!       "stage_type": "simple",
//!       "params": { "seed": 7 },
//!       "outputs": { "model": "$out/model.bin" }
//!     }
//!   }
//! }
//! ```
//!
//! Job ids are the keys of the `jobs` mapping; they are injected into each
//! [`JobMetadata`] after parse together with the owning run's name, so a job
//! record is self-describing once loaded.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{Error, Result};

/// Type marker every run document must declare.
pub const RUN_DOCUMENT_TYPE: &str = "run";

/// Stage classification the engine assigns when a job declares none.
const DEFAULT_STAGE_TYPE: &str = "simple";

/// Prefix the execution engine records on output paths relative to a job's
/// output directory.
const ENGINE_OUT_PREFIX: &str = "$out/";

fn default_stage_type() -> String {
    DEFAULT_STAGE_TYPE.to_string()
}

/// A named artifact declared by a job.
///
/// The engine writes outputs either as a bare relative path or as a
/// descriptor object carrying the path alongside engine-internal fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OutputSpec {
    /// Bare relative path, e.g. `"$out/data.csv"`.
    Relative(String),
    /// Descriptor object, e.g. `{ "path": "$out/data.csv" }`.
    Descriptor {
        /// Path relative to the job's output directory.
        path: String,
    },
}

impl OutputSpec {
    /// The artifact's path relative to the job's output directory.
    ///
    /// The engine prefixes paths with `$out/`; resolvers receive the name
    /// with that prefix stripped.
    #[must_use]
    pub fn relative_path(&self) -> &str {
        let raw = match self {
            Self::Relative(path) | Self::Descriptor { path } => path,
        };
        raw.strip_prefix(ENGINE_OUT_PREFIX).unwrap_or(raw)
    }
}

impl From<&str> for OutputSpec {
    fn from(path: &str) -> Self {
        Self::Relative(path.to_string())
    }
}

impl From<String> for OutputSpec {
    fn from(path: String) -> Self {
        Self::Relative(path)
    }
}

/// Metadata record for a single job.
///
/// Parameters are opaque key-value data; the crate never interprets their
/// schema.
#[derive(Debug, Clone, Deserialize)]
pub struct JobMetadata {
    #[serde(skip)]
    id: String,
    name: Option<String>,
    #[serde(default = "default_stage_type")]
    stage_type: String,
    #[serde(default)]
    params: Map<String, Value>,
    #[serde(default)]
    outputs: BTreeMap<String, OutputSpec>,
    #[serde(skip)]
    run: String,
}

impl JobMetadata {
    /// Create a builder for assembling a job record outside of document
    /// loading (fixtures, pre-supplied metadata).
    #[must_use]
    pub fn builder(id: impl Into<String>) -> JobMetadataBuilder {
        JobMetadataBuilder::new(id)
    }

    /// Unique job id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable job name; falls back to the id when the engine
    /// recorded none.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Free-form stage classification (e.g. "simple", "producer", "worker").
    #[must_use]
    pub fn stage_type(&self) -> &str {
        &self.stage_type
    }

    /// Opaque job parameters.
    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Look up a single parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Named output artifacts.
    #[must_use]
    pub fn outputs(&self) -> &BTreeMap<String, OutputSpec> {
        &self.outputs
    }

    /// Name of the run that owns this job.
    #[must_use]
    pub fn run(&self) -> &str {
        &self.run
    }

    /// Stamp the identity fields skipped during deserialization.
    pub(crate) fn with_identity(mut self, id: impl Into<String>, run: impl Into<String>) -> Self {
        self.id = id.into();
        self.run = run.into();
        self
    }
}

/// Builder for [`JobMetadata`].
#[derive(Debug)]
pub struct JobMetadataBuilder {
    id: String,
    name: Option<String>,
    stage_type: String,
    params: Map<String, Value>,
    outputs: BTreeMap<String, OutputSpec>,
}

impl JobMetadataBuilder {
    /// Create a new builder for the given job id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            stage_type: default_stage_type(),
            params: Map::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Set the human-readable name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the stage classification.
    #[must_use]
    pub fn stage_type(mut self, stage_type: impl Into<String>) -> Self {
        self.stage_type = stage_type.into();
        self
    }

    /// Add one parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add one named output.
    #[must_use]
    pub fn output(mut self, key: impl Into<String>, spec: impl Into<OutputSpec>) -> Self {
        self.outputs.insert(key.into(), spec.into());
        self
    }

    /// Build the [`JobMetadata`]. The run back-reference is stamped when the
    /// record is handed to a run.
    #[must_use]
    pub fn build(self) -> JobMetadata {
        JobMetadata {
            id: self.id,
            name: self.name,
            stage_type: self.stage_type,
            params: self.params,
            outputs: self.outputs,
            run: String::new(),
        }
    }
}

/// Metadata record for a single run.
#[derive(Debug, Clone)]
pub struct RunMetadata {
    name: String,
    jobs: BTreeMap<String, JobMetadata>,
    dependencies: BTreeMap<String, String>,
}

impl RunMetadata {
    /// Assemble a run from pre-built job records, stamping each job's run
    /// back-reference.
    #[must_use]
    pub fn new(name: impl Into<String>, jobs: impl IntoIterator<Item = JobMetadata>) -> Self {
        let name = name.into();
        let jobs = jobs
            .into_iter()
            .map(|job| {
                let id = job.id.clone();
                let job = job.with_identity(id.clone(), name.clone());
                (id, job)
            })
            .collect();
        Self {
            name,
            jobs,
            dependencies: BTreeMap::new(),
        }
    }

    /// Run name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Jobs belonging to this run, keyed by job id.
    #[must_use]
    pub fn jobs(&self) -> &BTreeMap<String, JobMetadata> {
        &self.jobs
    }

    /// Upstream run dependencies recorded by the engine (run name to pin).
    #[must_use]
    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.dependencies
    }

    /// Whether this run contains the given job id.
    #[must_use]
    pub fn contains_job(&self, job_id: &str) -> bool {
        self.jobs.contains_key(job_id)
    }
}

/// Wire shape of a run metadata document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RunDocument {
    #[serde(rename = "type")]
    doc_type: String,
    name: String,
    #[serde(default)]
    jobs: BTreeMap<String, JobMetadata>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

impl RunDocument {
    /// Validate the type marker and convert into a [`RunMetadata`] with job
    /// identities stamped.
    pub(crate) fn into_run(self) -> Result<RunMetadata> {
        if self.doc_type != RUN_DOCUMENT_TYPE {
            return Err(Error::InvalidFormat {
                expected: RUN_DOCUMENT_TYPE.to_string(),
                actual: self.doc_type,
            });
        }
        let jobs = self
            .jobs
            .into_iter()
            .map(|(id, job)| {
                let job = job.with_identity(id.clone(), self.name.clone());
                (id, job)
            })
            .collect();
        Ok(RunMetadata {
            name: self.name,
            jobs,
            dependencies: self.dependencies,
        })
    }
}
