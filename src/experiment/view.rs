//! Job View - lazy read-only facade over one job's metadata

use crate::metadata::{JobMetadata, OutputSpec};
use crate::resolver::ArtifactResolver;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Read-only facade over one job's metadata record plus the experiment's
/// artifact resolver.
///
/// Views are created lazily by [`Experiment::get_job`] and cached for the
/// experiment's lifetime: asking twice for the same job id returns the same
/// allocation (`Arc::ptr_eq`), which downstream consumers rely on for
/// memoization and edge deduplication.
///
/// Field access comes in two flavors: typed accessors for the fixed fields,
/// and [`get`](JobView::get) for dynamic lookup where any parameter is a
/// first-class attribute.
///
/// [`Experiment::get_job`]: crate::experiment::Experiment::get_job
#[derive(Debug)]
pub struct JobView {
    job: JobMetadata,
    resolver: Arc<dyn ArtifactResolver>,
}

impl JobView {
    pub(crate) fn new(job: JobMetadata, resolver: Arc<dyn ArtifactResolver>) -> Self {
        Self { job, resolver }
    }

    /// Unique job id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.job.id()
    }

    /// Human-readable job name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.job.name()
    }

    /// Free-form stage classification.
    #[must_use]
    pub fn stage_type(&self) -> &str {
        self.job.stage_type()
    }

    /// Name of the run that owns this job.
    #[must_use]
    pub fn run(&self) -> &str {
        self.job.run()
    }

    /// Opaque job parameters.
    #[must_use]
    pub fn params(&self) -> &serde_json::Map<String, Value> {
        self.job.params()
    }

    /// Named output artifacts.
    #[must_use]
    pub fn outputs(&self) -> &BTreeMap<String, OutputSpec> {
        self.job.outputs()
    }

    /// The underlying metadata record.
    #[must_use]
    pub fn metadata(&self) -> &JobMetadata {
        &self.job
    }

    /// Dynamic field lookup: the fixed fields (`id`, `name`, `stage_type`,
    /// `run`) first, then the params mapping. Returns `None` when the name
    /// resolves to nothing defined.
    ///
    /// The filter engine goes through this path, so a predicate on a missing
    /// field simply matches nothing instead of failing.
    #[must_use]
    pub fn lookup(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::String(self.job.id().to_string())),
            "name" => Some(Value::String(self.job.name().to_string())),
            "stage_type" => Some(Value::String(self.job.stage_type().to_string())),
            "run" => Some(Value::String(self.job.run().to_string())),
            _ => self.job.param(field).cloned(),
        }
    }

    /// Dynamic field access.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::AttributeNotFound`] naming the missing attribute
    /// when neither a fixed field nor a parameter matches.
    pub fn get(&self, field: &str) -> Result<Value> {
        self.lookup(field).ok_or_else(|| Error::AttributeNotFound {
            job_id: self.job.id().to_string(),
            attribute: field.to_string(),
        })
    }

    /// Resolve the filesystem location of one named output.
    ///
    /// Looks up `key` in the job's outputs and delegates to the experiment's
    /// resolver with the output's relative name.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::OutputKeyNotFound`] when `key` is absent, or with
    /// whatever the resolver reports (see
    /// [`ManifestResolver`](crate::resolver::ManifestResolver)).
    pub fn get_output_path(&self, key: &str) -> Result<PathBuf> {
        let spec = self
            .job
            .outputs()
            .get(key)
            .ok_or_else(|| Error::OutputKeyNotFound {
                job_id: self.job.id().to_string(),
                key: key.to_string(),
            })?;
        self.resolver.resolve_path(&self.job, spec.relative_path())
    }
}

impl fmt::Display for JobView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobView(id='{}', name='{}')", self.id(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::LocalCacheResolver;

    fn view() -> JobView {
        let job = JobMetadata::builder("j1")
            .name("train")
            .stage_type("producer")
            .param("seed", 7)
            .output("model", "$out/model.bin")
            .build();
        JobView::new(job, Arc::new(LocalCacheResolver::new("/tmp/cache")))
    }

    #[test]
    fn test_fixed_field_lookup() {
        let v = view();
        assert_eq!(v.lookup("id"), Some(Value::from("j1")));
        assert_eq!(v.lookup("name"), Some(Value::from("train")));
        assert_eq!(v.lookup("stage_type"), Some(Value::from("producer")));
    }

    #[test]
    fn test_param_lookup_falls_through() {
        let v = view();
        assert_eq!(v.lookup("seed"), Some(Value::from(7)));
        assert_eq!(v.lookup("nonexistent"), None);
    }

    #[test]
    fn test_get_unknown_attribute_fails() {
        let v = view();
        let err = v.get("completely_unknown_attribute_xyz").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("has no attribute"), "{msg}");
        assert!(msg.contains("completely_unknown_attribute_xyz"), "{msg}");
    }

    #[test]
    fn test_get_output_path_resolves_relative_name() {
        let v = view();
        let path = v.get_output_path("model").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/cache/j1/out/model.bin"));
    }

    #[test]
    fn test_get_output_path_unknown_key_fails() {
        let v = view();
        let err = v.get_output_path("nonexistent_output_key").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_display_names_id_and_name() {
        let v = view();
        let s = v.to_string();
        assert!(s.contains("j1"));
        assert!(s.contains("train"));
    }
}
