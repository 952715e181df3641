//! Tabular export boundary (Arrow)
//!
//! Reporting and visualization collaborators consume job selections as
//! columnar data: one row per job, one nullable UTF-8 column per job field
//! and per parameter key observed across the selection. Everything exports
//! as strings because parameters are opaque; consumers cast on their side
//! of the boundary.

use crate::experiment::{JobCollection, JobView};
use crate::Result;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Fixed job fields every non-empty export carries, ahead of the observed
/// parameter columns.
const FIXED_COLUMNS: [&str; 4] = ["id", "name", "stage_type", "run"];

impl JobCollection<'_> {
    /// Flatten the collection into an Arrow [`RecordBatch`].
    ///
    /// Columns are the fixed job fields followed by every parameter key
    /// observed across the collection, in sorted order. String parameters
    /// export verbatim, other values in their JSON rendering, absent
    /// parameters as null. An empty collection produces a valid zero-row
    /// batch.
    ///
    /// # Errors
    ///
    /// Propagates Arrow schema/column construction failures.
    pub fn to_dataframe(&self) -> Result<RecordBatch> {
        let views: Vec<Arc<JobView>> = self.iter().collect();
        if views.is_empty() {
            return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
        }

        let mut param_keys: BTreeSet<String> = BTreeSet::new();
        for view in &views {
            for key in view.params().keys() {
                // A parameter shadowed by a fixed field keeps the fixed
                // column; no duplicate column names in the schema.
                if !FIXED_COLUMNS.contains(&key.as_str()) {
                    param_keys.insert(key.clone());
                }
            }
        }

        let column_count = FIXED_COLUMNS.len() + param_keys.len();
        let mut fields = Vec::with_capacity(column_count);
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(column_count);

        for name in FIXED_COLUMNS {
            let values: Vec<&str> = views
                .iter()
                .map(|v| match name {
                    "id" => v.id(),
                    "name" => v.name(),
                    "stage_type" => v.stage_type(),
                    _ => v.run(),
                })
                .collect();
            fields.push(Field::new(name, DataType::Utf8, false));
            columns.push(Arc::new(StringArray::from(values)) as ArrayRef);
        }

        for key in &param_keys {
            let values: Vec<Option<String>> = views
                .iter()
                .map(|v| v.params().get(key).map(render_value))
                .collect();
            fields.push(Field::new(key, DataType::Utf8, true));
            columns.push(Arc::new(StringArray::from(values)) as ArrayRef);
        }

        let schema = Arc::new(Schema::new(fields));
        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

/// Per-parameter distinct-value sets across a sequence of views.
///
/// Used by reporting collaborators to detect which parameters vary over a
/// selection. Jobs where a parameter is absent contribute nothing to that
/// parameter's set; a parameter defined by a single job still appears, with
/// one value.
///
/// # Example
///
/// ```
/// use repx_meta::experiment::Experiment;
/// use repx_meta::export::varying_params;
/// use repx_meta::metadata::{JobMetadata, RunMetadata};
///
/// let run = RunMetadata::new("r", [
///     JobMetadata::builder("j1").param("x", 1).build(),
///     JobMetadata::builder("j2").param("x", 2).build(),
/// ]);
/// let exp = Experiment::builder().run(run).build()?;
///
/// let varying = varying_params(exp.jobs().iter());
/// assert_eq!(varying["x"].len(), 2);
/// # Ok::<(), repx_meta::Error>(())
/// ```
#[must_use]
pub fn varying_params<I, V>(views: I) -> BTreeMap<String, Vec<Value>>
where
    I: IntoIterator<Item = V>,
    V: Borrow<JobView>,
{
    let mut observed: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for view in views {
        for (key, value) in view.borrow().params() {
            let values = observed.entry(key.clone()).or_default();
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
    }
    observed
}

/// String rendering for one exported cell: strings verbatim, everything
/// else in its JSON form.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use crate::experiment::Experiment;
    use crate::metadata::{JobMetadata, RunMetadata};
    use serde_json::json;

    fn experiment() -> Experiment {
        let run = RunMetadata::new(
            "run-a",
            [
                JobMetadata::builder("j1")
                    .name("train")
                    .param("seed", 1)
                    .param("tags", json!(["a", "b"]))
                    .build(),
                JobMetadata::builder("j2").name("eval").param("seed", 2).build(),
            ],
        );
        Experiment::builder().run(run).build().unwrap()
    }

    #[test]
    fn test_dataframe_columns() {
        let exp = experiment();
        let batch = exp.jobs().to_dataframe().unwrap();

        assert_eq!(batch.num_rows(), 2);
        let schema = batch.schema();
        let names: Vec<&str> = schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(names, vec!["id", "name", "stage_type", "run", "seed", "tags"]);
    }

    #[test]
    fn test_dataframe_absent_param_is_null() {
        let exp = experiment();
        let batch = exp.jobs().to_dataframe().unwrap();

        let tags = batch
            .column_by_name("tags")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(tags.value(0), r#"["a","b"]"#);
        assert!(tags.is_null(1));
    }

    #[test]
    fn test_dataframe_empty_collection() {
        let exp = experiment();
        let empty = exp.jobs().slice(0..0);
        let batch = empty.to_dataframe().unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 0);
    }

    #[test]
    fn test_varying_params_distinct_values() {
        let exp = experiment();
        let varying = varying_params(exp.jobs().iter());

        let mut seeds: Vec<i64> = varying["seed"].iter().filter_map(Value::as_i64).collect();
        seeds.sort_unstable();
        assert_eq!(seeds, vec![1, 2]);
        // "tags" defined on one job only: present, one value
        assert_eq!(varying["tags"].len(), 1);
    }

    #[test]
    fn test_varying_params_empty_input() {
        let varying = varying_params(std::iter::empty::<Arc<JobView>>());
        assert!(varying.is_empty());
    }
}
