//! Tabular export boundary tests

use arrow::array::Array;
use arrow::array::StringArray;
use repx_meta::experiment::Experiment;
use repx_meta::export::varying_params;
use repx_meta::metadata::{JobMetadata, RunMetadata};
use repx_meta::query::Predicate;
use serde_json::json;

fn sweep() -> Experiment {
    let run = RunMetadata::new(
        "sweep",
        [
            JobMetadata::builder("j1")
                .name("train")
                .stage_type("simple")
                .param("seed", 1)
                .param("lr", 0.1)
                .build(),
            JobMetadata::builder("j2")
                .name("train")
                .stage_type("simple")
                .param("seed", 2)
                .param("lr", 0.1)
                .build(),
            JobMetadata::builder("j3")
                .name("eval")
                .stage_type("consumer")
                .param("split", "test")
                .build(),
        ],
    );
    Experiment::builder().run(run).build().unwrap()
}

#[test]
fn test_dataframe_has_field_and_param_columns() {
    let exp = sweep();
    let batch = exp.jobs().to_dataframe().unwrap();

    assert_eq!(batch.num_rows(), 3);
    let schema = batch.schema();
    let names: Vec<&str> = schema
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    assert_eq!(
        names,
        vec!["id", "name", "stage_type", "run", "lr", "seed", "split"]
    );
}

#[test]
fn test_dataframe_cell_values() {
    let exp = sweep();
    let batch = exp.jobs().to_dataframe().unwrap();

    let name = batch
        .column_by_name("name")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(name.value(0), "train");
    assert_eq!(name.value(2), "eval");

    let seed = batch
        .column_by_name("seed")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(seed.value(0), "1");
    assert!(seed.is_null(2));

    let split = batch
        .column_by_name("split")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert!(split.is_null(0));
    assert_eq!(split.value(2), "test");
}

#[test]
fn test_dataframe_of_filtered_selection() {
    let exp = sweep();
    let simple = exp.jobs().filter([Predicate::parse("stage_type", "simple")]);
    let batch = simple.to_dataframe().unwrap();

    assert_eq!(batch.num_rows(), 2);
    // column detection only sees the selection: "split" is gone
    assert!(batch.column_by_name("split").is_none());
    assert!(batch.column_by_name("seed").is_some());
}

#[test]
fn test_empty_collection_dataframe() {
    let exp = sweep();
    let empty = exp.jobs().filter([Predicate::parse("name", "nonexistent")]);

    let batch = empty.to_dataframe().unwrap();
    assert_eq!(batch.num_rows(), 0);
}

// =============================================================================
// varying_params helper
// =============================================================================

#[test]
fn test_varying_params_across_selection() {
    let exp = sweep();
    let views: Vec<_> = exp.jobs().iter().collect();
    let varying = varying_params(views);

    assert_eq!(varying["seed"].len(), 2);
    assert_eq!(varying["lr"].len(), 1);
    assert_eq!(varying["split"], vec![json!("test")]);
}

#[test]
fn test_varying_params_omits_absent_jobs() {
    let exp = sweep();
    let varying = varying_params(exp.jobs().iter());
    // j3 does not define "seed"; no placeholder value appears
    assert!(varying["seed"].iter().all(serde_json::Value::is_number));
}

#[test]
fn test_varying_params_empty_selection() {
    let exp = sweep();
    let empty = exp.jobs().filter([Predicate::parse("name", "nope")]);
    assert!(varying_params(empty.iter()).is_empty());
}
