//! # repx-meta: Queryable Run Metadata for repx
//!
//! repx-meta gives analysis notebooks, reporting tools, and visualization
//! layers structured access to the metadata the repx execution engine emits:
//! load a run document, filter jobs by attribute predicates, resolve named
//! outputs to filesystem locations under pluggable storage strategies, and
//! export selections as Arrow record batches.
//!
//! The crate performs no job execution and never validates that resolved
//! artifacts exist; metadata is load-once and read-only for the lifetime of
//! an [`Experiment`](experiment::Experiment).
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use repx_meta::experiment::Experiment;
//! use repx_meta::query::Predicate;
//!
//! // Load a run document; outputs resolve under ./results
//! let exp = Experiment::from_run_metadata("meta-run-a.json", "results")?;
//!
//! // Chainable predicate filtering
//! let producers = exp
//!     .jobs()
//!     .filter([Predicate::parse("stage_type", "simple")])
//!     .filter([Predicate::parse("name__contains", "producer")]);
//!
//! for job in &producers {
//!     println!("{} -> {}", job.id(), job.get_output_path("data")?.display());
//! }
//!
//! // Tabular export for the analysis side
//! let frame = producers.to_dataframe()?;
//! println!("{} rows", frame.num_rows());
//! # Ok::<(), repx_meta::Error>(())
//! ```
//!
//! Loading emits `tracing` events at `debug` level; install a
//! `tracing-subscriber` to see them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod experiment;
pub mod export;
pub mod metadata;
pub mod query;
pub mod resolver;

pub use error::{Error, Result};
pub use experiment::{Experiment, JobCollection, JobView};
pub use metadata::{JobMetadata, OutputSpec, RunMetadata};
pub use query::{FilterOp, Predicate};
pub use resolver::{ArtifactResolver, LocalCacheResolver, ManifestResolver};
