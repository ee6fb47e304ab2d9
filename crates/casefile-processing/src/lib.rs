//! Casefile upload acceptance pipeline
//!
//! Stages run per file in a fixed, cost-ordered sequence:
//!
//! 1. [`policy`]: declared type allowlist and extension cross-check (no file I/O)
//! 2. [`filename`]: traversal/character checks and storage name synthesis
//! 3. size ceiling for the type's size class
//! 4. [`signature`]: magic-number verification over a 512-byte head
//! 5. [`scanner`]: heuristic content scan over a 10,000-byte head
//!
//! [`pipeline::UploadPipeline`] runs the stages for a whole submission and
//! disposes every file of the batch through [`disposal`] when any file fails.

pub mod disposal;
pub mod filename;
pub mod policy;
pub mod pipeline;
pub mod scanner;
pub mod signature;

mod bounded_read;

pub use disposal::{Disposer, LocalDisposer};
pub use filename::sanitize_filename;
pub use pipeline::{PipelineOptions, UploadPipeline};
pub use policy::{PolicyEntry, PolicyTable};
pub use scanner::ContentScanner;
pub use signature::{Signature, SignatureTable};
