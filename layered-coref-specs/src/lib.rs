#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven testing infrastructure for layered-coref.
//!
//! Test cases are TOML files describing a document sentence by sentence and
//! the chains, legacy links and token clusters the annotator should produce.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture file model and document construction
//! - [`loader`] - Fixture file loading
//! - [`parser`] - A chunking parser handle for sentences without trees
//! - [`runner`] - Runs fixtures and reports mismatches
//! - [`errors`] - Error types for the harness

pub mod errors;
pub mod fixture;
pub mod loader;
pub mod parser;
pub mod runner;

pub use errors::{SpecError, SpecResult};
pub use fixture::{CorefFixture, Expected, FixtureSentence};
pub use loader::{load_all_fixtures, load_fixture};
pub use parser::ChunkingParser;
pub use runner::{check_fixture, run_fixture, CorefOutput, Mismatch};
