//! The coreference resolution seam and its default sieve implementation.

mod dictionaries;
mod sieve;

use std::collections::BTreeMap;
use std::sync::Arc;

use layered_coref_document::CorefChain;

use crate::{ArrangedDocument, ProcessingFault};

pub use dictionaries::{Animacy, Dictionaries, Gender, Number, Person, PronounClass};
pub use sieve::{SievePass, SieveResolver};

/// Partitions an arranged document's mentions into chains.
///
/// Implementations hold only read-only state after construction and are
/// shared across threads. Output must be deterministic for identical input.
pub trait CorefResolver: Send + Sync {
    /// Word lists shared with mention finding and arrangement.
    fn dictionaries(&self) -> Arc<Dictionaries>;

    fn coref(&self, document: &ArrangedDocument)
        -> Result<BTreeMap<u32, CorefChain>, ProcessingFault>;
}
