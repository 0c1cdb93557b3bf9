//! Synthetic label allocation.
//!
//! Multiple translation units share one flat assembly namespace, so every
//! translator-generated jump target must be unique across the whole run.
//! The allocator is an explicit value threaded into the code generator and
//! the bootstrap emitter; counters are monotonic and never reused.

use std::collections::HashMap;

/// Allocator for run-unique synthetic jump targets.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    comparisons: u32,
    call_sites: HashMap<String, u32>,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the (true-branch, continuation) label pair for one
    /// comparison. Each call yields a fresh pair.
    pub fn comparison_pair(&mut self) -> (String, String) {
        let n = self.comparisons;
        self.comparisons += 1;
        (format!("CMP{n}_TRUE"), format!("CMP{n}_END"))
    }

    /// Allocate the return label for one call site inside `caller`.
    ///
    /// The label is `caller$ret.k` with k counting call sites per caller, so
    /// repeated or recursive calls each get a distinct return point, and the
    /// caller prefix keeps labels distinct across functions.
    pub fn return_label(&mut self, caller: &str) -> String {
        let k = self.call_sites.entry(caller.to_string()).or_insert(0);
        let label = format!("{caller}$ret.{k}");
        *k += 1;
        label
    }
}
