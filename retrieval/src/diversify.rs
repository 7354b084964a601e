use crate::result::RankedResult;
use std::collections::HashMap;

/// Per-file cap with deferral
///
/// Walks the ranked list in order and admits up to `max_per_file` results
/// per file path. Results over the cap are deferred, not dropped: they are
/// appended after every admitted result, each group keeping its original
/// order. Truncation happens later, so deferred results still surface when
/// the admitted pool is smaller than the requested result count.
pub struct Diversifier {
    max_per_file: usize,
}

impl Diversifier {
    pub fn new(max_per_file: usize) -> Self {
        Self { max_per_file }
    }

    pub fn apply(&self, results: Vec<RankedResult>) -> Vec<RankedResult> {
        if results.len() <= 1 {
            return results;
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut admitted = Vec::with_capacity(results.len());
        let mut deferred = Vec::new();

        for result in results {
            let count = seen.entry(result.chunk.path.clone()).or_insert(0);
            if *count < self.max_per_file {
                *count += 1;
                admitted.push(result);
            } else {
                deferred.push(result);
            }
        }

        admitted.extend(deferred);
        admitted
    }
}
