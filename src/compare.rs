//! Superset check between an etalon result and an indexed result.
//!
//! Both sequences must be sorted with [`sort_canonical`]; the walk compares
//! entries with the same [`CandidateEntry::canonical_cmp`] the sort used.
//!
//! [`sort_canonical`]: crate::collect::sort_canonical

use crate::collect::CandidateEntry;
use std::cmp::Ordering;

/// Outcome of comparing a test sequence against its etalon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Every etalon entry is present; `extra` test entries were tolerated.
    Superset { extra: usize },
    /// The test sequence is shorter than the etalon.
    TooShort,
    /// The etalon entry at `index` has no counterpart in the test sequence.
    Missing { index: usize },
}

impl Comparison {
    pub fn is_superset(&self) -> bool {
        matches!(self, Comparison::Superset { .. })
    }
}

/// Check that `test` contains every entry of `etalon`.
pub fn compare_sequences(etalon: &[CandidateEntry], test: &[CandidateEntry]) -> Comparison {
    if test.len() < etalon.len() {
        return Comparison::TooShort;
    }
    match first_missing(etalon, test) {
        Some(index) => Comparison::Missing { index },
        None => Comparison::Superset {
            extra: test.len() - etalon.len(),
        },
    }
}

/// Merge walk over both sorted sequences, returning the index of the first
/// etalon entry absent from `test`.
///
/// Equal keys advance both sides, a smaller etalon key is missing from
/// `test`, and a smaller test key is an extra entry that is skipped. Etalon
/// entries left over once `test` is exhausted are missing as well.
pub fn first_missing(etalon: &[CandidateEntry], test: &[CandidateEntry]) -> Option<usize> {
    let (mut i, mut j) = (0, 0);
    while i < etalon.len() && j < test.len() {
        match etalon[i].canonical_cmp(&test[j]) {
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            Ordering::Less => return Some(i),
            Ordering::Greater => j += 1,
        }
    }
    (i < etalon.len()).then_some(i)
}
