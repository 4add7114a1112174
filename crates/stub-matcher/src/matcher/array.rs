//! Order-independent array comparison.
//!
//! Arrays are compared as multisets: lengths must agree (in every mode), then
//! each pattern element needs a target element that satisfies it. Whether a
//! target element may serve more than one pattern element is decided by
//! [`ArrayMatching`].

use super::mismatch::{Mismatch, MismatchReason};
use super::{Comparator, MatchMode};
use crate::json::JsonValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candidate policy for array elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayMatching {
    /// A target element may satisfy any number of pattern elements, so
    /// `[1, 1]` matches `[1, 2]`. Kept as the default for compatibility with
    /// stubs written against earlier releases.
    #[default]
    Reusable,
    /// Each target element satisfies at most one pattern element; the arrays
    /// must be equal as multisets.
    Exclusive,
}

impl ArrayMatching {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrayMatching::Reusable => "reusable",
            ArrayMatching::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for ArrayMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrayMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reusable" => Ok(ArrayMatching::Reusable),
            "exclusive" => Ok(ArrayMatching::Exclusive),
            other => Err(format!(
                "unknown array matching '{other}' (expected 'reusable' or 'exclusive')"
            )),
        }
    }
}

impl Comparator {
    pub(super) fn compare_arrays(
        &self,
        pattern: &[JsonValue],
        target: &[JsonValue],
        mode: MatchMode,
    ) -> Result<(), Mismatch> {
        if pattern.len() != target.len() {
            return Err(Mismatch::new(MismatchReason::ArrayLength {
                expected: pattern.len(),
                actual: target.len(),
            }));
        }

        match self.array_matching {
            ArrayMatching::Reusable => {
                for (index, item) in pattern.iter().enumerate() {
                    if !target
                        .iter()
                        .any(|candidate| self.element_matches(item, candidate, mode))
                    {
                        return Err(Mismatch::new(MismatchReason::NoCandidate).within_index(index));
                    }
                }
                Ok(())
            }
            ArrayMatching::Exclusive => self.assign_exclusive(pattern, target, mode),
        }
    }

    /// Match an array element against a candidate.
    ///
    /// Objects recurse under the same mode, nested arrays use the array rule,
    /// everything else must be scalar-equal (which also rejects differing kinds).
    pub(super) fn element_matches(
        &self,
        item: &JsonValue,
        candidate: &JsonValue,
        mode: MatchMode,
    ) -> bool {
        match (item, candidate) {
            (JsonValue::Object(item), JsonValue::Object(candidate)) => {
                self.compare_objects(item, candidate, mode).is_ok()
            }
            (JsonValue::Array(item), JsonValue::Array(candidate)) => {
                self.compare_arrays(item, candidate, mode).is_ok()
            }
            _ => scalar_equal(item, candidate),
        }
    }

    /// Find a one-to-one assignment of pattern elements to target elements.
    ///
    /// A greedy pass gives each element the first free compatible slot; only
    /// elements left over go through Kuhn's augmenting paths.
    fn assign_exclusive(
        &self,
        pattern: &[JsonValue],
        target: &[JsonValue],
        mode: MatchMode,
    ) -> Result<(), Mismatch> {
        let mut owner: Vec<Option<usize>> = vec![None; target.len()];
        let mut unassigned = Vec::new();
        for (index, item) in pattern.iter().enumerate() {
            let free = (0..target.len()).find(|&slot| {
                owner[slot].is_none() && self.element_matches(item, &target[slot], mode)
            });
            match free {
                Some(slot) => owner[slot] = Some(index),
                None => unassigned.push(index),
            }
        }
        if unassigned.is_empty() {
            return Ok(());
        }

        let mut edges = Vec::with_capacity(pattern.len());
        for (index, item) in pattern.iter().enumerate() {
            let candidates: Vec<usize> = target
                .iter()
                .enumerate()
                .filter(|(_, candidate)| self.element_matches(item, candidate, mode))
                .map(|(slot, _)| slot)
                .collect();
            if candidates.is_empty() {
                return Err(Mismatch::new(MismatchReason::NoCandidate).within_index(index));
            }
            edges.push(candidates);
        }

        for index in unassigned {
            let mut visited = vec![false; target.len()];
            if !augment(index, &edges, &mut owner, &mut visited) {
                return Err(Mismatch::new(MismatchReason::NoCandidate).within_index(index));
            }
        }
        Ok(())
    }
}

/// Search for an augmenting path from pattern element `root`.
///
/// Iterative depth-first search: `stack[i]` is a pattern element and its next
/// edge to try, `through[i]` the slot `stack[i]` wants to take from
/// `stack[i + 1]`.
fn augment(
    root: usize,
    edges: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
    let mut through: Vec<usize> = Vec::new();

    while let Some(frame) = stack.last_mut() {
        let (index, next) = *frame;
        let Some(&slot) = edges[index].get(next) else {
            stack.pop();
            through.pop();
            continue;
        };
        frame.1 += 1;
        if visited[slot] {
            continue;
        }
        visited[slot] = true;

        match owner[slot] {
            Some(other) => {
                through.push(slot);
                stack.push((other, 0));
            }
            None => {
                owner[slot] = Some(index);
                for (level, &taken) in through.iter().enumerate() {
                    owner[taken] = Some(stack[level].0);
                }
                return true;
            }
        }
    }
    false
}

/// Exact equality for null, bool, number and string values.
///
/// Numbers compare as doubles with no tolerance.
pub(super) fn scalar_equal(left: &JsonValue, right: &JsonValue) -> bool {
    match (left, right) {
        (JsonValue::Null, JsonValue::Null) => true,
        (JsonValue::Bool(a), JsonValue::Bool(b)) => a == b,
        (JsonValue::Number(a), JsonValue::Number(b)) => a == b,
        (JsonValue::String(a), JsonValue::String(b)) => a == b,
        _ => false,
    }
}
