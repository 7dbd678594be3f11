//! Symbolic QUBO encoding.
//!
//! The service only understands dense, integer-indexed matrices. This module
//! turns a mapping of named variable pairs to coefficients into a
//! [`QuboMatrix`] and keeps the name/index mapping needed to read solutions
//! back in terms of the original names.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::error::{Abs2Error, Abs2Result};
use crate::models::{QuboEntry, QuboMatrix};

/// Smallest matrix width the solver accepts.
pub const MIN_NBIT: usize = 32;

/// Length of generated file stems.
const FILE_STEM_LEN: usize = 10;

/// Quadratic coefficients keyed by `(nameA, nameB)`.
///
/// `(a, b)` and `(b, a)` are distinct keys; both are passed through as-is.
pub type SymbolicQubo = BTreeMap<(String, String), f64>;

/// Bijection between variable names and matrix indices `0..len`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyMapping {
    indices: FxHashMap<String, usize>,
    names: Vec<String>,
}

impl KeyMapping {
    /// Assign indices to `names` in iteration order.
    fn from_names(names: impl IntoIterator<Item = String>) -> Self {
        let names: Vec<String> = names.into_iter().collect();
        let indices = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Self { indices, names }
    }

    /// Rebuild a mapping from its index-ordered names.
    ///
    /// Duplicate names keep their first index.
    pub fn from_ordered_names(names: Vec<String>) -> Self {
        let mut seen = BTreeSet::new();
        Self::from_names(names.into_iter().filter(|n| seen.insert(n.clone())))
    }

    /// Index of `name`, if it was part of the encoded problem.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// Name at `index`, if the index is in use.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Map a solver bit vector back to variable names.
    ///
    /// Positions past the last named index are padding up to `nbit` and are
    /// ignored; a vector shorter than the mapping yields only the names it
    /// covers.
    pub fn decode_solution(&self, solution: &[i64]) -> BTreeMap<String, i64> {
        solution
            .iter()
            .enumerate()
            .map_while(|(idx, &value)| self.name_of(idx).map(|name| (name.to_string(), value)))
            .collect()
    }
}

/// Output of [`encode`]: the upload payload plus its index mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedQubo {
    pub matrix: QuboMatrix,
    pub mapping: KeyMapping,
}

/// Encode a symbolic QUBO into the dense upload format.
///
/// Names are indexed in sorted order. Weights are truncated toward zero;
/// NaN and infinite weights are rejected. When `file` is `None` a random
/// `<10 lowercase letters>.json` name is generated.
pub fn encode(qubo: &SymbolicQubo, file: Option<&str>) -> Abs2Result<EncodedQubo> {
    let names: BTreeSet<&str> = qubo
        .keys()
        .flat_map(|(a, b)| [a.as_str(), b.as_str()])
        .collect();
    let mapping = KeyMapping::from_names(names.into_iter().map(str::to_string));

    let mut entries = Vec::with_capacity(qubo.len());
    for ((a, b), &weight) in qubo {
        let (i, j) = (mapping.indices[a.as_str()], mapping.indices[b.as_str()]);
        entries.push(QuboEntry(i, j, truncate_weight(a, b, weight)?));
    }

    let matrix = QuboMatrix {
        file: file.map_or_else(random_file_name, str::to_string),
        nbit: mapping.len().max(MIN_NBIT),
        base: 0,
        qubo: entries,
    };

    Ok(EncodedQubo { matrix, mapping })
}

fn truncate_weight(a: &str, b: &str, weight: f64) -> Abs2Result<i64> {
    if !weight.is_finite() {
        return Err(Abs2Error::InvalidWeight {
            a: a.to_string(),
            b: b.to_string(),
        });
    }
    // `as` truncates toward zero and saturates at the i64 bounds.
    Ok(weight.trunc() as i64)
}

/// Random `<stem>.json` file name with a lowercase ASCII stem.
pub fn random_file_name() -> String {
    let mut rng = rand::thread_rng();
    let stem: String = (0..FILE_STEM_LEN)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect();
    format!("{stem}.json")
}
