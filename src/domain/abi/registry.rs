//! Function signatures keyed by 4-byte selector

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A function parameter specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Where a signature came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureSource {
    /// Compiled ABI artifact on disk
    Artifact(PathBuf),
    /// Remote signature database
    Remote,
    /// Built in or constructed by hand
    Builtin,
}

/// A function signature with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// 4-byte function selector
    pub selector: [u8; 4],
    /// Function name
    pub name: String,
    /// Full signature string (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
    pub source: SignatureSource,
}

impl FunctionSignature {
    /// Parameter types in declaration order
    pub fn input_kinds(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|param| param.kind.as_str())
    }
}

/// Outcome of filling a registry from disk
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    /// Candidate files parsed
    pub files: usize,
    /// One line per unreadable or malformed file
    pub errors: Vec<String>,
    pub elapsed: Duration,
}

impl ScanStats {
    fn absorb(&mut self, other: ScanStats) {
        self.files = self.files.saturating_add(other.files);
        self.errors.extend(other.errors);
        self.elapsed += other.elapsed;
    }
}

/// Selector-indexed signatures; the first signature seen for a selector is
/// kept and later ones are ignored
#[derive(Debug, Default, Clone)]
pub struct AbiRegistry {
    by_selector: HashMap<[u8; 4], FunctionSignature>,
    pub stats: ScanStats,
}

impl AbiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the selector was already taken
    pub fn insert(&mut self, function: FunctionSignature) -> bool {
        match self.by_selector.entry(function.selector) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(function);
                true
            }
        }
    }

    pub fn lookup(&self, selector: [u8; 4]) -> Option<&FunctionSignature> {
        self.by_selector.get(&selector)
    }

    pub fn len(&self) -> usize {
        self.by_selector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_selector.is_empty()
    }

    /// Fold `other` in; entries already present win
    pub fn merge(&mut self, other: Self) {
        self.stats.absorb(other.stats);
        for function in other.by_selector.into_values() {
            self.insert(function);
        }
    }
}
