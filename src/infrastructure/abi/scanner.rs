//! Builds a local signature registry from compiler output on disk
//!
//! Foundry (`out/`) and Hardhat (`artifacts/`) artifacts are picked up, as is
//! any standalone `*.abi.json`. Unreadable files are recorded in the scan
//! stats and skipped.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use alloy_json_abi::JsonAbi;
use anyhow::Result;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::domain::abi::{AbiRegistry, FunctionSignature, ParamSpec, SignatureSource};

/// Largest artifact we bother parsing
const MAX_ARTIFACT_BYTES: u64 = 5 * 1024 * 1024;

/// Directory names never descended into
const SKIPPED_DIRS: &[&str] = &[".git", "target", "node_modules", ".next", "dist", "build"];

/// Directory names whose JSON files are build artifacts
const ARTIFACT_DIRS: &[&str] = &["out", "artifacts"];

pub struct AbiScanner;

impl AbiScanner {
    /// Scan one root
    pub fn scan(root: impl AsRef<Path>) -> AbiRegistry {
        let root = root.as_ref();
        let started = Instant::now();
        let mut registry = AbiRegistry::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !Self::is_skipped(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    registry.stats.errors.push(err.to_string());
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !Self::is_abi_candidate(path) {
                continue;
            }
            if entry
                .metadata()
                .map(|meta| meta.len() > MAX_ARTIFACT_BYTES)
                .unwrap_or(false)
            {
                debug!(path = %path.display(), "skipping oversized artifact");
                continue;
            }

            registry.stats.files += 1;
            match Self::read_functions(path) {
                Ok(functions) => {
                    for function in functions {
                        registry.insert(function);
                    }
                }
                Err(err) => registry
                    .stats
                    .errors
                    .push(format!("{}: {err}", path.display())),
            }
        }

        registry.stats.elapsed = started.elapsed();
        debug!(
            root = %root.display(),
            files = registry.stats.files,
            functions = registry.len(),
            errors = registry.stats.errors.len(),
            "abi scan finished"
        );
        registry
    }

    /// Scan several roots; earlier roots win selector collisions
    pub fn scan_roots(roots: &[PathBuf]) -> AbiRegistry {
        roots
            .iter()
            .map(|root| Self::scan(root))
            .fold(AbiRegistry::new(), |mut acc, registry| {
                acc.merge(registry);
                acc
            })
    }

    /// Functions declared by a raw ABI array or an artifact's `abi` field
    ///
    /// JSON with neither shape yields nothing.
    fn read_functions(path: &Path) -> Result<Vec<FunctionSignature>> {
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        let abi = match value {
            serde_json::Value::Array(_) => value,
            serde_json::Value::Object(mut object) => match object.remove("abi") {
                Some(abi) => abi,
                None => return Ok(Vec::new()),
            },
            _ => return Ok(Vec::new()),
        };
        let abi: JsonAbi = serde_json::from_value(abi)?;

        Ok(abi
            .functions()
            .map(|function| FunctionSignature {
                selector: function.selector().0,
                name: function.name.clone(),
                signature: function.signature(),
                inputs: function
                    .inputs
                    .iter()
                    .map(|input| ParamSpec::new(input.name.clone(), input.selector_type()))
                    .collect(),
                source: SignatureSource::Artifact(path.to_path_buf()),
            })
            .collect())
    }

    fn is_abi_candidate(path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        if file_name.ends_with(".abi.json") {
            return true;
        }
        file_name.ends_with(".json")
            && path.components().any(|component| match component {
                Component::Normal(dir) => dir
                    .to_str()
                    .map(|dir| ARTIFACT_DIRS.contains(&dir))
                    .unwrap_or(false),
                _ => false,
            })
    }

    fn is_skipped(entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(|name| SKIPPED_DIRS.contains(&name))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates() {
        assert!(AbiScanner::is_abi_candidate(Path::new("/project/out/Vault.sol/Vault.json")));
        assert!(AbiScanner::is_abi_candidate(Path::new(
            "/project/artifacts/contracts/Token.json"
        )));
        assert!(AbiScanner::is_abi_candidate(Path::new("/abis/Token.abi.json")));
        assert!(!AbiScanner::is_abi_candidate(Path::new("/project/src/Contract.sol")));
        assert!(!AbiScanner::is_abi_candidate(Path::new("/project/package.json")));
    }

    #[test]
    fn test_scan_artifacts() {
        let root = std::env::temp_dir().join(format!("txlens_scan_{}", std::process::id()));
        let out = root.join("out");
        let skipped = root.join("node_modules").join("out");
        fs::create_dir_all(&out).unwrap();
        fs::create_dir_all(&skipped).unwrap();

        fs::write(
            out.join("Token.json"),
            r#"{"abi": [{
                "type": "function",
                "name": "transfer",
                "inputs": [
                    {"name": "to", "type": "address"},
                    {"name": "value", "type": "uint256"}
                ],
                "outputs": [{"name": "", "type": "bool"}],
                "stateMutability": "nonpayable"
            }]}"#,
        )
        .unwrap();
        fs::write(out.join("Broken.json"), "{ not json").unwrap();
        fs::write(out.join("meta.json"), r#"{"compiler": "solc"}"#).unwrap();
        fs::write(
            skipped.join("Dep.json"),
            r#"[{"type": "function", "name": "skim", "inputs": [], "outputs": [], "stateMutability": "nonpayable"}]"#,
        )
        .unwrap();

        let registry = AbiScanner::scan_roots(&[root.clone()]);

        assert_eq!(registry.stats.files, 3);
        assert_eq!(registry.stats.errors.len(), 1);
        assert_eq!(registry.len(), 1);
        let transfer = registry.lookup([0xa9, 0x05, 0x9c, 0xbb]).unwrap();
        assert_eq!(transfer.signature, "transfer(address,uint256)");
        assert_eq!(transfer.inputs[0].name, "to");

        fs::remove_dir_all(root).ok();
    }
}
