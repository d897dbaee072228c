use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::Deserialize;
use tracing::warn;

use crate::domain::tx::{AddressBook, KnownToken};

/// Decimals assumed for tokens that don't declare any
const DEFAULT_TOKEN_DECIMALS: u8 = 18;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSpec {
    pub address: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedAddress {
    pub address: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Node endpoint (http, ws or ipc path)
    pub rpc: Option<String>,

    /// Query the remote signature database for unknown selectors
    #[serde(default = "default_true")]
    pub remote_signatures: bool,

    #[serde(default)]
    pub tokens: Vec<TokenSpec>,

    #[serde(default)]
    pub accounts: Vec<NamedAddress>,

    #[serde(default)]
    pub contracts: Vec<NamedAddress>,

    /// Roots scanned for compiled ABI artifacts
    #[serde(default)]
    pub abi_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: None,
            remote_signatures: true,
            tokens: Vec::new(),
            accounts: Vec::new(),
            contracts: Vec::new(),
            abi_paths: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl TokenSpec {
    pub fn display_symbol(&self) -> String {
        self.symbol
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| short_addr(&self.address))
    }

    pub fn to_known_token(&self) -> Option<KnownToken> {
        let address = parse_address(&self.address)?;
        let tag = self.display_symbol();
        let name = self
            .name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| tag.clone());
        let decimals = self.decimals.unwrap_or(DEFAULT_TOKEN_DECIMALS);
        let token = KnownToken::with_decimals(address, name, tag, decimals);
        if token.is_none() {
            warn!(address = %self.address, decimals, "skipping token: too many decimals");
        }
        token
    }
}

impl Config {
    /// Build the address book from config plus stored contact labels
    ///
    /// Entries with unparsable addresses are skipped with a warning.
    pub fn address_book(&self, contacts: &BTreeMap<String, String>) -> AddressBook {
        let mut book = AddressBook::new();
        for token in &self.tokens {
            if let Some(token) = token.to_known_token() {
                book.add_token(token);
            }
        }
        book.accounts = named_map(&self.accounts);
        book.contracts = named_map(&self.contracts);
        for (address, label) in contacts {
            if let Some(address) = parse_address(address) {
                book.contacts.insert(address, label.clone());
            }
        }
        book
    }

    /// Configured ABI roots, or the working directory if none are set
    pub fn abi_scan_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .abi_paths
            .iter()
            .filter_map(|raw| expand_path(raw))
            .collect();
        if roots.is_empty() {
            roots.push(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        }
        roots
    }
}

/// Load config from the first location that exists; defaults otherwise
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    load_from(&path)
}

pub fn load_from(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), "ignoring invalid config: {err}");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TXLENS_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("txlens").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("txlens").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "txlens", "txlens")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("txlens"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("txlens"));
    }
    directories::ProjectDirs::from("io", "txlens", "txlens")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn labels_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("labels.sqlite3"))
}

/// Expand `~/` and make relative paths absolute
pub fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}

/// Lowercase `0x`-prefixed form used as the label store key
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{}", payload.to_lowercase())
}

fn parse_address(raw: &str) -> Option<Address> {
    match normalize_address(raw).parse::<Address>() {
        Ok(address) => Some(address),
        Err(err) => {
            warn!(address = raw, "skipping invalid address: {err}");
            None
        }
    }
}

fn named_map(entries: &[NamedAddress]) -> std::collections::HashMap<Address, String> {
    entries
        .iter()
        .filter_map(|entry| Some((parse_address(&entry.address)?, entry.name.clone())))
        .collect()
}

fn short_addr(value: &str) -> String {
    let value = value.trim();
    if value.len() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}..{}", start, end)
}
