//! Slow and fast request ledgers.
//!
//! Two JSON files, rewritten after every request, each keeping one entry
//! per `METHOD url` with the latest latency and how often it was seen.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SLOW_FILE: &str = "slow_apis.json";
pub const FAST_FILE: &str = "fast_apis.json";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: String,
    pub method: String,
    pub url: String,
    pub last_ms: u64,
    pub first_seen: String,
    pub last_seen: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct LatencyLedger {
    dir: PathBuf,
    threshold_ms: u64,
}

impl LatencyLedger {
    pub fn new(dir: impl Into<PathBuf>, threshold_ms: u64) -> Self {
        Self {
            dir: dir.into(),
            threshold_ms,
        }
    }

    pub fn slow_path(&self) -> PathBuf {
        self.dir.join(SLOW_FILE)
    }

    pub fn fast_path(&self) -> PathBuf {
        self.dir.join(FAST_FILE)
    }

    /// Start both ledgers over as empty arrays.
    pub fn reset(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.slow_path(), "[]")?;
        fs::write(self.fast_path(), "[]")
    }

    pub fn record(&self, method: &str, url: &str, ms: u64) -> io::Result<()> {
        let now = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.record_at(method, url, ms, &now)
    }

    /// A request exactly at the threshold lands in both files.
    pub fn record_at(&self, method: &str, url: &str, ms: u64, now: &str) -> io::Result<()> {
        if ms >= self.threshold_ms {
            upsert(&self.slow_path(), method, url, ms, now)?;
        }
        if ms <= self.threshold_ms {
            upsert(&self.fast_path(), method, url, ms, now)?;
        }
        Ok(())
    }
}

pub fn read_entries(path: &Path) -> Vec<LedgerEntry> {
    fs::read_to_string(path)
        .ok()
        .and_then(|text| {
            if text.trim().is_empty() {
                Some(Vec::new())
            } else {
                serde_json::from_str(&text).ok()
            }
        })
        .unwrap_or_default()
}

fn upsert(path: &Path, method: &str, url: &str, ms: u64, now: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let method = method.to_ascii_uppercase();
    let key = format!("{method} {url}");
    let mut entries = read_entries(path);
    match entries.iter_mut().find(|entry| entry.key == key) {
        Some(entry) => {
            entry.last_ms = ms;
            entry.last_seen = now.to_string();
            entry.count += 1;
        }
        None => entries.push(LedgerEntry {
            key,
            method,
            url: url.to_string(),
            last_ms: ms,
            first_seen: now.to_string(),
            last_seen: now.to_string(),
            count: 1,
        }),
    }
    let payload = serde_json::to_string_pretty(&entries).map_err(io::Error::other)?;
    fs::write(path, payload)
}
