//! Host configuration, read from a JSON file.
//!
//! Every field is optional:
//!
//! ```json
//! {
//!   "max_pages": 256,
//!   "heap_start": 1048576,
//!   "random": { "source": "seeded", "seed": 42 },
//!   "entries": ["main"],
//!   "frames": 60,
//!   "resume_entry": "resume"
//! }
//! ```

use std::path::Path;

use runtime_shim::WASM_PAGE;
use serde::Deserialize;

use crate::error::HostError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Upper bound on guest linear memory, in pages.
    pub max_pages: Option<u32>,
    /// First heap address; defaults to the end of committed memory.
    pub heap_start: Option<u32>,
    pub random: RandomConfig,
    /// Exports called once, in order, after instantiation.
    pub entries: Vec<String>,
    /// How many times to call `resume_entry` after the entries.
    pub frames: u32,
    pub resume_entry: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_pages: None,
            heap_start: None,
            random: RandomConfig::default(),
            entries: vec!["main".to_owned()],
            frames: 0,
            resume_entry: "resume".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRandomConfig")]
pub enum RandomConfig {
    /// Operating-system CSPRNG.
    #[default]
    Os,
    /// Deterministic stream for reproducible runs.
    Seeded { seed: u64 },
}

/// The `random` object as written; `seed` is only valid with `seeded`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRandomConfig {
    source: RandomSourceKind,
    seed: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum RandomSourceKind {
    Os,
    Seeded,
}

impl TryFrom<RawRandomConfig> for RandomConfig {
    type Error = &'static str;

    fn try_from(raw: RawRandomConfig) -> Result<Self, Self::Error> {
        match (raw.source, raw.seed) {
            (RandomSourceKind::Os, None) => Ok(RandomConfig::Os),
            (RandomSourceKind::Os, Some(_)) => Err("`seed` only applies to the `seeded` source"),
            (RandomSourceKind::Seeded, Some(seed)) => Ok(RandomConfig::Seeded { seed }),
            (RandomSourceKind::Seeded, None) => Err("the `seeded` source needs a `seed`"),
        }
    }
}

impl HostConfig {
    pub fn from_json(text: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, HostError> {
        let text = std::fs::read_to_string(path).map_err(|source| HostError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn max_memory_bytes(&self) -> Option<usize> {
        self.max_pages
            .map(|pages| (pages as usize).saturating_mul(WASM_PAGE))
    }
}
