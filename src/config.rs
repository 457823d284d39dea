//! Optional YAML configuration.
//!
//! ```yaml
//! aliases:
//!   Store: StoreName
//!   Qty Sold: SoldQty
//! limits:
//!   alerts: 25
//! ```
//!
//! `aliases` renames upload headers to inventory column names before the
//! header is validated. `limits` overrides the selector bounds; omitted keys
//! keep their defaults.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::rank::SelectorLimits;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PulseConfig {
    pub aliases: BTreeMap<String, String>,
    pub limits: SelectorLimits,
}

impl PulseConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: PulseConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config file {path:?}"))?;
        debug!(
            "Loaded config with {} header alias(es) from {path:?}",
            config.aliases.len()
        );
        Ok(config)
    }

    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
