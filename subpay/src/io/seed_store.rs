//! Seed load/save helpers with schema + invariant validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::invariants::validate_invariants;
use crate::core::types::{Plan, Strategy, TimelineEntry};
use crate::io::config::DemoConfig;
use crate::state::{DemoState, seed_state};

pub const SEED_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/seed/v1.schema.json"
));

/// On-disk seed: the three collections, without session flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    pub plans: Vec<Plan>,
    pub strategies: Vec<Strategy>,
    pub timeline: Vec<TimelineEntry>,
}

impl SeedFile {
    pub fn from_state(state: &DemoState) -> Self {
        Self {
            plans: state.plans.clone(),
            strategies: state.strategies.clone(),
            timeline: state.timeline.clone(),
        }
    }

    /// Fresh session state holding this seed's data.
    pub fn into_state(self) -> DemoState {
        DemoState {
            plans: self.plans,
            strategies: self.strategies,
            timeline: self.timeline,
            ..DemoState::empty()
        }
    }
}

/// Parse and validate seed JSON: schema conformance + semantic invariants.
pub fn parse_seed(raw: &str) -> Result<SeedFile> {
    let value: Value = serde_json::from_str(raw).context("parse seed json")?;
    validate_schema(&value)?;
    let seed: SeedFile = serde_json::from_value(value).context("deserialize seed")?;
    let errors = validate_invariants(&seed.clone().into_state());
    if !errors.is_empty() {
        return Err(anyhow!("seed invariants failed: {}", errors.join("; ")));
    }
    Ok(seed)
}

/// Load and validate a seed file from disk.
pub fn load_seed(path: &Path) -> Result<SeedFile> {
    debug!(path = %path.display(), "loading seed");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read seed {}", path.display()))?;
    parse_seed(&contents).with_context(|| format!("validate seed {}", path.display()))
}

/// Write a seed file as pretty JSON with trailing newline.
pub fn write_seed(path: &Path, seed: &SeedFile) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(seed).context("serialize seed")?;
    buf.push('\n');
    fs::write(path, buf).with_context(|| format!("write seed {}", path.display()))
}

/// Initial session state for `config`: its seed file if set, else the built-in
/// seed, with flags taken from the config.
pub fn initial_state(config: &DemoConfig) -> Result<DemoState> {
    let mut state = match &config.seed_path {
        Some(path) => load_seed(path)?.into_state(),
        None => seed_state(),
    };
    state.demo_mode = config.demo_mode;
    state.network_env = config.network_env;
    Ok(state)
}

fn validate_schema(seed: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(SEED_SCHEMA).context("parse seed schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(seed) {
        let messages = compiled
            .iter_errors(seed)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "seed schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}
