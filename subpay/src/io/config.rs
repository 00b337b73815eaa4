//! Demo configuration (`subpay.toml`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::coverage::CoverageFormula;
use crate::core::types::NetworkEnv;

/// Demo configuration (TOML).
///
/// Intended to be edited by humans. Missing fields default to the values the
/// demo ships with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DemoConfig {
    /// Initial value of the store's `demo_mode` flag (shorter simulated delays).
    pub demo_mode: bool,

    /// Initial network environment for explorer links.
    pub network_env: NetworkEnv,

    /// Optional JSON seed file replacing the built-in seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_path: Option<PathBuf>,

    pub delays: DelayConfig,
    pub explorer: ExplorerConfig,
    pub coverage: CoverageConfig,
}

/// A workflow step that waits before applying its mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedStep {
    Connect,
    CreatePlan,
    TopUp,
    Allocate,
    Pay,
}

/// Simulated processing delays, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DelayConfig {
    /// Delays used while `demo_mode` is on.
    pub demo: StepDelays,
    /// Delays used while `demo_mode` is off.
    pub live: StepDelays,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StepDelays {
    pub connect_ms: u64,
    pub create_plan_ms: u64,
    pub top_up_ms: u64,
    pub allocate_ms: u64,
    pub pay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExplorerConfig {
    pub testnet_url: String,
    pub mainnet_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CoverageConfig {
    pub formula: CoverageFormula,
}

impl Default for StepDelays {
    fn default() -> Self {
        Self {
            connect_ms: 1_000,
            create_plan_ms: 1_000,
            top_up_ms: 1_500,
            allocate_ms: 1_500,
            pay_ms: 1_500,
        }
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            demo: StepDelays::default(),
            live: StepDelays {
                connect_ms: 1_000,
                create_plan_ms: 2_000,
                top_up_ms: 3_000,
                allocate_ms: 3_000,
                pay_ms: 3_000,
            },
        }
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            testnet_url: "https://testnet.flowscan.io".to_string(),
            mainnet_url: "https://flowscan.io".to_string(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            demo_mode: true,
            network_env: NetworkEnv::Testnet,
            seed_path: None,
            delays: DelayConfig::default(),
            explorer: ExplorerConfig::default(),
            coverage: CoverageConfig::default(),
        }
    }
}

/// Upper bound for any single simulated delay.
const MAX_DELAY_MS: u64 = 60_000;

impl StepDelays {
    fn get(&self, step: SimulatedStep) -> u64 {
        match step {
            SimulatedStep::Connect => self.connect_ms,
            SimulatedStep::CreatePlan => self.create_plan_ms,
            SimulatedStep::TopUp => self.top_up_ms,
            SimulatedStep::Allocate => self.allocate_ms,
            SimulatedStep::Pay => self.pay_ms,
        }
    }

    fn all(&self) -> [(&'static str, u64); 5] {
        [
            ("connect_ms", self.connect_ms),
            ("create_plan_ms", self.create_plan_ms),
            ("top_up_ms", self.top_up_ms),
            ("allocate_ms", self.allocate_ms),
            ("pay_ms", self.pay_ms),
        ]
    }
}

impl DelayConfig {
    /// Delay for `step` under the current `demo_mode` flag.
    pub fn delay_for(&self, step: SimulatedStep, demo_mode: bool) -> Duration {
        let delays = if demo_mode { &self.demo } else { &self.live };
        Duration::from_millis(delays.get(step))
    }
}

impl ExplorerConfig {
    /// Explorer URL for a transaction hash on `env`.
    pub fn tx_url(&self, env: NetworkEnv, tx_hash: &str) -> String {
        let base = match env {
            NetworkEnv::Testnet => &self.testnet_url,
            NetworkEnv::Mainnet => &self.mainnet_url,
        };
        format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash)
    }
}

impl DemoConfig {
    pub fn validate(&self) -> Result<()> {
        for (mode, delays) in [("demo", &self.delays.demo), ("live", &self.delays.live)] {
            for (name, value) in delays.all() {
                if value > MAX_DELAY_MS {
                    return Err(anyhow!(
                        "delays.{}.{} must be <= {} (got {})",
                        mode,
                        name,
                        MAX_DELAY_MS,
                        value
                    ));
                }
            }
        }
        for (name, url) in [
            ("explorer.testnet_url", &self.explorer.testnet_url),
            ("explorer.mainnet_url", &self.explorer.mainnet_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("{} must be an http(s) URL", name));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `DemoConfig::default()`.
pub fn load_config(path: &Path) -> Result<DemoConfig> {
    if !path.exists() {
        let cfg = DemoConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DemoConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &DemoConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
