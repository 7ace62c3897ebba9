//! Service configuration: built-in defaults, then an optional YAML file,
//! then environment overrides.

use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use streamhook_core::{BridgeConfig, CampaignTokens};

pub const CONFIG_PATH_ENV: &str = "STREAMHOOK_CONFIG";

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub shared_secret: String,
    pub campaigns: CampaignTokens,
    pub allowed_origins: Vec<String>,
    pub streamlabs_base_url: Option<String>,
    pub upstream_timeout_secs: Option<u64>,
    pub bind: SocketAddr,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            shared_secret: String::new(),
            campaigns: CampaignTokens::new(),
            allowed_origins: Vec::new(),
            streamlabs_base_url: None,
            upstream_timeout_secs: None,
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("shared_secret", &"<redacted>")
            .field("campaigns", &self.campaigns.campaigns().collect::<Vec<_>>())
            .field("allowed_origins", &self.allowed_origins)
            .field("streamlabs_base_url", &self.streamlabs_base_url)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("bind", &self.bind)
            .finish()
    }
}

impl ServiceConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_file(Path::new(path.trim()))?,
            None => Self::default(),
        };
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read streamhook config {}", path.display()))?;
        serde_yaml_bw::from_str(&raw)
            .with_context(|| format!("parse streamhook config {}", path.display()))
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("RAISELY_SHARED_SECRET") {
            self.shared_secret = secret;
        }
        if let Some(pairs) = lookup("CAMPAIGN_TOKENS") {
            let parsed = CampaignTokens::parse_pairs(&pairs).map_err(|segment| {
                anyhow::anyhow!("invalid CAMPAIGN_TOKENS entry `{segment}`; expected uuid=token")
            })?;
            for campaign in parsed.campaigns() {
                if let Some(token) = parsed.token_for(campaign) {
                    self.campaigns.insert(campaign, token);
                }
            }
        }
        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            self.allowed_origins = split_list(&origins);
        }
        if let Some(base) = lookup("STREAMLABS_API_BASE") {
            self.streamlabs_base_url = Some(base);
        }
        if let Some(secs) = lookup("STREAMLABS_TIMEOUT_SECS") {
            let secs = secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid STREAMLABS_TIMEOUT_SECS `{secs}`"))?;
            self.upstream_timeout_secs = Some(secs);
        }
        if let Some(bind) = lookup("BIND") {
            self.bind = bind
                .trim()
                .parse()
                .with_context(|| format!("invalid BIND address `{bind}`"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.shared_secret.is_empty() {
            bail!("shared secret is required (RAISELY_SHARED_SECRET or shared_secret)");
        }
        if self.campaigns.is_empty() {
            tracing::warn!("no campaigns configured; every webhook will be rejected");
        }
        if self.allowed_origins.is_empty() {
            tracing::warn!("no CORS origins configured; browser-fired actions will be blocked");
        }
        Ok(())
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            shared_secret: self.shared_secret.clone(),
            campaigns: self.campaigns.clone(),
        }
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
