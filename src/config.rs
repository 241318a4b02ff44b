use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "docchat";

pub const ENV_BASE_URL: &str = "DOCCHAT_BASE_URL";
pub const ENV_MAX_TOKENS: &str = "DOCCHAT_MAX_TOKENS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub generate_path: String,
    pub upload_path: String,
    pub max_tokens: Option<u32>,
    /// Write the fields of a failed upload's body into the attachment store,
    /// the way a successful upload does.
    pub keep_fields_on_failed_upload: bool,
    /// Visible rows of the input before it starts scrolling.
    pub input_max_rows: usize,
    pub open_session_on_start: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            generate_path: "/generate".to_string(),
            upload_path: "/upload_file".to_string(),
            max_tokens: None,
            keep_fields_on_failed_upload: true,
            input_max_rows: 5,
            open_session_on_start: true,
        }
    }
}

impl ClientConfig {
    /// Read the JSON file at `path` if one is given, then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.base_url()?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|s| !s.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_MAX_TOKENS).filter(|s| !s.trim().is_empty()) {
            let max_tokens = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("{} must be a positive integer, got {:?}", ENV_MAX_TOKENS, raw))?;
            self.max_tokens = Some(max_tokens);
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("Invalid base URL {:?}", self.base_url))
    }

    /// Resolve an endpoint path under the base URL, keeping any path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.base_url()?;
        if !base.path().ends_with('/') {
            let prefix = format!("{}/", base.path());
            base.set_path(&prefix);
        }
        base.join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid endpoint path {:?}", path))
    }
}
