use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Global configuration loaded from `~/.config/dsus/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsusConfig {
    /// Root directory every upload destination is resolved under.
    pub upload_root: PathBuf,
    /// Maximum age in seconds of a .changes file before uploads against it expire.
    pub time_window_secs: u64,
    /// Keyrings handed to gpgv when checking signatures.
    #[serde(default)]
    pub keyrings: Vec<PathBuf>,
    /// Program used to validate binary packages.
    #[serde(default = "default_dpkg_deb")]
    pub dpkg_deb: String,
    /// Program used to verify signatures.
    #[serde(default = "default_gpgv")]
    pub gpgv: String,
}

fn default_dpkg_deb() -> String {
    "dpkg-deb".to_string()
}

fn default_gpgv() -> String {
    "gpgv".to_string()
}

impl Default for DsusConfig {
    fn default() -> Self {
        Self {
            upload_root: PathBuf::from("/srv/dsus/upload"),
            time_window_secs: 3600,
            keyrings: Vec::new(),
            dpkg_deb: default_dpkg_deb(),
            gpgv: default_gpgv(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dsus")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DsusConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DsusConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<DsusConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: DsusConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
