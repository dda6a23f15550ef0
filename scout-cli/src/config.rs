//! Config-directory handling, `.env` loading, and first-run bootstrap.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Key in `.env` holding the backend base URL.
pub const BASE_URL_KEY: &str = "baseURL";
/// Shipped placeholder value; means the server address was never configured.
pub const BASE_URL_PLACEHOLDER: &str = "SCOUT_SERVER";

const CONFIG_DIR: &str = ".scout-client";
const ENV_ASSET_URL: &str = "https://raw.githubusercontent.com/scout-recon/scout/main/.env";
const STRUCTURE_ASSET_URL: &str =
    "https://raw.githubusercontent.com/scout-recon/scout/main/structure.json";

/// Locations of the per-user configuration assets.
pub struct ConfigPaths {
    pub dir: PathBuf,
    pub env_file: PathBuf,
    pub structure_file: PathBuf,
}

impl ConfigPaths {
    /// # Errors
    ///
    /// Fails when the home directory cannot be determined.
    pub fn locate() -> Result<Self> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let dir = home.join(CONFIG_DIR);
        Ok(Self {
            env_file: dir.join(".env"),
            structure_file: dir.join("structure.json"),
            dir,
        })
    }
}

/// Create the config directory and download the two configuration assets.
///
/// # Errors
///
/// Fails when the directory cannot be created or a download fails; the
/// caller reports the error and exits gracefully.
pub fn bootstrap(paths: &ConfigPaths) -> Result<()> {
    fs::create_dir_all(&paths.dir)
        .with_context(|| format!("failed to create {}", paths.dir.display()))?;
    download(ENV_ASSET_URL, &paths.env_file)?;
    download(STRUCTURE_ASSET_URL, &paths.structure_file)?;
    Ok(())
}

fn download(url: &str, dest: &Path) -> Result<()> {
    tracing::info!(url, dest = %dest.display(), "downloading configuration asset");
    let resp = reqwest::blocking::get(url)
        .with_context(|| format!("failed to download {url}"))?
        .error_for_status()
        .with_context(|| format!("failed to download {url}"))?;
    let body = resp
        .text()
        .with_context(|| format!("failed to read response from {url}"))?;
    fs::write(dest, body).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
}

/// Read and parse the flat `KEY=VALUE` env file.
///
/// # Errors
///
/// Fails when the file cannot be read (usually: `scout init` never ran).
pub fn load_env(paths: &ConfigPaths) -> Result<HashMap<String, String>> {
    let text = fs::read_to_string(&paths.env_file).with_context(|| {
        format!(
            "failed to read {} (run `scout init` first)",
            paths.env_file.display()
        )
    })?;
    Ok(parse_env(&text))
}

/// Blank lines and `#` comments are skipped; values keep embedded `=` and
/// lose surrounding double quotes.
fn parse_env(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(
                key.trim().to_string(),
                value.trim().trim_matches('"').to_string(),
            );
        }
    }
    map
}
