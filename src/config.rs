use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::content::defaults;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Hosted backend; absent means local-only operation
  pub remote: Option<RemoteConfig>,
  #[serde(default)]
  pub auth: AuthConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub contact: ContactConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  /// Project URL, e.g. https://abcd.supabase.co
  pub url: String,
  /// Edge function invoked after each inquiry (e.g. "send-inquiry-email")
  pub notify_function: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
  /// Credentials verified by the remote auth service
  #[default]
  Remote,
  /// Single fixed credential, for demos and local development
  Demo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
  #[serde(default)]
  pub mode: AuthMode,
  /// Login email accepted in demo mode (case-insensitive)
  #[serde(default, deserialize_with = "deserialize_lowercase")]
  pub demo_email: Option<String>,
}

fn deserialize_lowercase<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let v: Option<String> = Option::deserialize(deserializer)?;
  Ok(v.map(|s| s.trim().to_lowercase()))
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
  #[default]
  Sqlite,
  /// Nothing survives the process; useful for trying things out
  Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default)]
  pub backend: CacheBackend,
  /// Prefix separating this site's data from anything else in the store
  #[serde(default = "default_namespace")]
  pub namespace: String,
  /// Database file (defaults to the data directory)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      backend: CacheBackend::default(),
      namespace: default_namespace(),
      path: None,
    }
  }
}

fn default_namespace() -> String {
  "studiosync".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactConfig {
  /// Number offered for direct WhatsApp contact when a submission fails
  #[serde(default = "default_whatsapp")]
  pub whatsapp_number: String,
}

impl Default for ContactConfig {
  fn default() -> Self {
    Self {
      whatsapp_number: default_whatsapp(),
    }
  }
}

fn default_whatsapp() -> String {
  defaults::WHATSAPP_NUMBER.to_string()
}

/// Directory for the cache database and logs.
pub fn data_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("studiosync"))
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./studiosync.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/studiosync/config.yaml
  ///
  /// Without a file the built-in defaults apply: no remote, SQLite cache.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => {
        tracing::info!("no config file found, running local-only");
        Ok(Self::default())
      }
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("studiosync.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("studiosync").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;

    if config.auth.mode == AuthMode::Demo && config.auth.demo_email.is_none() {
      return Err(eyre!("auth.mode is demo but auth.demo_email is not set"));
    }

    Ok(config)
  }

  /// Get the backend's public API key from environment variables.
  ///
  /// Checks STUDIOSYNC_ANON_KEY first, then SUPABASE_ANON_KEY as fallback.
  pub fn get_anon_key() -> Result<String> {
    std::env::var("STUDIOSYNC_ANON_KEY")
      .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
      .map_err(|_| {
        eyre!("Remote API key not found. Set STUDIOSYNC_ANON_KEY or SUPABASE_ANON_KEY.")
      })
  }

  /// Get the demo login password from environment variables.
  pub fn get_demo_password() -> Result<String> {
    std::env::var("STUDIOSYNC_DEMO_PASSWORD")
      .map_err(|_| eyre!("Demo password not found. Set STUDIOSYNC_DEMO_PASSWORD."))
  }

  /// Admin password for non-interactive login, if provided.
  pub fn get_admin_password() -> Option<String> {
    std::env::var("STUDIOSYNC_ADMIN_PASSWORD").ok()
  }
}
