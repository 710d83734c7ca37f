use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `TAGMIRROR__`) on top, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TAGMIRROR")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self
            .scan
            .extensions
            .iter()
            .all(|e| e.trim().trim_start_matches('.').is_empty())
        {
            return Err("scan.extensions must name at least one extension".to_string());
        }
        if self.sync.fields.is_empty() {
            return Err("sync.fields must not be empty".to_string());
        }
        if self.transcode.program.trim().is_empty() {
            return Err("transcode.program must not be empty".to_string());
        }
        for placeholder in ["{input}", "{output}"] {
            if !self.transcode.args.iter().any(|a| a.contains(placeholder)) {
                return Err(format!("transcode.args must contain {placeholder}"));
            }
        }
        if self
            .transcode
            .target_extension
            .trim()
            .trim_start_matches('.')
            .is_empty()
        {
            return Err("transcode.target_extension must not be empty".to_string());
        }
        if self.transcode.timeout_secs == 0 {
            return Err("transcode.timeout_secs must be >= 1".to_string());
        }
        Ok(())
    }

    /// Directory where index caches live: `cache.dir` when set, else the XDG default.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .dir
            .clone()
            .or_else(default_cache_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Resolve the config path from `TAGMIRROR_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TAGMIRROR_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/tagmirror/config.toml`
/// or `~/.config/tagmirror/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("tagmirror").join("config.toml"))
}

/// `$XDG_CACHE_HOME/tagmirror` or `~/.cache/tagmirror`.
pub fn default_cache_dir() -> Option<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache").map(|d| d.join("tagmirror"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
