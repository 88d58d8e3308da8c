//! Tool configuration management.
//!
//! Provides configuration loading from an optional `chanops.yml`, plus the
//! global verbose flag used for debug output.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

use serde::Deserialize;

// Global verbose flag for controlling debug output
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set the global verbose flag. When true, debug messages will be printed.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

/// Check if verbose mode is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Print a message to stderr only if verbose mode is enabled.
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if $crate::config::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Canonical list of candidate config file names we search for on disk.
const CONFIG_FILENAMES: &[&str] = &["chanops.yml", "chanops.yaml"];

/// Complete configuration file structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ToolConfig {
    pub defaults: ToolDefaults,
}

/// Default behavior knobs users may want to adjust.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolDefaults {
    /// Clamp channels back into [0,1] after every operation
    pub auto_clamp: bool,

    /// Pixel count above which channel operations run in parallel
    pub parallel_threshold_pixels: usize,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            auto_clamp: true,
            parallel_threshold_pixels: 100_000,
        }
    }
}

impl ToolConfig {
    fn sanitize(mut self) -> Self {
        // A zero threshold would divide work into empty chunks
        if self.defaults.parallel_threshold_pixels == 0 {
            self.defaults.parallel_threshold_pixels = 1;
        }
        self
    }
}

/// Public handle that stores the loaded configuration, its source path, and warnings.
pub struct ToolConfigHandle {
    pub config: ToolConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl ToolConfigHandle {
    fn with_config(config: ToolConfig, source: Option<PathBuf>, warnings: Vec<String>) -> Self {
        Self {
            config,
            source,
            warnings,
        }
    }
}

/// Load configuration from disk, optionally forcing a specific path.
pub fn load_config(custom_path: Option<&Path>) -> ToolConfigHandle {
    let mut warnings = Vec::new();
    let candidates = get_config_candidates(custom_path);

    for candidate in candidates {
        if !candidate.exists() || !candidate.is_file() {
            continue;
        }

        match fs::read_to_string(&candidate) {
            Ok(contents) => match serde_yaml::from_str::<ToolConfig>(&contents) {
                Ok(config) => {
                    let sanitized = config.sanitize();
                    let source = fs::canonicalize(&candidate).unwrap_or(candidate);
                    return ToolConfigHandle::with_config(sanitized, Some(source), warnings);
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse config {}: {}",
                    candidate.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read config {}: {}",
                candidate.display(),
                err
            )),
        }
    }

    warnings.push("No config found; using built-in defaults.".to_string());
    ToolConfigHandle::with_config(ToolConfig::default(), None, warnings)
}

/// Get list of config file candidates to try
fn get_config_candidates(custom_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = custom_path {
        candidates.push(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var("CHANOPS_CONFIG") {
        candidates.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(cwd.join("config").join(name));
            candidates.push(cwd.join(name));
        }
    }

    if let Some(home_dir) = dirs::home_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(home_dir.join("chanops").join(name));
        }
    }

    candidates
}

static CONFIG_HANDLE: OnceLock<ToolConfigHandle> = OnceLock::new();
static PRINT_CONFIG_ONCE: Once = Once::new();

/// Access the global configuration (loaded once per process).
pub fn config_handle() -> &'static ToolConfigHandle {
    CONFIG_HANDLE.get_or_init(|| load_config(None))
}

/// Print config source and warnings the first time it is requested (only in verbose mode).
pub fn log_config_usage() {
    PRINT_CONFIG_ONCE.call_once(|| {
        if !is_verbose() {
            return;
        }
        let handle = config_handle();
        if let Some(source) = &handle.source {
            eprintln!("[chanops] Loaded config from {}", source.display());
        } else {
            eprintln!("[chanops] Using built-in defaults");
        }

        for warning in &handle.warnings {
            eprintln!("[chanops] Config warning: {}", warning);
        }
    });
}

/// Configured default for post-operation clamping.
pub fn default_auto_clamp() -> bool {
    config_handle().config.defaults.auto_clamp
}

/// Pixel count above which per-channel work is parallelized.
pub fn parallel_threshold() -> usize {
    config_handle().config.defaults.parallel_threshold_pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_clamp_by_default() {
        let config = ToolConfig::default();
        assert!(config.defaults.auto_clamp);
        assert_eq!(config.defaults.parallel_threshold_pixels, 100_000);
    }

    #[test]
    fn test_sanitize_rejects_zero_threshold() {
        let config: ToolConfig =
            serde_yaml::from_str("defaults:\n  parallel_threshold_pixels: 0\n").unwrap();
        let sanitized = config.sanitize();
        assert_eq!(sanitized.defaults.parallel_threshold_pixels, 1);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config: ToolConfig = serde_yaml::from_str("defaults:\n  auto_clamp: false\n").unwrap();
        assert!(!config.defaults.auto_clamp);
        assert_eq!(config.defaults.parallel_threshold_pixels, 100_000);
    }
}
