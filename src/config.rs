//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/tailor/tailor.toml`
//! 3. Local config: `<model_dir>/.tailor.toml` (directory of the model file)
//! 4. Environment variables: `TAILOR_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DisplayLabels;

/// Export output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportConfig {
    /// Pretty-print exported JSON
    pub pretty: bool,
    /// Directory for export files when no explicit output path is given
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Raw export config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawExportConfig {
    pub pretty: Option<bool>,
    pub output_dir: Option<PathBuf>,
}

impl ExportConfig {
    fn overlay(&self, raw: &RawExportConfig) -> Self {
        Self {
            pretty: raw.pretty.unwrap_or(self.pretty),
            output_dir: raw
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
        }
    }
}

/// Raw settings for intermediate parsing.
///
/// Arrays are `Option` to distinguish "not specified" from an explicit empty array.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub facet_types: Option<Vec<String>>,
    pub builtin_facets: Option<bool>,
    pub empty_label: Option<String>,
    pub none_label: Option<String>,
    pub parallel: Option<bool>,
    pub export: RawExportConfig,
}

/// Unified configuration for tailor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Tagged-value type names that become facets
    pub facet_types: Vec<String>,
    /// Include the built-in `Type` and `Metatype` facets
    pub builtin_facets: bool,
    /// Label for present but empty values
    pub empty_label: String,
    /// Label for absent facets
    pub none_label: String,
    /// Aggregate facets over sibling subtrees in parallel
    pub parallel: bool,
    pub export: ExportConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let labels = DisplayLabels::default();
        Self {
            facet_types: vec!["String".into(), "Enum".into()],
            builtin_facets: true,
            empty_label: labels.empty,
            none_label: labels.none,
            parallel: false,
            export: ExportConfig::default(),
        }
    }
}

/// Merge arrays with union semantics and negation support.
///
/// - Items from overlay are added to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are de-duplicated, base order is kept
///
/// # Examples
/// ```ignore
/// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
/// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let removed: HashSet<&str> = overlay.iter().filter_map(|p| p.strip_prefix('!')).collect();
    let mut seen = HashSet::new();
    base.iter()
        .chain(overlay.iter().filter(|p| !p.starts_with('!')))
        .filter(|item| !removed.contains(item.as_str()))
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}

/// Expand `~`, `$VAR` and `${VAR}`; unexpandable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Get the XDG config directory for tailor.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tailor").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("tailor.toml"))
}

/// Get the path to the local config file next to a model.
pub fn local_config_path(model_dir: &Path) -> PathBuf {
    model_dir.join(".tailor.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Labels for the empty and none categories.
    pub fn display_labels(&self) -> DisplayLabels {
        DisplayLabels {
            empty: self.empty_label.clone(),
            none: self.none_label.clone(),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.export.output_dir.to_string_lossy().as_ref());
        self.export.output_dir = PathBuf::from(expanded);
    }

    /// Overlay scalars; arrays are combined by `arrays`.
    fn overlay<F>(&self, raw: &RawSettings, arrays: F) -> Self
    where
        F: Fn(&[String], &[String]) -> Vec<String>,
    {
        Self {
            facet_types: raw
                .facet_types
                .as_ref()
                .map(|o| arrays(&self.facet_types, o))
                .unwrap_or_else(|| self.facet_types.clone()),
            builtin_facets: raw.builtin_facets.unwrap_or(self.builtin_facets),
            empty_label: raw
                .empty_label
                .clone()
                .unwrap_or_else(|| self.empty_label.clone()),
            none_label: raw
                .none_label
                .clone()
                .unwrap_or_else(|| self.none_label.clone()),
            parallel: raw.parallel.unwrap_or(self.parallel),
            export: self.export.overlay(&raw.export),
        }
    }

    /// Merge local config onto self with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        self.overlay(overlay, merge_array)
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        self.overlay(global, |_, global| global.to_vec())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `model_dir` - Optional directory of the model file, for local config
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!item` removal
    /// - Any → Env vars: REPLACE
    pub fn load(model_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), model_dir)
    }

    /// Same as [`load`](Self::load) with an explicit global config path.
    pub fn load_from(
        global_path: Option<&Path>,
        model_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = model_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply `TAILOR_*` environment variables as explicit overrides.
    ///
    /// Nested keys use `__` (`TAILOR_EXPORT__PRETTY`), lists are comma separated
    /// (`TAILOR_FACET_TYPES=Enum,RefGUID`).
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("TAILOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("facet_types"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<Vec<String>>("facet_types") {
            settings.facet_types = val;
        }
        if let Ok(val) = config.get_bool("builtin_facets") {
            settings.builtin_facets = val;
        }
        if let Ok(val) = config.get_string("empty_label") {
            settings.empty_label = val;
        }
        if let Ok(val) = config.get_string("none_label") {
            settings.none_label = val;
        }
        if let Ok(val) = config.get_bool("parallel") {
            settings.parallel = val;
        }
        if let Ok(val) = config.get_bool("export.pretty") {
            settings.export.pretty = val;
        }
        if let Ok(val) = config.get_string("export.output_dir") {
            settings.export.output_dir = PathBuf::from(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# tailor configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/tailor/tailor.toml  (defines your baseline)
#   Local:  <model_dir>/.tailor.toml      (model-specific additions)
#   Env:    TAILOR_* environment variables (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!item" in local config to REMOVE an inherited item:
#     facet_types = ["RefGUID", "!Enum"]  # adds RefGUID, removes Enum

# Tagged-value types that become facets
# facet_types = ["String", "Enum"]

# Include the built-in Type and Metatype facets
# builtin_facets = true

# Labels for empty values and missing facets
# empty_label = "<empty>"
# none_label = "<none>"

# Aggregate facets in parallel (large models)
# parallel = false

[export]
# Pretty-print exported JSON
# pretty = true

# Directory for export files (~ and $VAR are expanded)
# output_dir = "."
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
