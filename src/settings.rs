//! Configuration management for gaussvib.
//!
//! Settings are read from INI files with the following precedence:
//!
//! 1. Local configuration (`./gaussvib_config.cfg`)
//! 2. User configuration (`~/.config/gaussvib/gaussvib_config.cfg`)
//! 3. System configuration (`/etc/gaussvib/gaussvib_config.cfg`)
//! 4. Built-in defaults
//!
//! # Configuration File Format
//!
//! ```ini
//! [hamiltonian]
//! num_modals = 2
//! truncation_order = 3
//! threshold = 1e-6
//! normalize = true
//!
//! [output]
//! format = text
//! json_file =
//!
//! [logging]
//! level = info
//! file_logging = false
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use gaussvib::settings::SettingsManager;
//!
//! let settings = SettingsManager::load().unwrap();
//! println!("modals per mode: {}", settings.hamiltonian().num_modals);
//! ```

use configparser::ini::Ini;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in each location.
pub const CONFIG_FILE_NAME: &str = "gaussvib_config.cfg";

/// Errors that can occur during configuration loading and processing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error when reading configuration files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// INI parsing error
    #[error("INI parsing error: {0}")]
    IniParse(String),
    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Main configuration structure containing all program settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Hamiltonian construction parameters
    pub hamiltonian: HamiltonianSettings,
    /// Output settings
    pub output: OutputSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Parameters of the harmonic-basis Hamiltonian.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HamiltonianSettings {
    /// Basis functions per mode (default: 2)
    pub num_modals: usize,
    /// Highest number of coupled modes kept, 1 to 3 (default: 3)
    pub truncation_order: usize,
    /// Matrix elements at or below this magnitude are dropped (default: 1e-6)
    pub threshold: f64,
    /// Divide force constants by the index multinomial (default: true)
    pub normalize: bool,
}

impl Default for HamiltonianSettings {
    fn default() -> Self {
        Self {
            num_modals: 2,
            truncation_order: 3,
            threshold: 1e-6,
            normalize: true,
        }
    }
}

/// How harmonic terms are reported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table on stdout
    Text,
    /// JSON on stdout (or to `json_file`)
    Json,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSettings {
    /// Output format (default: text)
    pub format: OutputFormat,
    /// Optional file to receive the JSON export
    pub json_file: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            json_file: None,
        }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level (default: "info")
    pub level: String,
    /// Write log records to gaussvib_debug_<log_stem>.log instead of stdout (default: false)
    pub file_logging: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
        }
    }
}

type Section = HashMap<String, Option<String>>;

fn parse_value<T: std::str::FromStr>(section: &Section, key: &str) -> Result<Option<T>, ConfigError> {
    match section.get(key) {
        Some(Some(raw)) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(format!("Invalid {}: {}", key, raw))),
        _ => Ok(None),
    }
}

/// Configuration manager that handles loading and accessing program settings.
pub struct SettingsManager {
    settings: Settings,
    config_source: String,
}

impl SettingsManager {
    /// Loads configuration from the available configuration files.
    ///
    /// A file that fails to parse is skipped with a warning; the next lower
    /// precedence level stays in effect.
    pub fn load() -> Result<Self, ConfigError> {
        let (settings, source) = Self::load_from_files()?;
        info!("Configuration loaded from: {}", source);
        Ok(Self {
            settings,
            config_source: source,
        })
    }

    /// Wraps already-built settings, e.g. defaults when no file is wanted.
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            settings,
            config_source: "built-in defaults".to_string(),
        }
    }

    /// Returns the source of the loaded configuration.
    pub fn config_source(&self) -> &str {
        &self.config_source
    }

    /// Gets a reference to the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Gets the Hamiltonian settings.
    pub fn hamiltonian(&self) -> &HamiltonianSettings {
        &self.settings.hamiltonian
    }

    /// Gets the output settings.
    pub fn output(&self) -> &OutputSettings {
        &self.settings.output
    }

    /// Gets the logging settings.
    pub fn logging(&self) -> &LoggingSettings {
        &self.settings.logging
    }

    fn load_from_files() -> Result<(Settings, String), ConfigError> {
        let mut settings = Settings::default();
        let mut config_source = "built-in defaults".to_string();

        let candidates = [
            ("system", Self::get_system_config_path()),
            ("user", Self::get_user_config_path()),
            ("local", Some(PathBuf::from(CONFIG_FILE_NAME))),
        ];

        // later entries override earlier ones
        for (label, path) in candidates {
            let path = match path {
                Some(path) if path.exists() => path,
                _ => continue,
            };
            match Self::load_config(&path, &settings) {
                Ok(loaded) => {
                    settings = loaded;
                    config_source = format!("{} config ({})", label, path.display());
                    debug!("Loaded {} configuration from: {}", label, path.display());
                }
                Err(e) => {
                    warn!(
                        "Failed to load {} config from {}: {}",
                        label,
                        path.display(),
                        e
                    );
                }
            }
        }

        Ok((settings, config_source))
    }

    /// Loads one INI file on top of `base`; keys absent from the file keep
    /// their value from `base`.
    pub fn load_config(path: &Path, base: &Settings) -> Result<Settings, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_config(&content, base)
    }

    /// Parses INI text on top of `base`.
    pub fn parse_config(content: &str, base: &Settings) -> Result<Settings, ConfigError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|e| ConfigError::IniParse(format!("Failed to parse INI: {}", e)))?;

        let mut settings = base.clone();
        let map = ini.get_map_ref();

        if let Some(section) = map.get("hamiltonian") {
            Self::parse_hamiltonian(section, &mut settings.hamiltonian)?;
        }
        if let Some(section) = map.get("output") {
            Self::parse_output(section, &mut settings.output)?;
        }
        if let Some(section) = map.get("logging") {
            Self::parse_logging(section, &mut settings.logging)?;
        }

        Ok(settings)
    }

    fn parse_hamiltonian(section: &Section, hamiltonian: &mut HamiltonianSettings) -> Result<(), ConfigError> {
        if let Some(num_modals) = parse_value(section, "num_modals")? {
            hamiltonian.num_modals = num_modals;
        }
        if let Some(order) = parse_value::<usize>(section, "truncation_order")? {
            if !(1..=3).contains(&order) {
                return Err(ConfigError::InvalidValue(format!(
                    "truncation_order must be 1, 2 or 3, got {}",
                    order
                )));
            }
            hamiltonian.truncation_order = order;
        }
        if let Some(threshold) = parse_value::<f64>(section, "threshold")? {
            if threshold < 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "threshold must be non-negative, got {}",
                    threshold
                )));
            }
            hamiltonian.threshold = threshold;
        }
        if let Some(normalize) = parse_value(section, "normalize")? {
            hamiltonian.normalize = normalize;
        }
        Ok(())
    }

    fn parse_output(section: &Section, output: &mut OutputSettings) -> Result<(), ConfigError> {
        if let Some(Some(format)) = section.get("format") {
            output.format = match format.trim().to_lowercase().as_str() {
                "text" => OutputFormat::Text,
                "json" => OutputFormat::Json,
                other => {
                    return Err(ConfigError::InvalidValue(format!(
                        "Invalid output format: {}",
                        other
                    )))
                }
            };
        }
        if let Some(Some(json_file)) = section.get("json_file") {
            let json_file = json_file.trim();
            output.json_file = (!json_file.is_empty()).then(|| json_file.to_string());
        }
        Ok(())
    }

    fn parse_logging(section: &Section, logging: &mut LoggingSettings) -> Result<(), ConfigError> {
        if let Some(Some(level)) = section.get("level") {
            logging.level = level.trim().to_string();
        }
        if let Some(file_logging) = parse_value(section, "file_logging")? {
            logging.file_logging = file_logging;
        }
        Ok(())
    }

    /// Gets the system configuration file path.
    fn get_system_config_path() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            Some(PathBuf::from("/etc/gaussvib").join(CONFIG_FILE_NAME))
        }
        #[cfg(windows)]
        {
            std::env::var("PROGRAMDATA")
                .ok()
                .map(|pd| PathBuf::from(pd).join("gaussvib").join(CONFIG_FILE_NAME))
        }
    }

    /// Gets the user configuration file path.
    fn get_user_config_path() -> Option<PathBuf> {
        #[cfg(unix)]
        {
            std::env::var("HOME").ok().map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("gaussvib")
                    .join(CONFIG_FILE_NAME)
            })
        }
        #[cfg(windows)]
        {
            std::env::var("APPDATA")
                .ok()
                .map(|appdata| PathBuf::from(appdata).join("gaussvib").join(CONFIG_FILE_NAME))
        }
    }

    /// Writes a commented settings template holding the built-in defaults.
    pub fn create_template(path: &Path) -> Result<(), ConfigError> {
        fs::write(path, Self::generate_template_content())?;
        info!("Created settings template at: {}", path.display());
        Ok(())
    }

    fn generate_template_content() -> String {
        let defaults = Settings::default();
        format!(
            r#"# gaussvib configuration file
#
# Files are loaded in this order, later ones overriding earlier ones:
#
# 1. System config (/etc/gaussvib/gaussvib_config.cfg)
# 2. User config (~/.config/gaussvib/gaussvib_config.cfg)
# 3. Current working directory (./gaussvib_config.cfg)
#
# Missing sections or keys keep the built-in defaults shown below.

[hamiltonian]
# Harmonic basis functions per mode
num_modals = {}

# Keep couplings of up to this many distinct modes (1, 2 or 3)
truncation_order = {}

# Matrix element contributions at or below this magnitude are dropped
threshold = {:e}

# Divide force constants by the multinomial of repeated mode indices
normalize = {}

[output]
# text or json
format = text

# Write the JSON export of the harmonic terms to this file (empty = none)
json_file =

[logging]
# debug, info, warn or error
level = {}

# Log to gaussvib_debug_<log_stem>.log instead of stdout
file_logging = {}
"#,
            defaults.hamiltonian.num_modals,
            defaults.hamiltonian.truncation_order,
            defaults.hamiltonian.threshold,
            defaults.hamiltonian.normalize,
            defaults.logging.level,
            defaults.logging.file_logging,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.hamiltonian.num_modals, 2);
        assert_eq!(settings.hamiltonian.truncation_order, 3);
        assert_eq!(settings.hamiltonian.threshold, 1e-6);
        assert!(settings.hamiltonian.normalize);
        assert_eq!(settings.output.format, OutputFormat::Text);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_parse_overrides_only_given_keys() {
        let ini = "[hamiltonian]\nnum_modals = 4\nthreshold = 1e-8\n\n[output]\nformat = json\n";
        let settings = SettingsManager::parse_config(ini, &Settings::default()).unwrap();
        assert_eq!(settings.hamiltonian.num_modals, 4);
        assert_eq!(settings.hamiltonian.threshold, 1e-8);
        assert_eq!(settings.hamiltonian.truncation_order, 3);
        assert_eq!(settings.output.format, OutputFormat::Json);
        assert_eq!(settings.output.json_file, None);
    }

    #[test]
    fn test_invalid_truncation_order() {
        let ini = "[hamiltonian]\ntruncation_order = 4\n";
        let err = SettingsManager::parse_config(ini, &Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_invalid_number() {
        let ini = "[hamiltonian]\nnum_modals = many\n";
        assert!(SettingsManager::parse_config(ini, &Settings::default()).is_err());
    }

    #[test]
    fn test_template_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        SettingsManager::create_template(&path).unwrap();
        let settings = SettingsManager::load_config(&path, &Settings::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
