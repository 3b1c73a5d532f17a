use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_yaml::from_reader;
use tracing::{debug, info, instrument};

use crate::{error::AccuracyError, metrics::DEFAULT_TOLERANCE};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccuracyConfig {
    #[serde(rename = "test-id")]
    pub test_id: String,
    /// Unit of the consumption measurements, e.g. "W" or "A".
    pub measure: String,
    /// One label per disaggregated load.
    pub labels: Vec<String>,
    pub folds: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(rename = "csv-output")]
    pub csv_output: Option<PathBuf>,
    #[serde(rename = "json-output")]
    pub json_output: Option<PathBuf>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

const DEFAULT_DATA: &str = r#"
test-id: "default"
measure: "W"
labels:
  - "FRG"
  - "HPE"
folds: 10
tolerance: 0.2
"#;

impl Default for AccuracyConfig {
    fn default() -> Self {
        Self {
            test_id: "default".to_string(),
            measure: "W".to_string(),
            labels: vec!["FRG".to_string(), "HPE".to_string()],
            folds: 10,
            tolerance: DEFAULT_TOLERANCE,
            csv_output: None,
            json_output: None,
        }
    }
}

impl AccuracyConfig {
    /// Reads the configuration from a YAML file.
    ///
    /// If the file does not exist, it creates a default configuration file.
    ///
    /// # Arguments
    ///
    /// * `filename` - Optional path to the configuration file.
    ///
    /// # Returns
    ///
    /// A `Result` containing the validated `AccuracyConfig` on success or an `AccuracyError` on failure.
    #[instrument(level = "info", skip(filename))]
    pub fn read_config<P: AsRef<Path>>(filename: Option<P>) -> Result<Self, AccuracyError> {
        let path = filename
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(|| Path::new("accuracy.yml").to_path_buf());

        info!(path = %path.display(), "Reading configuration");

        if !path.exists() {
            info!(
                "Config file does not exist. Creating default config at {}",
                path.display()
            );
            let mut file = File::create(&path)?;
            file.write_all(DEFAULT_DATA.as_bytes())?;
            debug!("Default configuration file created");
            return Ok(AccuracyConfig::default());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let config: Self = from_reader(reader)?;
        config.validate()?;
        info!(
            loads = config.loads(),
            folds = config.folds,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Number of loads, one per label.
    pub fn loads(&self) -> usize {
        self.labels.len()
    }

    pub fn validate(&self) -> Result<(), AccuracyError> {
        if self.labels.is_empty() {
            return Err(AccuracyError::ConfigError(
                "At least one load label is required".to_string(),
            ));
        }
        if self.folds == 0 {
            return Err(AccuracyError::ConfigError(
                "Number of folds must be greater than 0".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(AccuracyError::ConfigError(format!(
                "Tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_data_matches_default() {
        let config: AccuracyConfig = serde_yaml::from_str(DEFAULT_DATA).unwrap();
        assert_eq!(config, AccuracyConfig::default());
    }

    #[test]
    fn test_read_config_file_does_not_exist() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        drop(temp_file);
        assert!(!path.exists());

        let config = AccuracyConfig::read_config(Some(&path)).unwrap();
        assert_eq!(config, AccuracyConfig::default());
        assert!(path.exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_config_file_exists_valid_yaml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let yaml_content = r#"
test-id: "redd-house-1"
measure: "A"
labels:
  - "FRG"
  - "DWE"
  - "HTP"
folds: 5
csv-output: "out.csv"
"#;
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = AccuracyConfig::read_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.test_id, "redd-house-1");
        assert_eq!(config.measure, "A");
        assert_eq!(config.loads(), 3);
        assert_eq!(config.folds, 5);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.csv_output, Some(PathBuf::from("out.csv")));
        assert_eq!(config.json_output, None);
    }

    #[test]
    fn test_read_config_with_empty_labels() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let yaml_content = r#"
test-id: "t"
measure: "W"
labels: []
folds: 10
"#;
        temp_file.write_all(yaml_content.as_bytes()).unwrap();
        let result = AccuracyConfig::read_config(Some(temp_file.path()));
        assert!(matches!(result, Err(AccuracyError::ConfigError(_))));
    }

    #[test]
    fn test_read_config_with_missing_fields() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let yaml_content = r#"
labels:
  - "FRG"
"#;
        temp_file.write_all(yaml_content.as_bytes()).unwrap();
        let result = AccuracyConfig::read_config(Some(temp_file.path()));
        assert!(matches!(result, Err(AccuracyError::SerdeYamlError(_))));
    }

    #[test]
    fn test_validate_rejects_negative_tolerance() {
        let config = AccuracyConfig {
            tolerance: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = AccuracyConfig {
            folds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
