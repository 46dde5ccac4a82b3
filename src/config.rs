use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{EnrichError, Result};
use crate::region::Region;

pub const DEFAULT_CONFIG_PATH: &str = "enricher.toml";
pub const DEFAULT_EMAIL_PATTERN: &str = r"^[A-Za-z0-9_.-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$";
pub const DEFAULT_PHONE_PATTERN: &str = r"^[+]*[(]{0,1}[0-9]{1,4}[)]{0,1}[-\s\./0-9]*$";
/// Environment variable naming the deployment environment
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Options applied when importing vendor records from CSV.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Omit empty cells instead of storing empty strings
    pub ignore_empty: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { ignore_empty: true }
    }
}

/// On-disk shape of the configuration file. Every key is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    property_buyer_contact: String,
    property_supplier_zip_code: String,
    regex_email_address: String,
    regex_phone_number: String,
    boolean_fields: Vec<String>,
    node_environment_production: String,
    csv: CsvOptions,
    regions: Option<Vec<Region>>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            property_buyer_contact: "buyerContact".to_string(),
            property_supplier_zip_code: "supplierZip".to_string(),
            regex_email_address: DEFAULT_EMAIL_PATTERN.to_string(),
            regex_phone_number: DEFAULT_PHONE_PATTERN.to_string(),
            boolean_fields: Vec::new(),
            node_environment_production: "production".to_string(),
            csv: CsvOptions::default(),
            regions: None,
        }
    }
}

/// Immutable settings consumed by the enricher and the batch pipeline.
#[derive(Debug, Clone)]
pub struct EnricherConfig {
    /// Field holding the combined "email, phone" contact string
    pub property_buyer_contact: String,
    /// Field holding the supplier postal code
    pub property_supplier_zip_code: String,
    pub regex_email_address: Regex,
    pub regex_phone_number: Regex,
    /// Fields coerced to booleans by the pipeline
    pub boolean_fields: Vec<String>,
    /// Value of `APP_ENV` that marks a production deployment
    pub node_environment_production: String,
    pub csv: CsvOptions,
    /// Ordered region list; first match wins
    pub regions: Vec<Region>,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self::from_file(ConfigFile::default()).expect("built-in enricher configuration")
    }
}

/// The regions shipped with the sample configuration.
pub fn default_regions() -> Result<Vec<Region>> {
    Ok(vec![
        Region::new(
            "New River Valley",
            ["24068", "24073", "24061", "24060", "24141", "24142", "24143"],
        )?,
        Region::new(
            "Roanoke Valley",
            [
                "24011", "24012", "24013", "24014", "24015", "24016", "24017", "24018", "24019",
            ],
        )?,
    ])
}

impl EnricherConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EnrichError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    fn from_file(file: ConfigFile) -> Result<Self> {
        if file.property_buyer_contact.is_empty() || file.property_supplier_zip_code.is_empty() {
            return Err(EnrichError::Config(
                "field name settings must not be empty".to_string(),
            ));
        }

        let regions = match file.regions {
            Some(regions) => regions,
            None => default_regions()?,
        };

        Ok(Self {
            property_buyer_contact: file.property_buyer_contact,
            property_supplier_zip_code: file.property_supplier_zip_code,
            regex_email_address: Regex::new(&file.regex_email_address)?,
            regex_phone_number: Regex::new(&file.regex_phone_number)?,
            boolean_fields: file.boolean_fields,
            node_environment_production: file.node_environment_production,
            csv: file.csv,
            regions,
        })
    }

    /// Whether the current process runs in the production environment.
    pub fn is_production(&self) -> bool {
        std::env::var(ENVIRONMENT_VAR)
            .map(|env| env == self.node_environment_production)
            .unwrap_or(false)
    }
}
