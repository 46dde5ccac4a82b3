use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EnrichError, Result};
use crate::record::{type_name, VendorRecord};

/// A named grouping of postal codes used to classify vendor records geographically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegionDefinition")]
pub struct Region {
    name: String,
    zip_codes: BTreeSet<String>,
}

/// Raw region definition as it appears in configuration files.
#[derive(Debug, Deserialize)]
struct RegionDefinition {
    name: String,
    #[serde(alias = "zipCodes")]
    zip_codes: Vec<String>,
}

impl TryFrom<RegionDefinition> for Region {
    type Error = EnrichError;

    fn try_from(def: RegionDefinition) -> Result<Self> {
        Region::new(def.name, def.zip_codes)
    }
}

/// Five ASCII digits.
pub fn is_valid_zip_code(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit())
}

impl Region {
    /// Create a region, rejecting any membership key that is not a five-digit postal code.
    pub fn new<I, S>(name: impl Into<String>, zip_codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mut codes = BTreeSet::new();
        for code in zip_codes {
            let code = code.into();
            if !is_valid_zip_code(&code) {
                return Err(EnrichError::validation(
                    format!("region '{}'", name),
                    "zip code entries must be strings of five digits",
                    code,
                ));
            }
            codes.insert(code);
        }
        Ok(Self {
            name,
            zip_codes: codes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn zip_codes(&self) -> impl Iterator<Item = &str> {
        self.zip_codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.zip_codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip_codes.is_empty()
    }

    pub fn contains(&self, zip_code: &str) -> bool {
        self.zip_codes.contains(zip_code)
    }

    /// Does the postal code stored under `field` on `record` belong to this region?
    ///
    /// A record without the field never matches. A non-string value is a type
    /// error and a string that is not a five-digit code is a validation error.
    pub fn matches(&self, record: &VendorRecord, field: &str) -> Result<bool> {
        match zip_code_of(record, field)? {
            Some(code) => Ok(self.contains(code)),
            None => Ok(false),
        }
    }
}

/// Read and check the postal code under `field`.
pub fn zip_code_of<'r>(record: &'r VendorRecord, field: &str) -> Result<Option<&'r str>> {
    match record.get(field) {
        None => Ok(None),
        Some(Value::String(code)) => {
            if is_valid_zip_code(code) {
                Ok(Some(code.as_str()))
            } else {
                Err(EnrichError::validation(
                    field,
                    "zip code must be a string of five digits",
                    code.clone(),
                ))
            }
        }
        Some(other) => Err(EnrichError::type_error(
            field,
            format!(
                "zip code must be of type string, got {}. Invalid value: {}",
                type_name(other),
                other
            ),
        )),
    }
}

/// First region in `regions` whose membership test accepts the record's postal code.
pub fn find_matching_region<'a>(
    record: &VendorRecord,
    field: &str,
    regions: &'a [Region],
) -> Result<Option<&'a Region>> {
    let code = match zip_code_of(record, field)? {
        Some(code) => code,
        None => return Ok(None),
    };
    Ok(regions.iter().find(|region| region.contains(code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> VendorRecord {
        value.as_object().cloned().unwrap()
    }

    fn new_river_valley() -> Region {
        Region::new(
            "New River Valley",
            ["24068", "24073", "24061", "24060", "24141", "24142", "24143"],
        )
        .unwrap()
    }

    #[test]
    fn test_region_rejects_malformed_codes() {
        let err = Region::new("Bad", ["2406"]).unwrap_err();
        assert!(err.is_validation_error());

        let err = Region::new("Bad", ["2406a"]).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_matches_member_code() {
        let region = new_river_valley();
        assert!(region.matches(&record(json!({"supplierZip": "24068"})), "supplierZip").unwrap());
        assert!(!region.matches(&record(json!({"supplierZip": "22152"})), "supplierZip").unwrap());
        assert!(!region.matches(&record(json!({"name": "Acme"})), "supplierZip").unwrap());
    }

    #[test]
    fn test_matches_rejects_non_string_code() {
        let region = new_river_valley();
        let err = region
            .matches(&record(json!({"supplierZip": 24068})), "supplierZip")
            .unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_matches_rejects_short_code() {
        let region = new_river_valley();
        let err = region
            .matches(&record(json!({"supplierZip": "240"})), "supplierZip")
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_first_region_wins() {
        let regions = vec![
            Region::new("First", ["24068"]).unwrap(),
            Region::new("Second", ["24068", "24011"]).unwrap(),
        ];
        let found = find_matching_region(&record(json!({"zip": "24068"})), "zip", &regions)
            .unwrap()
            .unwrap();
        assert_eq!(found.name(), "First");

        let found = find_matching_region(&record(json!({"zip": "24011"})), "zip", &regions)
            .unwrap()
            .unwrap();
        assert_eq!(found.name(), "Second");
    }

    #[test]
    fn test_deserialize_accepts_either_key_spelling() {
        let a: Region =
            serde_json::from_value(json!({"name": "A", "zip_codes": ["24011"]})).unwrap();
        let b: Region = serde_json::from_value(json!({"name": "A", "zipCodes": ["24011"]})).unwrap();
        assert_eq!(a, b);

        let bad = serde_json::from_value::<Region>(json!({"name": "A", "zip_codes": ["1"]}));
        assert!(bad.is_err());
    }
}
