use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::EnricherConfig;
use crate::error::{EnrichError, Result};
use crate::record::{
    is_truthy, type_name, VendorRecord, PROPERTY_BUYER_EMAIL_ADDRESS,
    PROPERTY_BUYER_PHONE_NUMBER, PROPERTY_CONTRACT_NUMBER, PROPERTY_OBJECT_ID, PROPERTY_REGION,
};
use crate::region::{find_matching_region, Region};

/// A record-level failure that was isolated instead of aborting a batch.
#[derive(Debug)]
pub struct RecordFailure {
    /// Position of the record in the batch
    pub index: usize,
    pub error: EnrichError,
}

/// Outcome of tagging a batch of records with regions.
#[derive(Debug, Default)]
pub struct RegionTagReport {
    /// Records that received a region
    pub tagged: usize,
    /// Records whose region came from the per-call cache
    pub cache_hits: usize,
    /// Records with no matching region
    pub unmatched: usize,
    /// Records whose postal code could not be matched at all
    pub failures: Vec<RecordFailure>,
}

/// Applies the vendor record transforms using field names and patterns from
/// an [`EnricherConfig`].
///
/// Every operation mutates the record it is given and hands the same record
/// back, so calls can be chained.
pub struct RecordEnricher<'c> {
    config: &'c EnricherConfig,
}

impl<'c> RecordEnricher<'c> {
    pub fn new(config: &'c EnricherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnricherConfig {
        self.config
    }

    /// Split the combined contact field into `(email, phone)`.
    ///
    /// Records without the field yield `(None, None)`. The email is the text
    /// before the first comma; the phone starts two characters after it, so
    /// exactly one separator character following the comma is skipped.
    pub fn split_buyer_contact_field(
        &self,
        vendor: &VendorRecord,
    ) -> Result<(Option<String>, Option<String>)> {
        let field = self.config.property_buyer_contact.as_str();

        let contact = match vendor.get(field) {
            None => return Ok((None, None)),
            Some(Value::String(contact)) => contact.as_str(),
            Some(other) => {
                return Err(EnrichError::type_error(
                    field,
                    format!(
                        "vendor must have a property {} of type string, got {}. Invalid value: {}",
                        field,
                        type_name(other),
                        other
                    ),
                ))
            }
        };

        let (email_address, after_comma) = match contact.find(',') {
            Some(idx) => (&contact[..idx], &contact[idx + 1..]),
            // Without a comma the email is empty and the phone starts one character in.
            None => ("", contact),
        };

        if !self.config.regex_email_address.is_match(email_address) {
            return Err(EnrichError::validation(
                field,
                "must have a valid email address",
                email_address,
            ));
        }

        let mut rest = after_comma.chars();
        rest.next();
        let phone_number = rest.as_str();

        if !self.config.regex_phone_number.is_match(phone_number) {
            return Err(EnrichError::validation(
                field,
                "must have a valid phone number",
                phone_number,
            ));
        }

        Ok((
            Some(email_address.to_string()),
            Some(phone_number.to_string()),
        ))
    }

    /// Write `buyerEmailAddress` and `buyerPhoneNumber` onto the record.
    ///
    /// Records without contact information get both fields set to `null`.
    pub fn add_buyer_email_address_and_phone_number<'r>(
        &self,
        vendor: &'r mut VendorRecord,
    ) -> Result<&'r mut VendorRecord> {
        let (email_address, phone_number) = self.split_buyer_contact_field(vendor)?;
        vendor.insert(
            PROPERTY_BUYER_EMAIL_ADDRESS.to_string(),
            email_address.map(Value::String).unwrap_or(Value::Null),
        );
        vendor.insert(
            PROPERTY_BUYER_PHONE_NUMBER.to_string(),
            phone_number.map(Value::String).unwrap_or(Value::Null),
        );
        Ok(vendor)
    }

    /// Copy a truthy `contractNumber` into `objectID`.
    pub fn add_object_id<'r>(&self, vendor: &'r mut VendorRecord) -> &'r mut VendorRecord {
        if is_truthy(vendor.get(PROPERTY_CONTRACT_NUMBER)) {
            if let Some(contract_number) = vendor.get(PROPERTY_CONTRACT_NUMBER).cloned() {
                vendor.insert(PROPERTY_OBJECT_ID.to_string(), contract_number);
            }
        }
        vendor
    }

    /// Tag each vendor with the name of the first region containing its postal code.
    ///
    /// Vendors are visited in order. Matches are memoized by postal code for
    /// the duration of this call only; misses are not cached. A vendor whose
    /// postal code cannot be matched is logged and reported, and processing
    /// continues with the next vendor. This is the only operation that
    /// isolates per-record failures itself.
    pub fn add_region_property(
        &self,
        vendors: &mut [VendorRecord],
        regions: &[Region],
    ) -> RegionTagReport {
        let field = self.config.property_supplier_zip_code.as_str();
        let mut region_by_zip_code: HashMap<String, &Region> = HashMap::new();
        let mut report = RegionTagReport::default();

        for (index, vendor) in vendors.iter_mut().enumerate() {
            let cached = match vendor.get(field) {
                Some(Value::String(code)) => region_by_zip_code.get(code.as_str()).copied(),
                _ => None,
            };
            if let Some(region) = cached {
                vendor.insert(
                    PROPERTY_REGION.to_string(),
                    Value::String(region.name().to_string()),
                );
                report.tagged += 1;
                report.cache_hits += 1;
                continue;
            }

            let matching_region = match find_matching_region(vendor, field, regions) {
                Ok(found) => found,
                Err(error) => {
                    warn!(
                        index,
                        zip_code = ?vendor.get(field),
                        error = %error,
                        "Error getting matching region"
                    );
                    report.failures.push(RecordFailure { index, error });
                    continue;
                }
            };

            match matching_region {
                Some(region) => {
                    if let Some(Value::String(code)) = vendor.get(field) {
                        region_by_zip_code.insert(code.clone(), region);
                    }
                    vendor.insert(
                        PROPERTY_REGION.to_string(),
                        Value::String(region.name().to_string()),
                    );
                    report.tagged += 1;
                }
                None => report.unmatched += 1,
            }
        }

        debug!(
            vendors = vendors.len(),
            tagged = report.tagged,
            cache_hits = report.cache_hits,
            unmatched = report.unmatched,
            failures = report.failures.len(),
            "Tagged vendor regions"
        );

        report
    }

    /// Replace each named field with its truthiness. See [`convert_properties_to_boolean`].
    pub fn convert_properties_to_boolean<'r, S: AsRef<str>>(
        &self,
        vendor: &'r mut VendorRecord,
        properties: &[S],
    ) -> &'r mut VendorRecord {
        convert_properties_to_boolean(vendor, properties)
    }
}

/// Replace each named field with its truthiness; absent fields become `false`.
pub fn convert_properties_to_boolean<'r, S: AsRef<str>>(
    record: &'r mut VendorRecord,
    properties: &[S],
) -> &'r mut VendorRecord {
    for property in properties {
        let property = property.as_ref();
        let value = is_truthy(record.get(property));
        record.insert(property.to_string(), Value::Bool(value));
    }
    record
}
