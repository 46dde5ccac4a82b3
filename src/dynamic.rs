//! Entry points for callers holding untyped JSON values.
//!
//! These check argument shapes up front and report a type error before
//! touching anything, then delegate to [`RecordEnricher`].

use serde_json::Value;

use crate::enricher::{convert_properties_to_boolean, RecordEnricher, RegionTagReport};
use crate::error::{EnrichError, Result};
use crate::record::type_name;
use crate::region::Region;

/// Tag every object in the `vendors` array with its region.
///
/// `vendors` must be an array and `regions` an array of region definitions
/// (`{"name": ..., "zip_codes": [...]}`). Array elements that are not objects
/// are skipped like records without a postal code.
pub fn add_region_property_value(
    enricher: &RecordEnricher<'_>,
    vendors: &mut Value,
    regions: &Value,
) -> Result<RegionTagReport> {
    let items = match vendors {
        Value::Array(items) => items,
        other => {
            return Err(EnrichError::type_error(
                "vendors",
                format!("parameter vendors must be an array, got {}", type_name(other)),
            ))
        }
    };

    let regions = parse_regions(regions)?;

    // Detach the objects so the typed tagger can work on a slice, then put them back.
    let mut positions = Vec::new();
    let mut records = Vec::new();
    for (position, item) in items.iter_mut().enumerate() {
        if let Value::Object(map) = item {
            positions.push(position);
            records.push(std::mem::take(map));
        }
    }

    let mut report = enricher.add_region_property(&mut records, &regions);

    for failure in &mut report.failures {
        failure.index = positions[failure.index];
    }
    for (position, record) in positions.into_iter().zip(records) {
        items[position] = Value::Object(record);
    }

    Ok(report)
}

fn parse_regions(regions: &Value) -> Result<Vec<Region>> {
    let entries = regions.as_array().ok_or_else(|| {
        EnrichError::type_error(
            "regions",
            format!("parameter regions must be an array. Invalid value: {}", regions),
        )
    })?;

    entries
        .iter()
        .map(|entry| {
            serde_json::from_value::<Region>(entry.clone()).map_err(|e| {
                EnrichError::type_error(
                    "regions",
                    format!(
                        "each entry must be a region ({}). Invalid value: {}",
                        e, entry
                    ),
                )
            })
        })
        .collect()
}

/// Replace each field named in `properties` with its truthiness.
///
/// `target` must be an object and `properties` an array of strings; every
/// entry is checked before any field is written.
pub fn convert_properties_to_boolean_value<'a>(
    target: &'a mut Value,
    properties: &Value,
) -> Result<&'a mut Value> {
    if !target.is_object() {
        return Err(EnrichError::type_error(
            "obj",
            format!("parameter 'obj' must be an object. Invalid value: {}", target),
        ));
    }

    let entries = properties.as_array().ok_or_else(|| {
        EnrichError::type_error(
            "properties",
            format!(
                "parameter 'properties' must be an array of strings. Invalid value: {}",
                properties
            ),
        )
    })?;

    let names = entries
        .iter()
        .map(|entry| {
            entry.as_str().ok_or_else(|| {
                EnrichError::type_error(
                    "properties",
                    format!("each property must be a string. Invalid value: {}", entry),
                )
            })
        })
        .collect::<Result<Vec<&str>>>()?;

    if let Some(record) = target.as_object_mut() {
        convert_properties_to_boolean(record, &names);
    }
    Ok(target)
}
