use std::fs;

use anyhow::Result;
use serde_json::{json, Value};
use tempfile::tempdir;
use vendor_enrich::config::EnricherConfig;
use vendor_enrich::loader::{load_records, write_json};
use vendor_enrich::pipeline::{EnrichmentPipeline, PipelineStep};

const VENDORS_CSV: &str = "contractNumber,supplierName,buyerContact,supplierZip,cooperative\n\
TG-001-08,Acme Supply,\"wilsont@vt.edu, (540) 231-7402\",24068,Y\n\
TG-002-09,Blue Ridge Office,\"jsumpter@vt.edu, abc\",24011,\n\
TG-003-10,Capital Paper,,22152,N\n\
TG-004-11,Acme Supply East,,24068,\n";

#[test]
fn test_csv_import_through_pipeline() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("vendors.csv");
    fs::write(&input, VENDORS_CSV)?;

    let config = EnricherConfig::from_toml_str(r#"boolean_fields = ["cooperative"]"#)?;
    let mut records = load_records(&input, &config.csv)?;
    assert_eq!(records.len(), 4);

    let summary = EnrichmentPipeline::new(&config).run(&mut records);

    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.tagged_records, 3);
    assert_eq!(summary.failed_records(), 1);
    assert_eq!(summary.failures[0].index, 1);
    assert_eq!(summary.failures[0].step, PipelineStep::BuyerContact);

    assert_eq!(records[0]["region"], json!("New River Valley"));
    assert_eq!(records[0]["buyerEmailAddress"], json!("wilsont@vt.edu"));
    assert_eq!(records[0]["cooperative"], json!(true));
    assert_eq!(records[1]["region"], json!("Roanoke Valley"));
    assert_eq!(records[1]["cooperative"], json!(false));
    assert!(!records[2].contains_key("region"));
    assert_eq!(records[2]["buyerEmailAddress"], Value::Null);
    // Non-empty strings are truthy, including "N".
    assert_eq!(records[2]["cooperative"], json!(true));
    assert_eq!(records[3]["region"], json!("New River Valley"));
    assert_eq!(records[3]["objectID"], json!("TG-004-11"));

    let output = temp_dir.path().join("vendors.json");
    write_json(fs::File::create(&output)?, &records)?;
    let written: Value = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(written.as_array().map(|a| a.len()), Some(4));
    assert_eq!(written[0]["objectID"], json!("TG-001-08"));

    Ok(())
}

#[test]
fn test_json_import_with_config_file() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("enricher.toml");
    fs::write(
        &config_path,
        r#"
property_supplier_zip_code = "zip"

[[regions]]
name = "Shenandoah Valley"
zip_codes = ["22801", "22802"]
"#,
    )?;
    let input = temp_dir.path().join("vendors.json");
    fs::write(
        &input,
        r#"[{"zip": "22801"}, {"zip": "24068"}, {"zip": 22802}]"#,
    )?;

    let config = EnricherConfig::load(&config_path)?;
    let mut records = load_records(&input, &config.csv)?;
    let summary =
        EnrichmentPipeline::with_steps(&config, vec![PipelineStep::Region]).run(&mut records);

    assert_eq!(records[0]["region"], json!("Shenandoah Valley"));
    assert!(!records[1].contains_key("region"));
    assert!(!records[2].contains_key("region"));
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].error.is_type_error());

    Ok(())
}

#[test]
fn test_unsupported_input_extension() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("vendors.xlsx");
    fs::write(&input, "")?;

    let config = EnricherConfig::default();
    assert!(load_records(&input, &config.csv).is_err());
    Ok(())
}
