use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};

use crate::config::EnricherConfig;
use crate::enricher::RecordEnricher;
use crate::error::{EnrichError, Result};
use crate::record::VendorRecord;

/// One transform the pipeline can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    /// Derive `objectID` from `contractNumber`
    ObjectId,
    /// Split the buyer contact field into email and phone
    BuyerContact,
    /// Coerce the configured boolean fields
    Booleans,
    /// Tag records with their region
    Region,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 4] = [
        PipelineStep::ObjectId,
        PipelineStep::BuyerContact,
        PipelineStep::Booleans,
        PipelineStep::Region,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::ObjectId => "object_id",
            PipelineStep::BuyerContact => "buyer_contact",
            PipelineStep::Booleans => "booleans",
            PipelineStep::Region => "region",
        }
    }

    /// Parse a comma-separated step list such as `"object_id,region"`.
    pub fn parse_list(list: &str) -> Result<Vec<PipelineStep>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStep {
    type Err = EnrichError;

    fn from_str(s: &str) -> Result<Self> {
        PipelineStep::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| {
                EnrichError::Config(format!(
                    "Unknown pipeline step '{}'. Available: object_id, buyer_contact, booleans, region",
                    s
                ))
            })
    }
}

/// A record that one step could not process.
#[derive(Debug)]
pub struct StepFailure {
    pub index: usize,
    pub step: PipelineStep,
    pub error: EnrichError,
}

/// Result of running the pipeline over a batch.
#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub total_records: usize,
    pub tagged_records: usize,
    pub failures: Vec<StepFailure>,
}

impl PipelineSummary {
    pub fn failed_records(&self) -> usize {
        let mut indices: Vec<usize> = self.failures.iter().map(|f| f.index).collect();
        indices.sort_unstable();
        indices.dedup();
        indices.len()
    }
}

/// Batch post-processing over imported vendor records.
///
/// Per-record steps run record by record in the configured order; the region
/// step runs once over the whole batch so its cache spans every record. A
/// record that fails one step is reported and still receives the others.
pub struct EnrichmentPipeline<'c> {
    enricher: RecordEnricher<'c>,
    steps: Vec<PipelineStep>,
}

impl<'c> EnrichmentPipeline<'c> {
    pub fn new(config: &'c EnricherConfig) -> Self {
        Self::with_steps(config, PipelineStep::ALL.to_vec())
    }

    pub fn with_steps(config: &'c EnricherConfig, steps: Vec<PipelineStep>) -> Self {
        Self {
            enricher: RecordEnricher::new(config),
            steps,
        }
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn run(&self, records: &mut [VendorRecord]) -> PipelineSummary {
        let config = self.enricher.config();
        let mut summary = PipelineSummary {
            total_records: records.len(),
            ..Default::default()
        };

        for (index, record) in records.iter_mut().enumerate() {
            for step in &self.steps {
                match step {
                    PipelineStep::ObjectId => {
                        self.enricher.add_object_id(record);
                    }
                    PipelineStep::BuyerContact => {
                        if let Err(error) =
                            self.enricher.add_buyer_email_address_and_phone_number(record)
                        {
                            warn!(index, error = %error, "Skipping buyer contact split");
                            summary.failures.push(StepFailure {
                                index,
                                step: *step,
                                error,
                            });
                        }
                    }
                    PipelineStep::Booleans => {
                        self.enricher
                            .convert_properties_to_boolean(record, config.boolean_fields.as_slice());
                    }
                    PipelineStep::Region => {}
                }
            }
        }

        if self.steps.contains(&PipelineStep::Region) {
            let report = self.enricher.add_region_property(records, &config.regions);
            summary.tagged_records = report.tagged;
            summary
                .failures
                .extend(report.failures.into_iter().map(|f| StepFailure {
                    index: f.index,
                    step: PipelineStep::Region,
                    error: f.error,
                }));
        }

        summary.failures.sort_by_key(|f| f.index);

        info!(
            total = summary.total_records,
            tagged = summary.tagged_records,
            failures = summary.failures.len(),
            "Enrichment pipeline finished"
        );

        summary
    }
}
