pub mod config;
pub mod dynamic;
pub mod enricher;
pub mod error;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod region;

pub use config::EnricherConfig;
pub use enricher::{RecordEnricher, RegionTagReport};
pub use error::{EnrichError, Result};
pub use record::VendorRecord;
pub use region::Region;
