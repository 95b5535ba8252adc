mod enumeration;
mod lookup;
mod orchestrator;
mod prober;
mod status;
mod storage;

pub use enumeration::{EnumerationOutcome, EnumerationPolicy, Enumerator, IdentifierRule};
pub use lookup::AssetLookup;
pub use orchestrator::{ClassSchedule, Heartbeat, ScanOrchestrator};
pub use prober::AssetProber;
pub use status::{CrawlerStatus, LivenessTracker, StatusService, STALE_AFTER_SECS};
pub use storage::{AssetStore, StorageError};
