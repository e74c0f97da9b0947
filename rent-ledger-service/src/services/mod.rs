pub mod engine;
pub mod metrics;
pub mod repository;
pub mod stores;

pub use engine::{LedgerEngine, RepairOutcome, SubmitOutcome};
pub use repository::{MongoLedgerStore, MongoTenantDirectory};
pub use stores::{InsertOutcome, LedgerStore, TenantDirectory};
