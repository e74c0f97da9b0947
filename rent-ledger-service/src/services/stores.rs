//! Store contracts consumed by the ledger engine.

use async_trait::async_trait;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{Month, PaymentRecord, Tenant};

/// Result of a conditional insert against the ledger's composite
/// (tenant_id, month, year) uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The constraint rejected the write: a record for this tenant and
    /// month/year already exists, in any status.
    Duplicate,
}

/// Tenant Directory: profile lookup and the one mutation the engine needs,
/// a best-effort rent update on first-payment adoption.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn get_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>, AppError>;
    async fn set_rent(&self, tenant_id: &str, new_rent: f64) -> Result<(), AppError>;
}

/// Ledger Store: a record store keyed by payment id, queryable by
/// (tenant, month, year) and by tenant alone.
///
/// `insert` must be conditional on the composite key so that concurrent
/// submissions for the same month cannot both land; the duplicate check and
/// the write are a single store operation.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert(&self, record: &PaymentRecord) -> Result<InsertOutcome, AppError>;

    async fn find_by_tenant_month_year(
        &self,
        tenant_id: &str,
        month: Month,
        year: i32,
    ) -> Result<Option<PaymentRecord>, AppError>;

    /// Existence probe: does the tenant have any record at all?
    async fn has_any_for_tenant(&self, tenant_id: &str) -> Result<bool, AppError>;

    async fn list_all(&self) -> Result<Vec<PaymentRecord>, AppError>;
    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<PaymentRecord>, AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<PaymentRecord>, AppError>;

    async fn set_rent_amount(&self, id: Uuid, rent: f64) -> Result<bool, AppError>;
    async fn set_status(&self, id: Uuid, status: &str) -> Result<bool, AppError>;
    async fn set_method(&self, id: Uuid, method: &str) -> Result<bool, AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
