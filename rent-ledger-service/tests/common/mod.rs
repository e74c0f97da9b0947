#![allow(dead_code)]
//! Test harness: in-memory implementations of the store contracts so the
//! engine can be exercised hermetically. The ledger fake honors the composite
//! (tenant_id, month, year) uniqueness constraint the way the Mongo index
//! does, so the conflict path behaves like production.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rent_ledger_service::dtos::SubmitPaymentRequest;
use rent_ledger_service::models::{Month, PaymentRecord, Tenant};
use rent_ledger_service::services::{InsertOutcome, LedgerEngine, LedgerStore, TenantDirectory};
use service_core::error::AppError;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryTenantDirectory {
    tenants: Mutex<HashMap<String, Tenant>>,
    fail_set_rent: AtomicBool,
}

impl InMemoryTenantDirectory {
    pub fn insert(&self, tenant: Tenant) {
        self.tenants
            .lock()
            .unwrap()
            .insert(tenant.tenant_id.clone(), tenant);
    }

    pub fn rent_of(&self, tenant_id: &str) -> f64 {
        self.tenants.lock().unwrap()[tenant_id].rent
    }

    pub fn fail_next_set_rent(&self, fail: bool) {
        self.fail_set_rent.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn get_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>, AppError> {
        Ok(self.tenants.lock().unwrap().get(tenant_id).cloned())
    }

    async fn set_rent(&self, tenant_id: &str, new_rent: f64) -> Result<(), AppError> {
        if self.fail_set_rent.load(Ordering::SeqCst) {
            return Err(AppError::StoreError(anyhow::anyhow!(
                "tenant directory unavailable"
            )));
        }
        let mut tenants = self.tenants.lock().unwrap();
        if let Some(tenant) = tenants.get_mut(tenant_id) {
            tenant.rent = new_rent;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryLedgerStore {
    records: Mutex<Vec<PaymentRecord>>,
    failing_months: Mutex<HashSet<(String, i32)>>,
}

impl InMemoryLedgerStore {
    /// Make inserts for the given month fail with a store error, simulating
    /// a partial backfill.
    pub fn fail_inserts_for(&self, month: Month, year: i32) {
        self.failing_months
            .lock()
            .unwrap()
            .insert((month.as_str().to_string(), year));
    }

    pub fn clear_failures(&self) {
        self.failing_months.lock().unwrap().clear();
    }

    pub fn records(&self) -> Vec<PaymentRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn record_for(&self, tenant_id: &str, month: Month, year: i32) -> Option<PaymentRecord> {
        self.records()
            .into_iter()
            .find(|r| r.tenant_id == tenant_id && r.month == month && r.year == year)
    }

    pub fn count_for(&self, tenant_id: &str, month: Month, year: i32) -> usize {
        self.records()
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.month == month && r.year == year)
            .count()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert(&self, record: &PaymentRecord) -> Result<InsertOutcome, AppError> {
        if self
            .failing_months
            .lock()
            .unwrap()
            .contains(&(record.month.as_str().to_string(), record.year))
        {
            return Err(AppError::StoreError(anyhow::anyhow!(
                "ledger store rejected the write"
            )));
        }

        let mut records = self.records.lock().unwrap();
        let duplicate = records.iter().any(|r| {
            r.tenant_id == record.tenant_id && r.month == record.month && r.year == record.year
        });
        if duplicate {
            return Ok(InsertOutcome::Duplicate);
        }
        records.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_tenant_month_year(
        &self,
        tenant_id: &str,
        month: Month,
        year: i32,
    ) -> Result<Option<PaymentRecord>, AppError> {
        Ok(self.record_for(tenant_id, month, year))
    }

    async fn has_any_for_tenant(&self, tenant_id: &str) -> Result<bool, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.tenant_id == tenant_id))
    }

    async fn list_all(&self) -> Result<Vec<PaymentRecord>, AppError> {
        Ok(self.records())
    }

    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<PaymentRecord>, AppError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|r| r.tenant_id == tenant_id)
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PaymentRecord>, AppError> {
        Ok(self.records().into_iter().find(|r| r.id == id))
    }

    async fn set_rent_amount(&self, id: Uuid, rent: f64) -> Result<bool, AppError> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.rent = rent;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_status(&self, id: Uuid, status: &str) -> Result<bool, AppError> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.status = status.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_method(&self, id: Uuid, method: &str) -> Result<bool, AppError> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.method = method.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }
}

pub struct TestHarness {
    pub tenants: Arc<InMemoryTenantDirectory>,
    pub ledger: Arc<InMemoryLedgerStore>,
    pub engine: LedgerEngine,
}

impl TestHarness {
    pub fn new() -> Self {
        let tenants = Arc::new(InMemoryTenantDirectory::default());
        let ledger = Arc::new(InMemoryLedgerStore::default());
        let engine = LedgerEngine::new(tenants.clone(), ledger.clone());
        Self {
            tenants,
            ledger,
            engine,
        }
    }

    pub fn seed_tenant(&self, tenant_id: &str, rent: f64, join_date: Option<&str>) {
        self.tenants.insert(Tenant {
            tenant_id: tenant_id.to_string(),
            name: format!("Tenant {}", tenant_id),
            phone: "9000000000".to_string(),
            room: "101".to_string(),
            bed: "A".to_string(),
            rent,
            join_date: join_date.map(|s| s.to_string()),
            aadhaar_front: String::new(),
            aadhaar_back: String::new(),
            profile: String::new(),
        });
    }
}

/// Bare submission: tenant, month, year, everything else defaulted.
pub fn submit_request(tenant_id: &str, month: &str, year: i32) -> SubmitPaymentRequest {
    SubmitPaymentRequest {
        tenant_id: tenant_id.to_string(),
        month: month.to_string(),
        year,
        rent: None,
        deposit: None,
        maintenance: None,
        method: None,
        status: None,
        paid_on: None,
    }
}
