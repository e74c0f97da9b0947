//! Payment ledger consistency engine.
//!
//! Decides, for every incoming payment, whether it is admissible, which side
//! effects it triggers (rent adoption, due backfill), and keeps each tenant's
//! ledger gapless and duplicate-free. Duplicate blocking rides on the store's
//! composite uniqueness constraint, so the admission decision and the write
//! are one operation. Side effects run after the payment is durable and are
//! downgraded to warnings on failure; a repair pass can re-apply them later.

use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::DateTime;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::SubmitPaymentRequest;
use crate::models::{
    Month, MonthYear, PaymentRecord, Tenant, METHOD_CASH, METHOD_PENDING, STATUS_PAID,
    STATUS_PENDING,
};
use crate::services::metrics;
use crate::services::stores::{InsertOutcome, LedgerStore, TenantDirectory};

#[derive(Debug)]
pub struct SubmitOutcome {
    pub record: PaymentRecord,
    pub backfilled: Vec<MonthYear>,
    pub rent_adopted: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct RepairOutcome {
    pub rent_adopted: bool,
    pub backfilled: Vec<MonthYear>,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct LedgerEngine {
    tenants: Arc<dyn TenantDirectory>,
    ledger: Arc<dyn LedgerStore>,
}

impl LedgerEngine {
    pub fn new(tenants: Arc<dyn TenantDirectory>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self { tenants, ledger }
    }

    /// Admit a payment submission.
    ///
    /// Exactly one record per (tenant, month, year) may exist in any status;
    /// a second submission for the same month is rejected outright. Deposit
    /// and maintenance are honored only on the tenant's first-ever record.
    pub async fn submit_payment(
        &self,
        req: SubmitPaymentRequest,
    ) -> Result<SubmitOutcome, AppError> {
        req.validate()?;

        let month = Month::parse(&req.month).ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!(
                "month must be one of the twelve calendar month names, got {:?}",
                req.month
            ))
        })?;

        let tenant = self
            .tenants
            .get_tenant(&req.tenant_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Tenant not found: {}", req.tenant_id))
            })?;

        // First-payment probe has to run before our own insert lands.
        let is_first = !self.ledger.has_any_for_tenant(&tenant.tenant_id).await?;

        // Caller rent wins, else the standing rent on file. Adopted back into
        // the tenant profile only on the first payment; later values are
        // stored on the record but never change the standing rent.
        let effective_rent = req.rent.unwrap_or(tenant.rent);

        let deposit = if is_first {
            req.deposit.unwrap_or(0.0)
        } else {
            0.0
        };
        let maintenance = if is_first {
            req.maintenance.unwrap_or(0.0)
        } else {
            0.0
        };

        let record = PaymentRecord {
            id: Uuid::new_v4(),
            tenant_id: tenant.tenant_id.clone(),
            tenant_name: tenant.name.clone(),
            room: tenant.room.clone(),
            month,
            year: req.year,
            rent: effective_rent,
            deposit,
            maintenance,
            method: req.method.unwrap_or_else(|| METHOD_CASH.to_string()),
            status: req.status.unwrap_or_else(|| STATUS_PAID.to_string()),
            paid_on: Some(req.paid_on.unwrap_or_else(|| Utc::now().date_naive())),
            created_at: DateTime::now(),
        };

        match self.ledger.insert(&record).await? {
            InsertOutcome::Inserted => {}
            InsertOutcome::Duplicate => {
                metrics::record_conflict();
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Payment already exists for tenant {} in {} {}",
                    tenant.tenant_id,
                    month,
                    req.year
                )));
            }
        }

        tracing::info!(
            payment_id = %record.id,
            tenant_id = %tenant.tenant_id,
            month = %month,
            year = req.year,
            rent = effective_rent,
            is_first,
            "Payment recorded"
        );
        metrics::record_payment(&record.status);

        // The payment is durable from here on: adoption and backfill failures
        // must not unwind it.
        let mut warnings = Vec::new();
        let mut rent_adopted = false;

        if is_first && (tenant.rent - effective_rent).abs() > f64::EPSILON {
            match self.tenants.set_rent(&tenant.tenant_id, effective_rent).await {
                Ok(()) => {
                    rent_adopted = true;
                    tracing::info!(
                        tenant_id = %tenant.tenant_id,
                        old_rent = tenant.rent,
                        new_rent = effective_rent,
                        "Standing rent adopted from first payment"
                    );
                }
                Err(err) => {
                    tracing::warn!(tenant_id = %tenant.tenant_id, error = %err, "Rent adoption failed");
                    warnings.push(format!("rent adoption failed: {}", err));
                }
            }
        }

        let backfilled = self
            .backfill_gaps(
                &tenant,
                MonthYear::new(month, req.year),
                effective_rent,
                &mut warnings,
            )
            .await;

        Ok(SubmitOutcome {
            record,
            backfilled,
            rent_adopted,
            warnings,
        })
    }

    /// Insert "pending" placeholders for every month in
    /// `[join month, paid month)` that has no record yet.
    ///
    /// Each check-and-insert is independent; a failure partway through is
    /// recorded as a warning and the loop keeps going, so a later submission
    /// or a repair pass converges on the remaining gaps.
    async fn backfill_gaps(
        &self,
        tenant: &Tenant,
        paid: MonthYear,
        rent_snapshot: f64,
        warnings: &mut Vec<String>,
    ) -> Vec<MonthYear> {
        let Some(join_seq) = tenant.join_month_seq() else {
            return Vec::new();
        };

        let mut inserted = Vec::new();

        for seq in join_seq..paid.seq() {
            let due = MonthYear::from_seq(seq);

            let existing = match self
                .ledger
                .find_by_tenant_month_year(&tenant.tenant_id, due.month, due.year)
                .await
            {
                Ok(existing) => existing,
                Err(err) => {
                    tracing::warn!(
                        tenant_id = %tenant.tenant_id,
                        month = %due.month,
                        year = due.year,
                        error = %err,
                        "Backfill existence check failed"
                    );
                    warnings.push(format!(
                        "backfill check failed for {} {}: {}",
                        due.month, due.year, err
                    ));
                    continue;
                }
            };
            if existing.is_some() {
                continue;
            }

            let placeholder = PaymentRecord {
                id: Uuid::new_v4(),
                tenant_id: tenant.tenant_id.clone(),
                tenant_name: tenant.name.clone(),
                room: tenant.room.clone(),
                month: due.month,
                year: due.year,
                rent: rent_snapshot,
                deposit: 0.0,
                maintenance: 0.0,
                method: METHOD_PENDING.to_string(),
                status: STATUS_PENDING.to_string(),
                paid_on: None,
                created_at: DateTime::now(),
            };

            match self.ledger.insert(&placeholder).await {
                Ok(InsertOutcome::Inserted) => {
                    tracing::info!(
                        tenant_id = %tenant.tenant_id,
                        month = %due.month,
                        year = due.year,
                        "Due placeholder created"
                    );
                    inserted.push(due);
                }
                // A concurrent writer filled this month first.
                Ok(InsertOutcome::Duplicate) => {}
                Err(err) => {
                    tracing::warn!(
                        tenant_id = %tenant.tenant_id,
                        month = %due.month,
                        year = due.year,
                        error = %err,
                        "Backfill insert failed"
                    );
                    warnings.push(format!(
                        "backfill insert failed for {} {}: {}",
                        due.month, due.year, err
                    ));
                }
            }
        }

        metrics::record_backfill(inserted.len() as u64);
        inserted
    }

    /// Re-derive and re-apply any missing side effect from a persisted
    /// payment record alone: rent adoption if the record is the tenant's
    /// chronologically first, then a backfill pass up to the record's month.
    pub async fn repair(&self, payment_id: Uuid) -> Result<RepairOutcome, AppError> {
        let record = self
            .ledger
            .get(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payment not found: {}", payment_id)))?;

        if record.is_placeholder() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Cannot repair from a due placeholder; repair targets a submitted payment"
            )));
        }

        let tenant = self
            .tenants
            .get_tenant(&record.tenant_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Tenant not found: {}", record.tenant_id))
            })?;

        let history = self.ledger.list_for_tenant(&record.tenant_id).await?;
        let is_first = history
            .iter()
            .min_by_key(|r| r.created_at)
            .map(|earliest| earliest.id == record.id)
            .unwrap_or(false);

        let mut rent_adopted = false;
        if is_first && (tenant.rent - record.rent).abs() > f64::EPSILON {
            self.tenants.set_rent(&tenant.tenant_id, record.rent).await?;
            rent_adopted = true;
            tracing::info!(
                tenant_id = %tenant.tenant_id,
                new_rent = record.rent,
                "Standing rent re-adopted during repair"
            );
        }

        let mut warnings = Vec::new();
        let backfilled = self
            .backfill_gaps(&tenant, record.month_year(), record.rent, &mut warnings)
            .await;

        Ok(RepairOutcome {
            rent_adopted,
            backfilled,
            warnings,
        })
    }

    // ---- query/mutation façade ----

    pub async fn list_payments(&self) -> Result<Vec<PaymentRecord>, AppError> {
        self.ledger.list_all().await
    }

    pub async fn payments_for_tenant(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<PaymentRecord>, AppError> {
        self.ledger.list_for_tenant(tenant_id).await
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<PaymentRecord, AppError> {
        self.ledger
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payment not found: {}", id)))
    }

    /// Correct the rent amount on an existing record. Cannot touch the
    /// (tenant, month, year) key, so ledger shape is preserved.
    pub async fn correct_amount(&self, id: Uuid, rent: f64) -> Result<PaymentRecord, AppError> {
        if !rent.is_finite() || rent < 0.0 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "rent must be a non-negative amount"
            )));
        }

        let mut record = self.get_payment(id).await?;
        self.ledger.set_rent_amount(id, rent).await?;
        record.rent = rent;
        Ok(record)
    }

    pub async fn change_status(&self, id: Uuid, status: &str) -> Result<PaymentRecord, AppError> {
        if status.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!("status is required")));
        }
        if status == STATUS_PENDING {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "status {:?} is reserved for system-generated due placeholders",
                STATUS_PENDING
            )));
        }

        let mut record = self.get_payment(id).await?;
        self.ledger.set_status(id, status).await?;
        record.status = status.to_string();
        Ok(record)
    }

    pub async fn change_method(&self, id: Uuid, method: &str) -> Result<PaymentRecord, AppError> {
        if method.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!("method is required")));
        }
        if method == METHOD_PENDING {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "method {:?} is reserved for system-generated due placeholders",
                METHOD_PENDING
            )));
        }

        let mut record = self.get_payment(id).await?;
        self.ledger.set_method(id, method).await?;
        record.method = method.to_string();
        Ok(record)
    }

    pub async fn delete_payment(&self, id: Uuid) -> Result<(), AppError> {
        if !self.ledger.delete(id).await? {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Payment not found: {}",
                id
            )));
        }
        Ok(())
    }
}
