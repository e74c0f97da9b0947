//! MongoDB-backed implementations of the Tenant Directory and Ledger Store.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{bson::doc, Collection, Database, IndexModel};
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{Month, PaymentRecord, Tenant};
use crate::services::stores::{InsertOutcome, LedgerStore, TenantDirectory};

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[derive(Clone)]
pub struct MongoTenantDirectory {
    collection: Collection<Tenant>,
}

impl MongoTenantDirectory {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("tenants"),
        }
    }
}

#[async_trait]
impl TenantDirectory for MongoTenantDirectory {
    async fn get_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = self
            .collection
            .find_one(doc! { "_id": tenant_id }, None)
            .await?;
        Ok(tenant)
    }

    async fn set_rent(&self, tenant_id: &str, new_rent: f64) -> Result<(), AppError> {
        self.collection
            .update_one(
                doc! { "_id": tenant_id },
                doc! { "$set": { "rent": new_rent } },
                None,
            )
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct MongoLedgerStore {
    collection: Collection<PaymentRecord>,
}

impl MongoLedgerStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("payments"),
        }
    }

    /// Create the composite uniqueness constraint the admission path relies
    /// on: at most one record per (tenant_id, month, year), any status.
    pub async fn init_indexes(&self) -> Result<(), AppError> {
        let unique_month_index = IndexModel::builder()
            .keys(doc! { "tenant_id": 1, "month": 1, "year": 1 })
            .options(
                IndexOptions::builder()
                    .name("tenant_month_year_unique_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        let tenant_index = IndexModel::builder()
            .keys(doc! { "tenant_id": 1, "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("tenant_history_idx".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes([unique_month_index, tenant_index], None)
            .await?;

        tracing::info!("Ledger store indexes initialized");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MongoLedgerStore {
    async fn insert(&self, record: &PaymentRecord) -> Result<InsertOutcome, AppError> {
        match self.collection.insert_one(record, None).await {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(err) if is_duplicate_key(&err) => Ok(InsertOutcome::Duplicate),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_tenant_month_year(
        &self,
        tenant_id: &str,
        month: Month,
        year: i32,
    ) -> Result<Option<PaymentRecord>, AppError> {
        let filter = doc! {
            "tenant_id": tenant_id,
            "month": month.as_str(),
            "year": year,
        };
        let record = self.collection.find_one(filter, None).await?;
        Ok(record)
    }

    async fn has_any_for_tenant(&self, tenant_id: &str) -> Result<bool, AppError> {
        let record = self
            .collection
            .find_one(doc! { "tenant_id": tenant_id }, None)
            .await?;
        Ok(record.is_some())
    }

    async fn list_all(&self) -> Result<Vec<PaymentRecord>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();
        let cursor = self.collection.find(None, Some(options)).await?;
        let records: Vec<PaymentRecord> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<PaymentRecord>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();
        let cursor = self
            .collection
            .find(doc! { "tenant_id": tenant_id }, Some(options))
            .await?;
        let records: Vec<PaymentRecord> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PaymentRecord>, AppError> {
        let record = self
            .collection
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(record)
    }

    async fn set_rent_amount(&self, id: Uuid, rent: f64) -> Result<bool, AppError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id.to_string() },
                doc! { "$set": { "rent": rent } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_status(&self, id: Uuid, status: &str) -> Result<bool, AppError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id.to_string() },
                doc! { "$set": { "status": status } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_method(&self, id: Uuid, method: &str) -> Result<bool, AppError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id.to_string() },
                doc! { "$set": { "method": method } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }
}
