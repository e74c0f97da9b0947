use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Month, MonthYear, PaymentRecord};

/// Payment submission. Month must be one of the twelve recognized names;
/// everything past (tenant_id, month, year) is optional and defaulted by the
/// engine.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitPaymentRequest {
    // Required trio defaults to empty/zero on deserialization so that a
    // missing field surfaces as a validation failure, not a decode error.
    #[serde(default)]
    #[validate(length(min = 1, message = "tenant_id is required"))]
    pub tenant_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "month is required"))]
    pub month: String,
    #[serde(default)]
    #[validate(range(min = 1, message = "year must be a positive integer"))]
    pub year: i32,
    pub rent: Option<f64>,
    pub deposit: Option<f64>,
    pub maintenance: Option<f64>,
    pub method: Option<String>,
    pub status: Option<String>,
    pub paid_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CorrectAmountRequest {
    #[validate(range(min = 0.0, message = "rent must be non-negative"))]
    pub rent: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeStatusRequest {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeMethodRequest {
    #[validate(length(min = 1, message = "method is required"))]
    pub method: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub tenant_id: String,
    pub tenant_name: String,
    pub room: String,
    pub month: Month,
    pub year: i32,
    pub rent: f64,
    pub deposit: f64,
    pub maintenance: f64,
    pub method: String,
    pub status: String,
    pub paid_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.id,
            tenant_id: record.tenant_id,
            tenant_name: record.tenant_name,
            room: record.room,
            month: record.month,
            year: record.year,
            rent: record.rent,
            deposit: record.deposit,
            maintenance: record.maintenance,
            method: record.method,
            status: record.status,
            paid_on: record.paid_on,
            created_at: record.created_at.to_chrono(),
        }
    }
}

/// Primary success plus the side effects performed. Warnings carry
/// rent-adoption or backfill failures that happened after the payment was
/// already durable.
#[derive(Debug, Serialize)]
pub struct SubmitPaymentResponse {
    pub payment: PaymentResponse,
    pub backfilled: Vec<MonthYear>,
    pub rent_adopted: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RepairResponse {
    pub rent_adopted: bool,
    pub backfilled: Vec<MonthYear>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
