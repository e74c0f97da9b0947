//! Payment ledger endpoints: submission, queries, the closed mutation set
//! and the side-effect repair pass.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        ChangeMethodRequest, ChangeStatusRequest, CorrectAmountRequest, PaymentResponse,
        RepairResponse, SubmitPaymentRequest, SubmitPaymentResponse,
    },
    AppState,
};

/// Submit a payment. Returns 201 with the created record and the side
/// effects performed; 409 when a record for the month already exists.
pub async fn submit_payment(
    State(state): State<AppState>,
    Json(payload): Json<SubmitPaymentRequest>,
) -> Result<(StatusCode, Json<SubmitPaymentResponse>), AppError> {
    let outcome = state.engine.submit_payment(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitPaymentResponse {
            payment: PaymentResponse::from(outcome.record),
            backfilled: outcome.backfilled,
            rent_adopted: outcome.rent_adopted,
            warnings: outcome.warnings,
        }),
    ))
}

pub async fn list_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let records = state.engine.list_payments().await?;
    Ok(Json(records.into_iter().map(PaymentResponse::from).collect()))
}

pub async fn tenant_payments(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let records = state.engine.payments_for_tenant(&tenant_id).await?;
    Ok(Json(records.into_iter().map(PaymentResponse::from).collect()))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, AppError> {
    let record = state.engine.get_payment(payment_id).await?;
    Ok(Json(PaymentResponse::from(record)))
}

pub async fn correct_amount(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<CorrectAmountRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    payload.validate()?;
    let record = state.engine.correct_amount(payment_id, payload.rent).await?;
    Ok(Json(PaymentResponse::from(record)))
}

pub async fn change_status(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<ChangeStatusRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    payload.validate()?;
    let record = state
        .engine
        .change_status(payment_id, &payload.status)
        .await?;
    Ok(Json(PaymentResponse::from(record)))
}

pub async fn change_method(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<ChangeMethodRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    payload.validate()?;
    let record = state
        .engine
        .change_method(payment_id, &payload.method)
        .await?;
    Ok(Json(PaymentResponse::from(record)))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.engine.delete_payment(payment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn repair_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<RepairResponse>, AppError> {
    let outcome = state.engine.repair(payment_id).await?;
    Ok(Json(RepairResponse {
        rent_adopted: outcome.rent_adopted,
        backfilled: outcome.backfilled,
        warnings: outcome.warnings,
    }))
}
