// src/handlers/rate_card.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    handlers::employee::load_employee,
    models::{RateCard, Role, SetRateCardRequest},
    services::salary,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn validate(body: &SetRateCardRequest) -> AppResult<()> {
    if body.hourly_rate <= dec!(0) {
        return Err(AppError::Validation(
            "hourly_rate must be positive".to_string(),
        ));
    }
    if body.standard_hours <= dec!(0) || body.standard_hours > dec!(24) {
        return Err(AppError::Validation(
            "standard_hours must be between 0 and 24".to_string(),
        ));
    }
    if body.max_late_minutes < 0 {
        return Err(AppError::Validation(
            "max_late_minutes cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Set or replace the company-level rate card
#[utoipa::path(
    put,
    path = "/api/v1/companies/{company_id}/rate-card",
    request_body = SetRateCardRequest,
    params(("company_id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Rate card saved", body = RateCard),
        (status = 400, description = "Invalid rates"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rate Cards"
)]
pub async fn set_company_rate_card(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(body): Json<SetRateCardRequest>,
) -> AppResult<Json<RateCard>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(company_id)?;
    validate(&body)?;

    let card = sqlx::query_as::<_, RateCard>(
        r#"INSERT INTO rate_cards (
            id, company_id, employee_id, hourly_rate, standard_hours,
            max_late_minutes, late_deduction_rate, min_overtime_minutes,
            overtime_rate, overtime_paid, created_at, updated_at
        ) VALUES ($1, $2, NULL, $3, $4, $5, COALESCE($6, 1), COALESCE($7, 0), COALESCE($8, 1), COALESCE($9, FALSE), NOW(), NOW())
        ON CONFLICT (company_id) WHERE employee_id IS NULL DO UPDATE
        SET hourly_rate = EXCLUDED.hourly_rate,
            standard_hours = EXCLUDED.standard_hours,
            max_late_minutes = EXCLUDED.max_late_minutes,
            late_deduction_rate = EXCLUDED.late_deduction_rate,
            min_overtime_minutes = EXCLUDED.min_overtime_minutes,
            overtime_rate = EXCLUDED.overtime_rate,
            overtime_paid = EXCLUDED.overtime_paid,
            updated_at = NOW()
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(company_id)
    .bind(body.hourly_rate)
    .bind(body.standard_hours)
    .bind(body.max_late_minutes)
    .bind(body.late_deduction_rate)
    .bind(body.min_overtime_minutes)
    .bind(body.overtime_rate)
    .bind(body.overtime_paid)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(card))
}

/// Set or replace an employee-specific rate card (overrides the company default)
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/rate-card",
    request_body = SetRateCardRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Rate card saved", body = RateCard),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rate Cards"
)]
pub async fn set_employee_rate_card(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<SetRateCardRequest>,
) -> AppResult<Json<RateCard>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    let employee = load_employee(&state, employee_id).await?;
    auth.require_company_access(employee.company_id)?;
    validate(&body)?;

    let card = sqlx::query_as::<_, RateCard>(
        r#"INSERT INTO rate_cards (
            id, company_id, employee_id, hourly_rate, standard_hours,
            max_late_minutes, late_deduction_rate, min_overtime_minutes,
            overtime_rate, overtime_paid, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 1), COALESCE($8, 0), COALESCE($9, 1), COALESCE($10, FALSE), NOW(), NOW())
        ON CONFLICT (employee_id) WHERE employee_id IS NOT NULL DO UPDATE
        SET hourly_rate = EXCLUDED.hourly_rate,
            standard_hours = EXCLUDED.standard_hours,
            max_late_minutes = EXCLUDED.max_late_minutes,
            late_deduction_rate = EXCLUDED.late_deduction_rate,
            min_overtime_minutes = EXCLUDED.min_overtime_minutes,
            overtime_rate = EXCLUDED.overtime_rate,
            overtime_paid = EXCLUDED.overtime_paid,
            updated_at = NOW()
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(employee.company_id)
    .bind(employee_id)
    .bind(body.hourly_rate)
    .bind(body.standard_hours)
    .bind(body.max_late_minutes)
    .bind(body.late_deduction_rate)
    .bind(body.min_overtime_minutes)
    .bind(body.overtime_rate)
    .bind(body.overtime_paid)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(card))
}

/// Resolve the active rate card for an employee (employee-specific wins
/// over the company default)
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/rate-card",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Resolved rate card", body = RateCard),
        (status = 422, description = "No salary policy configured"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rate Cards"
)]
pub async fn get_employee_rate_card(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<RateCard>> {
    let employee = load_employee(&state, employee_id).await?;
    auth.require_company_access(employee.company_id)?;

    let card = salary::load_rate_card(&state.db, employee_id, employee.company_id)
        .await?
        .ok_or_else(|| {
            AppError::PolicyMissing(format!(
                "no rate card for employee {} or its company",
                employee_id
            ))
        })?;

    Ok(Json(card))
}
