// src/handlers/salary.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    handlers::employee::load_employee,
    models::{
        AggregationSummary, DailySalaryQuery, DailySalaryRecord, FinalizeMonthlyRequest,
        MonthlySalaryQuery, MonthlySalaryRecord, Role, RunAggregationRequest,
    },
    services::aggregator,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

/// Get an employee's daily salary record for a date
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/salary/daily",
    params(
        ("employee_id" = Uuid, Path, description = "Employee ID"),
        DailySalaryQuery,
    ),
    responses(
        (status = 200, description = "Daily salary record", body = DailySalaryRecord),
        (status = 404, description = "No record for that date"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salaries"
)]
pub async fn get_daily_salary(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<DailySalaryQuery>,
) -> AppResult<Json<DailySalaryRecord>> {
    let employee = load_employee(&state, employee_id).await?;
    if auth.employee_id != Some(employee_id) {
        auth.require_role(&[Role::Admin, Role::Hr])?;
        auth.require_company_access(employee.company_id)?;
    }

    let record = sqlx::query_as::<_, DailySalaryRecord>(
        "SELECT * FROM daily_salary_records WHERE employee_id = $1 AND work_date = $2",
    )
    .bind(employee_id)
    .bind(query.date)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "No daily salary record for employee {} on {}",
            employee_id, query.date
        ))
    })?;

    Ok(Json(record))
}

/// Trigger monthly aggregation for a period. Safe to re-run; finalized
/// records are never overwritten. Returns a per-run summary.
#[utoipa::path(
    post,
    path = "/api/v1/salaries/monthly/run",
    request_body = RunAggregationRequest,
    responses(
        (status = 200, description = "Aggregation summary", body = AggregationSummary),
        (status = 400, description = "Invalid month"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salaries"
)]
pub async fn run_monthly_aggregation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<RunAggregationRequest>,
) -> AppResult<Json<AggregationSummary>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;

    let summary = aggregator::aggregate(&state.db, &state.email, body.month, body.year).await?;

    Ok(Json(summary))
}

/// List monthly salary records for a period
#[utoipa::path(
    get,
    path = "/api/v1/salaries/monthly",
    params(MonthlySalaryQuery),
    responses((status = 200, description = "Monthly salary records", body = Vec<MonthlySalaryRecord>)),
    security(("bearer_auth" = [])),
    tag = "Salaries"
)]
pub async fn list_monthly_salaries(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<MonthlySalaryQuery>,
) -> AppResult<Json<Vec<MonthlySalaryRecord>>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;

    let company_scope = match auth.role {
        Role::Admin => None,
        _ => auth.company_id,
    };

    let records = sqlx::query_as::<_, MonthlySalaryRecord>(
        r#"SELECT * FROM monthly_salary_records
           WHERE month = $1 AND year = $2
             AND ($3::uuid IS NULL OR company_id = $3)
             AND ($4::uuid IS NULL OR employee_id = $4)
           ORDER BY created_at"#,
    )
    .bind(query.month)
    .bind(query.year)
    .bind(company_scope)
    .bind(query.employee_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(records))
}

/// Manually finalize a monthly salary record. Sets `updated_by`, which
/// excludes the row from automatic recomputation from then on.
#[utoipa::path(
    patch,
    path = "/api/v1/salaries/monthly/{record_id}",
    request_body = FinalizeMonthlyRequest,
    params(("record_id" = Uuid, Path, description = "Monthly salary record ID")),
    responses(
        (status = 200, description = "Record finalized", body = MonthlySalaryRecord),
        (status = 404, description = "Record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salaries"
)]
pub async fn finalize_monthly_salary(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Json(body): Json<FinalizeMonthlyRequest>,
) -> AppResult<Json<MonthlySalaryRecord>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;

    let current = sqlx::query_as::<_, MonthlySalaryRecord>(
        "SELECT * FROM monthly_salary_records WHERE id = $1",
    )
    .bind(record_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Monthly salary record {} not found", record_id)))?;

    auth.require_company_access(current.company_id)?;

    let record = sqlx::query_as::<_, MonthlySalaryRecord>(
        r#"UPDATE monthly_salary_records SET
            normal_salary = COALESCE($1, normal_salary),
            total_salary = COALESCE($2, total_salary),
            bonus = COALESCE($3, bonus),
            bpjs = COALESCE($4, bpjs),
            tax = COALESCE($5, tax),
            updated_by = $6,
            updated_at = NOW()
           WHERE id = $7
           RETURNING *"#,
    )
    .bind(body.normal_salary)
    .bind(body.total_salary)
    .bind(body.bonus)
    .bind(body.bpjs)
    .bind(body.tax)
    .bind(auth.id)
    .bind(record_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(record))
}
