// src/handlers/company.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{Company, CreateCompanyRequest, Role, UpdateWorkHoursRequest},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Register a new tenant with its standard work hours
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Malformed work hours"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn create_company(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateCompanyRequest>,
) -> AppResult<(StatusCode, Json<Company>)> {
    auth.require_role(&[Role::Admin])?;

    if body.standard_end_time <= body.standard_start_time {
        return Err(AppError::Validation(
            "standard_end_time must be after standard_start_time".to_string(),
        ));
    }

    let company = sqlx::query_as::<_, Company>(
        r#"INSERT INTO companies (
            id, name, address, timezone, standard_start_time, standard_end_time,
            created_at, updated_at
        ) VALUES ($1, $2, $3, COALESCE($4, 'Asia/Jakarta'), $5, $6, NOW(), NOW())
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(&body.name)
    .bind(&body.address)
    .bind(&body.timezone)
    .bind(body.standard_start_time)
    .bind(body.standard_end_time)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

/// List all companies
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    responses((status = 200, description = "List of companies", body = Vec<Company>)),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn list_companies(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Company>>> {
    auth.require_role(&[Role::Admin])?;

    let companies =
        sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(companies))
}

/// Get a single company
#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}",
    params(("company_id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company detail", body = Company),
        (status = 404, description = "Company not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn get_company(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Company>> {
    auth.require_company_access(company_id)?;

    let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(company_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {} not found", company_id)))?;

    Ok(Json(company))
}

/// Update a company's standard work hours
#[utoipa::path(
    put,
    path = "/api/v1/companies/{company_id}/work-hours",
    request_body = UpdateWorkHoursRequest,
    params(("company_id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Work hours updated", body = Company),
        (status = 404, description = "Company not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn update_work_hours(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(body): Json<UpdateWorkHoursRequest>,
) -> AppResult<Json<Company>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(company_id)?;

    if body.standard_end_time <= body.standard_start_time {
        return Err(AppError::Validation(
            "standard_end_time must be after standard_start_time".to_string(),
        ));
    }

    let company = sqlx::query_as::<_, Company>(
        r#"UPDATE companies
           SET standard_start_time = $1, standard_end_time = $2, updated_at = NOW()
           WHERE id = $3
           RETURNING *"#,
    )
    .bind(body.standard_start_time)
    .bind(body.standard_end_time)
    .bind(company_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Company {} not found", company_id)))?;

    Ok(Json(company))
}
