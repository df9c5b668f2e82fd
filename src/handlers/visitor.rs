// src/handlers/visitor.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{IssueBadgeRequest, Role, Visitor, VisitorQuery},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Local;
use uuid::Uuid;

/// Issue a visitor badge on arrival
#[utoipa::path(
    post,
    path = "/api/v1/visitors",
    request_body = IssueBadgeRequest,
    responses(
        (status = 201, description = "Badge issued", body = Visitor),
        (status = 409, description = "Badge already outstanding"),
    ),
    security(("bearer_auth" = [])),
    tag = "Visitors"
)]
pub async fn issue_badge(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<IssueBadgeRequest>,
) -> AppResult<(StatusCode, Json<Visitor>)> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(body.company_id)?;

    let result = sqlx::query_as::<_, Visitor>(
        r#"INSERT INTO visitors (
            id, company_id, name, phone, purpose, host_employee_id,
            badge_number, checked_in_at, checked_out_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NULL)
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(body.company_id)
    .bind(&body.name)
    .bind(&body.phone)
    .bind(&body.purpose)
    .bind(body.host_employee_id)
    .bind(&body.badge_number)
    .fetch_one(&state.db)
    .await;

    match result {
        Ok(visitor) => Ok((StatusCode::CREATED, Json(visitor))),
        Err(e) if AppError::is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "Badge '{}' is already outstanding",
            body.badge_number
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Return a badge on departure
#[utoipa::path(
    post,
    path = "/api/v1/visitors/{visitor_id}/return",
    params(("visitor_id" = Uuid, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Badge returned", body = Visitor),
        (status = 409, description = "Badge already returned"),
    ),
    security(("bearer_auth" = [])),
    tag = "Visitors"
)]
pub async fn return_badge(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(visitor_id): Path<Uuid>,
) -> AppResult<Json<Visitor>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;

    let current = sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE id = $1")
        .bind(visitor_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Visitor {} not found", visitor_id)))?;

    auth.require_company_access(current.company_id)?;

    let returned = sqlx::query_as::<_, Visitor>(
        r#"UPDATE visitors SET checked_out_at = NOW()
           WHERE id = $1 AND checked_out_at IS NULL
           RETURNING *"#,
    )
    .bind(visitor_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Conflict("Badge already returned".to_string()))?;

    Ok(Json(returned))
}

/// List a company's visitors for a day (defaults to today)
#[utoipa::path(
    get,
    path = "/api/v1/visitors",
    params(VisitorQuery),
    responses((status = 200, description = "Visitors", body = Vec<Visitor>)),
    security(("bearer_auth" = [])),
    tag = "Visitors"
)]
pub async fn list_visitors(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<VisitorQuery>,
) -> AppResult<Json<Vec<Visitor>>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(query.company_id)?;

    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    let visitors = sqlx::query_as::<_, Visitor>(
        r#"SELECT * FROM visitors
           WHERE company_id = $1 AND checked_in_at::date = $2
           ORDER BY checked_in_at DESC"#,
    )
    .bind(query.company_id)
    .bind(date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(visitors))
}
