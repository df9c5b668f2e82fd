// src/handlers/position.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{CreatePositionRequest, Position, Role},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Create a position within a company
#[utoipa::path(
    post,
    path = "/api/v1/companies/{company_id}/positions",
    request_body = CreatePositionRequest,
    params(("company_id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 201, description = "Position created", body = Position),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Positions"
)]
pub async fn create_position(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(body): Json<CreatePositionRequest>,
) -> AppResult<(StatusCode, Json<Position>)> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(company_id)?;

    let position = sqlx::query_as::<_, Position>(
        r#"INSERT INTO positions (id, company_id, title, level, created_at)
           VALUES ($1, $2, $3, $4, NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(company_id)
    .bind(&body.title)
    .bind(&body.level)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(position)))
}

/// List a company's positions
#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}/positions",
    params(("company_id" = Uuid, Path, description = "Company ID")),
    responses((status = 200, description = "List of positions", body = Vec<Position>)),
    security(("bearer_auth" = [])),
    tag = "Positions"
)]
pub async fn list_positions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<Position>>> {
    auth.require_company_access(company_id)?;

    let positions = sqlx::query_as::<_, Position>(
        "SELECT * FROM positions WHERE company_id = $1 ORDER BY title",
    )
    .bind(company_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(positions))
}

/// Delete a position
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{company_id}/positions/{position_id}",
    params(
        ("company_id" = Uuid, Path, description = "Company ID"),
        ("position_id" = Uuid, Path, description = "Position ID"),
    ),
    responses(
        (status = 200, description = "Position deleted"),
        (status = 404, description = "Position not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Positions"
)]
pub async fn delete_position(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((company_id, position_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(company_id)?;

    let result = sqlx::query("DELETE FROM positions WHERE id = $1 AND company_id = $2")
        .bind(position_id)
        .bind(company_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Position {} not found",
            position_id
        )));
    }

    Ok(Json(
        serde_json::json!({ "message": "Position deleted successfully" }),
    ))
}
