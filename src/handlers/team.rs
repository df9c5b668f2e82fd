// src/handlers/team.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        ApplicationStatus, ApplyTeamRequest, CreateTeamRequest, DecideApplicationRequest, Role,
        Team, TeamApplication,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::warn;
use uuid::Uuid;

/// Create a youth-sports team
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 409, description = "Team name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Teams"
)]
pub async fn create_team(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateTeamRequest>,
) -> AppResult<(StatusCode, Json<Team>)> {
    auth.require_role(&[Role::Admin, Role::Official])?;

    let official = (auth.role == Role::Official).then_some(auth.id);

    let result = sqlx::query_as::<_, Team>(
        r#"INSERT INTO teams (id, name, age_group, official_user_id, created_at)
           VALUES ($1, $2, $3, $4, NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(&body.name)
    .bind(&body.age_group)
    .bind(official)
    .fetch_one(&state.db)
    .await;

    match result {
        Ok(team) => Ok((StatusCode::CREATED, Json(team))),
        Err(e) if AppError::is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "Team '{}' already exists",
            body.name
        ))),
        Err(e) => Err(e.into()),
    }
}

/// List all teams
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    responses((status = 200, description = "Teams", body = Vec<Team>)),
    security(("bearer_auth" = [])),
    tag = "Teams"
)]
pub async fn list_teams(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Team>>> {
    let teams = sqlx::query_as::<_, Team>("SELECT * FROM teams ORDER BY name")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(teams))
}

/// Submit an application for a player (guardian only)
#[utoipa::path(
    post,
    path = "/api/v1/teams/{team_id}/applications",
    request_body = ApplyTeamRequest,
    params(("team_id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 201, description = "Application submitted", body = TeamApplication),
        (status = 404, description = "Team not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Teams"
)]
pub async fn apply_to_team(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
    Json(body): Json<ApplyTeamRequest>,
) -> AppResult<(StatusCode, Json<TeamApplication>)> {
    auth.require_role(&[Role::Guardian])?;

    let team_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM teams WHERE id = $1)")
        .bind(team_id)
        .fetch_one(&state.db)
        .await?;
    if !team_exists {
        return Err(AppError::NotFound(format!("Team {} not found", team_id)));
    }

    let application = sqlx::query_as::<_, TeamApplication>(
        r#"INSERT INTO team_applications (
            id, team_id, player_first_name, player_last_name, birth_date,
            guardian_user_id, status, decided_by, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, 'pending', NULL, NOW(), NOW())
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(team_id)
    .bind(&body.player_first_name)
    .bind(&body.player_last_name)
    .bind(body.birth_date)
    .bind(auth.id)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// List a team's applications
#[utoipa::path(
    get,
    path = "/api/v1/teams/{team_id}/applications",
    params(("team_id" = Uuid, Path, description = "Team ID")),
    responses((status = 200, description = "Applications", body = Vec<TeamApplication>)),
    security(("bearer_auth" = [])),
    tag = "Teams"
)]
pub async fn list_applications(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> AppResult<Json<Vec<TeamApplication>>> {
    auth.require_role(&[Role::Admin, Role::Official])?;

    let applications = sqlx::query_as::<_, TeamApplication>(
        "SELECT * FROM team_applications WHERE team_id = $1 ORDER BY created_at",
    )
    .bind(team_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(applications))
}

/// Approve or reject a pending application. The guardian is notified by
/// email; a delivery failure never fails the decision.
#[utoipa::path(
    post,
    path = "/api/v1/applications/{application_id}/decision",
    request_body = DecideApplicationRequest,
    params(("application_id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application decided", body = TeamApplication),
        (status = 409, description = "Application already decided"),
    ),
    security(("bearer_auth" = [])),
    tag = "Teams"
)]
pub async fn decide_application(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(body): Json<DecideApplicationRequest>,
) -> AppResult<Json<TeamApplication>> {
    auth.require_role(&[Role::Admin, Role::Official])?;

    let status = if body.approve {
        ApplicationStatus::Approved
    } else {
        ApplicationStatus::Rejected
    };

    let application = sqlx::query_as::<_, TeamApplication>(
        r#"UPDATE team_applications
           SET status = $1, decided_by = $2, updated_at = NOW()
           WHERE id = $3 AND status = 'pending'
           RETURNING *"#,
    )
    .bind(status)
    .bind(auth.id)
    .bind(application_id)
    .fetch_optional(&state.db)
    .await?;

    let Some(application) = application else {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM team_applications WHERE id = $1)",
        )
        .bind(application_id)
        .fetch_one(&state.db)
        .await?;
        return Err(if exists {
            AppError::Conflict("Application already decided".to_string())
        } else {
            AppError::NotFound(format!("Application {} not found", application_id))
        });
    };

    let guardian_and_team = sqlx::query_as::<_, (String, String)>(
        r#"SELECT u.email, t.name FROM team_applications a
           JOIN users u ON u.id = a.guardian_user_id
           JOIN teams t ON t.id = a.team_id
           WHERE a.id = $1"#,
    )
    .bind(application_id)
    .fetch_optional(&state.db)
    .await?;

    if let Some((guardian_email, team_name)) = guardian_and_team {
        let player = format!(
            "{} {}",
            application.player_first_name, application.player_last_name
        );
        if let Err(e) = state
            .email
            .send_application_decision_email(&guardian_email, &player, &team_name, body.approve)
            .await
        {
            warn!(%application_id, error = %e, "Decision email failed");
        }
    }

    Ok(Json(application))
}
