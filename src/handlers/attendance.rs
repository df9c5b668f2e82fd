// src/handlers/attendance.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    handlers::employee::load_employee,
    models::{
        AttendanceEvent, AttendanceQuery, AttendanceType, BackfillAttendanceRequest,
        CheckInRequest, CheckOutRequest, Company, Employee, FaceCheckRequest, Role,
    },
    services::salary::{self, WorkHours},
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{Local, NaiveDateTime};
use tracing::{error, info, warn};
use uuid::Uuid;

async fn load_company(state: &AppState, company_id: Uuid) -> AppResult<Company> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(company_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {} not found", company_id)))
}

/// ADMIN/HR record attendance for their company; an employee account may
/// record its own.
fn authorize(auth: &AuthUser, employee: &Employee) -> AppResult<()> {
    if auth.employee_id == Some(employee.id) {
        return Ok(());
    }
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(employee.company_id)
}

fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// NoSession -> CheckedIn. The open-session invariant is enforced by a
/// partial unique index, not a read-then-insert.
pub(crate) async fn do_check_in(
    state: &AppState,
    employee: &Employee,
    company: &Company,
    at: NaiveDateTime,
    photo: Option<String>,
    location: Option<String>,
    attendance_type: AttendanceType,
) -> AppResult<AttendanceEvent> {
    let closed_today = sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS(
            SELECT 1 FROM attendance_events
            WHERE employee_id = $1 AND check_in::date = $2 AND check_out IS NOT NULL
        )"#,
    )
    .bind(employee.id)
    .bind(at.date())
    .fetch_one(&state.db)
    .await?;

    if closed_today {
        return Err(AppError::Conflict(
            "Employee already completed a session today".to_string(),
        ));
    }

    let hours = WorkHours::from(company);
    let late_minutes = salary::late_minutes_at(&hours, at);
    let description = salary::describe(attendance_type, late_minutes, 0);

    let result = sqlx::query_as::<_, AttendanceEvent>(
        r#"INSERT INTO attendance_events (
            id, employee_id, company_id, check_in, check_out,
            late_minutes, overtime_minutes, description,
            photo_in, photo_out, location, attendance_type,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, NULL, $5, 0, $6, $7, NULL, $8, $9, NOW(), NOW())
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(employee.id)
    .bind(company.id)
    .bind(at)
    .bind(late_minutes)
    .bind(&description)
    .bind(&photo)
    .bind(&location)
    .bind(attendance_type)
    .fetch_one(&state.db)
    .await;

    match result {
        Ok(event) => {
            info!(employee_id = %employee.id, late_minutes, "Checked in");
            Ok(event)
        }
        Err(e) if AppError::is_unique_violation(&e) => Err(AppError::Conflict(
            "An open session already exists for this employee".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// CheckedIn -> CheckedOut, then derive the daily salary record. The
/// attendance write is the source of truth; a salary failure is logged
/// and retryable, never rolled back into the attendance flow.
pub(crate) async fn do_check_out(
    state: &AppState,
    employee: &Employee,
    company: &Company,
    at: NaiveDateTime,
    photo: Option<String>,
    location: Option<String>,
) -> AppResult<AttendanceEvent> {
    let closed = sqlx::query_as::<_, AttendanceEvent>(
        r#"UPDATE attendance_events
           SET check_out = $1,
               photo_out = COALESCE($2, photo_out),
               location = COALESCE($3, location),
               updated_at = NOW()
           WHERE employee_id = $4 AND check_out IS NULL AND check_in <= $1
           RETURNING *"#,
    )
    .bind(at)
    .bind(&photo)
    .bind(&location)
    .bind(employee.id)
    .fetch_optional(&state.db)
    .await?;

    let Some(event) = closed else {
        let open_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attendance_events WHERE employee_id = $1 AND check_out IS NULL)",
        )
        .bind(employee.id)
        .fetch_one(&state.db)
        .await?;

        return Err(if open_exists {
            AppError::Validation("check-out cannot be earlier than check-in".to_string())
        } else {
            AppError::Conflict("No open session to check out".to_string())
        });
    };

    let hours = WorkHours::from(company);
    let card = salary::load_rate_card(&state.db, employee.id, company.id).await?;

    let (late_minutes, overtime_minutes, description, breakdown) = match &card {
        Some(card) => {
            let b = salary::compute(event.check_in, Some(at), &hours, card);
            let d = salary::describe(event.attendance_type, b.late_minutes, b.overtime_minutes);
            (b.late_minutes, b.overtime_minutes, d, Some(b))
        }
        None => {
            let late = salary::late_minutes_at(&hours, event.check_in);
            let overtime = salary::overtime_minutes_at(&hours, at);
            warn!(
                employee_id = %employee.id,
                company_id = %company.id,
                "No rate card resolves; daily salary skipped"
            );
            let d = format!(
                "{}, salary skipped: no policy configured",
                salary::describe(event.attendance_type, late, overtime)
            );
            (late, overtime, d, None)
        }
    };

    let event = sqlx::query_as::<_, AttendanceEvent>(
        r#"UPDATE attendance_events
           SET late_minutes = $1, overtime_minutes = $2, description = $3, updated_at = NOW()
           WHERE id = $4
           RETURNING *"#,
    )
    .bind(late_minutes)
    .bind(overtime_minutes)
    .bind(&description)
    .bind(event.id)
    .fetch_one(&state.db)
    .await?;

    if let Some(b) = breakdown {
        if let Err(e) = salary::upsert_daily_record(&state.db, &event, &b).await {
            error!(employee_id = %employee.id, error = %e, "Daily salary upsert failed");
        }
    }

    info!(employee_id = %employee.id, overtime_minutes, "Checked out");
    Ok(event)
}

/// Record a check-in
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Checked in", body = AttendanceEvent),
        (status = 409, description = "Open session already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CheckInRequest>,
) -> AppResult<(StatusCode, Json<AttendanceEvent>)> {
    let employee = load_employee(&state, body.employee_id).await?;
    if employee.company_id != body.company_id {
        return Err(AppError::Validation(
            "employee does not belong to this company".to_string(),
        ));
    }
    let company = load_company(&state, body.company_id).await?;
    authorize(&auth, &employee)?;

    let at = body.timestamp.unwrap_or_else(now_local);
    let event = do_check_in(
        &state,
        &employee,
        &company,
        at,
        body.photo,
        body.location,
        body.attendance_type.unwrap_or(AttendanceType::Wfo),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Record a check-out and derive the daily salary record
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Checked out", body = AttendanceEvent),
        (status = 409, description = "No open session"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CheckOutRequest>,
) -> AppResult<Json<AttendanceEvent>> {
    let employee = load_employee(&state, body.employee_id).await?;
    let company = load_company(&state, employee.company_id).await?;
    authorize(&auth, &employee)?;

    let at = body.timestamp.unwrap_or_else(now_local);
    let event = do_check_out(&state, &employee, &company, at, body.photo, body.location).await?;

    Ok(Json(event))
}

/// Face-identification attendance: resolves the employee through the
/// local-then-provider chain, then runs the ordinary check-in/check-out
/// transition (check-out when a session is open).
#[utoipa::path(
    post,
    path = "/api/v1/attendance/face",
    request_body = FaceCheckRequest,
    responses(
        (status = 200, description = "Attendance recorded", body = AttendanceEvent),
        (status = 502, description = "Identification failed on both providers"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn face_check(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<FaceCheckRequest>,
) -> AppResult<Json<AttendanceEvent>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(body.company_id)?;

    let employee_id = state.face.identify(body.company_id, &body.embedding).await?;

    let employee = load_employee(&state, employee_id).await?;
    if employee.company_id != body.company_id {
        return Err(AppError::NotFound(
            "Identified employee does not belong to this company".to_string(),
        ));
    }
    let company = load_company(&state, body.company_id).await?;

    let open_session = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM attendance_events WHERE employee_id = $1 AND check_out IS NULL)",
    )
    .bind(employee.id)
    .fetch_one(&state.db)
    .await?;

    let at = body.timestamp.unwrap_or_else(now_local);
    let event = if open_session {
        info!(employee_id = %employee.id, "Face identification resolved to check-out");
        do_check_out(&state, &employee, &company, at, body.photo, body.location).await?
    } else {
        info!(employee_id = %employee.id, "Face identification resolved to check-in");
        do_check_in(
            &state,
            &employee,
            &company,
            at,
            body.photo,
            body.location,
            body.attendance_type.unwrap_or(AttendanceType::Wfo),
        )
        .await?
    };

    Ok(Json(event))
}

/// Administrative backfill of a complete past session. Bypasses the
/// open-session state machine; requires a check-out.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/backfill",
    request_body = BackfillAttendanceRequest,
    responses(
        (status = 201, description = "Attendance backfilled", body = AttendanceEvent),
        (status = 400, description = "Malformed time range"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn backfill(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<BackfillAttendanceRequest>,
) -> AppResult<(StatusCode, Json<AttendanceEvent>)> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(body.company_id)?;

    let employee = load_employee(&state, body.employee_id).await?;
    if employee.company_id != body.company_id {
        return Err(AppError::Validation(
            "employee does not belong to this company".to_string(),
        ));
    }
    if body.check_out <= body.check_in {
        return Err(AppError::Validation(
            "check_out must be after check_in".to_string(),
        ));
    }
    let company = load_company(&state, body.company_id).await?;

    warn!(
        employee_id = %employee.id,
        caller = %auth.id,
        "Backfill bypasses the open-session invariant"
    );

    let hours = WorkHours::from(&company);
    let attendance_type = body.attendance_type.unwrap_or(AttendanceType::Wfo);
    let card = salary::load_rate_card(&state.db, employee.id, company.id).await?;

    let (late_minutes, overtime_minutes, description, breakdown) = match &card {
        Some(card) => {
            let b = salary::compute(body.check_in, Some(body.check_out), &hours, card);
            let d = salary::describe(attendance_type, b.late_minutes, b.overtime_minutes);
            (b.late_minutes, b.overtime_minutes, d, Some(b))
        }
        None => {
            let late = salary::late_minutes_at(&hours, body.check_in);
            let overtime = salary::overtime_minutes_at(&hours, body.check_out);
            warn!(
                employee_id = %employee.id,
                "No rate card resolves; backfilled day has no salary record"
            );
            let d = format!(
                "{}, salary skipped: no policy configured",
                salary::describe(attendance_type, late, overtime)
            );
            (late, overtime, d, None)
        }
    };

    let event = sqlx::query_as::<_, AttendanceEvent>(
        r#"INSERT INTO attendance_events (
            id, employee_id, company_id, check_in, check_out,
            late_minutes, overtime_minutes, description,
            photo_in, photo_out, location, attendance_type,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW(), NOW())
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(employee.id)
    .bind(company.id)
    .bind(body.check_in)
    .bind(body.check_out)
    .bind(late_minutes)
    .bind(overtime_minutes)
    .bind(body.description.as_deref().unwrap_or(&description))
    .bind(&body.photo_in)
    .bind(&body.photo_out)
    .bind(&body.location)
    .bind(attendance_type)
    .fetch_one(&state.db)
    .await?;

    if let Some(b) = breakdown {
        if let Err(e) = salary::upsert_daily_record(&state.db, &event, &b).await {
            error!(employee_id = %employee.id, error = %e, "Daily salary upsert failed");
        }
    }

    Ok((StatusCode::CREATED, Json(event)))
}

/// List attendance events
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses((status = 200, description = "Attendance events", body = Vec<AttendanceEvent>)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
) -> AppResult<Json<Vec<AttendanceEvent>>> {
    let company_scope = match auth.role {
        Role::Admin => query.company_id,
        _ => {
            auth.require_role(&[Role::Hr])?;
            match auth.company_id {
                Some(id) => Some(id),
                None => {
                    return Err(AppError::Forbidden(
                        "Account is not linked to a company".to_string(),
                    ));
                }
            }
        }
    };

    let events = sqlx::query_as::<_, AttendanceEvent>(
        r#"SELECT * FROM attendance_events
           WHERE ($1::uuid IS NULL OR company_id = $1)
             AND ($2::uuid IS NULL OR employee_id = $2)
             AND ($3::date IS NULL OR check_in::date >= $3)
             AND ($4::date IS NULL OR check_in::date <= $4)
           ORDER BY check_in DESC
           LIMIT 500"#,
    )
    .bind(company_scope)
    .bind(query.employee_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(events))
}
