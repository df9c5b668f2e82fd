// src/handlers/employee.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{CreateEmployeeRequest, Employee, Role, UpdateEmployeeRequest},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::warn;
use uuid::Uuid;

pub(crate) async fn load_employee(state: &AppState, employee_id: Uuid) -> AppResult<Employee> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))
}

/// Onboard a new employee
#[utoipa::path(
    post,
    path = "/api/v1/companies/{company_id}/employees",
    request_body = CreateEmployeeRequest,
    params(("company_id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 409, description = "Employee email already exists in company"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(body): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    auth.require_company_access(company_id)?;

    let existing = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM employees WHERE company_id = $1 AND email = $2",
    )
    .bind(company_id)
    .bind(&body.email)
    .fetch_optional(&state.db)
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Employee with email '{}' already exists in this company",
            body.email
        )));
    }

    let employee = sqlx::query_as::<_, Employee>(
        r#"INSERT INTO employees (
            id, company_id, position_id, first_name, last_name, email, phone,
            face_embedding, is_active, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, NOW(), NOW())
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(company_id)
    .bind(body.position_id)
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.face_embedding)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

/// List a company's employees
#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}/employees",
    params(("company_id" = Uuid, Path, description = "Company ID")),
    responses((status = 200, description = "List of employees", body = Vec<Employee>)),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<Vec<Employee>>> {
    auth.require_company_access(company_id)?;

    let employees = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE company_id = $1 ORDER BY created_at DESC",
    )
    .bind(company_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(employees))
}

/// Get a single employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee detail", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let employee = load_employee(&state, employee_id).await?;
    auth.require_company_access(employee.company_id)?;

    Ok(Json(employee))
}

/// Update an employee
#[utoipa::path(
    patch,
    path = "/api/v1/employees/{employee_id}",
    request_body = UpdateEmployeeRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<UpdateEmployeeRequest>,
) -> AppResult<Json<Employee>> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    let current = load_employee(&state, employee_id).await?;
    auth.require_company_access(current.company_id)?;

    let employee = sqlx::query_as::<_, Employee>(
        r#"UPDATE employees SET
            position_id = COALESCE($1, position_id),
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            email = COALESCE($4, email),
            phone = COALESCE($5, phone),
            face_embedding = COALESCE($6, face_embedding),
            is_active = COALESCE($7, is_active),
            updated_at = NOW()
           WHERE id = $8
           RETURNING *"#,
    )
    .bind(body.position_id)
    .bind(&body.first_name)
    .bind(&body.last_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.face_embedding)
    .bind(body.is_active)
    .bind(employee_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(employee))
}

/// Administrative cascade delete: removes the employee together with
/// their attendance events and derived salary records.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee and dependent records deleted"),
        (status = 404, description = "Employee not found"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn delete_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_role(&[Role::Admin])?;
    let employee = load_employee(&state, employee_id).await?;
    auth.require_company_access(employee.company_id)?;

    warn!(
        %employee_id,
        "Cascade-deleting employee with attendance and salary records"
    );

    sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(employee_id)
        .execute(&state.db)
        .await?;

    Ok(Json(
        serde_json::json!({ "message": "Employee and dependent records deleted" }),
    ))
}
