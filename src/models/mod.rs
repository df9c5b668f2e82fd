// src/models/mod.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Roles ────────────────────────────────────────────────────────────────────

// sqlx 0.8: custom Postgres enums need #[sqlx(type_name = "...")] on the enum
// AND must be cast explicitly when used with the query! macros; the runtime
// query_as API decodes them through FromRow without the cast.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Hr,
    Guardian,
    Official,
    Player,
}

// ─── Company ──────────────────────────────────────────────────────────────────

/// A tenant. The standard start/end times are the company's work hours
/// that attendance lateness and overtime are measured against.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub timezone: String,
    pub standard_start_time: NaiveTime,
    pub standard_end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub address: Option<String>,
    pub timezone: Option<String>,
    /// Format: "HH:MM:SS"
    pub standard_start_time: NaiveTime,
    pub standard_end_time: NaiveTime,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWorkHoursRequest {
    pub standard_start_time: NaiveTime,
    pub standard_end_time: NaiveTime,
}

// ─── Position ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Position {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub level: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePositionRequest {
    pub title: String,
    pub level: Option<String>,
}

// ─── Employee ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    pub position_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub face_embedding: Option<Vec<f64>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub position_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub face_embedding: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    pub position_id: Option<Uuid>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub face_embedding: Option<Vec<f64>>,
    pub is_active: Option<bool>,
}

// ─── User Accounts ────────────────────────────────────────────────────────────

#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic {
            id: user.id,
            email: user.email,
            role: user.role,
            company_id: user.company_id,
            employee_id: user.employee_id,
            created_at: user.created_at,
        }
    }
}

// ─── Rate Card ────────────────────────────────────────────────────────────────

/// Pay policy for daily salary computation. A card with `employee_id` set
/// overrides the company-level default for that employee.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RateCard {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub hourly_rate: Decimal,
    /// Expected hours per shift, e.g. 8
    pub standard_hours: Decimal,
    /// Grace period: late minutes at or below this are not deducted
    pub max_late_minutes: i32,
    /// Multiplier on the hourly rate when deducting late hours, e.g. 1
    pub late_deduction_rate: Decimal,
    /// Overtime below this many minutes is ignored for pay purposes
    pub min_overtime_minutes: i32,
    /// Multiplier on the hourly rate for paid overtime, e.g. 1.5
    pub overtime_rate: Decimal,
    /// Overtime is tracked either way; pay only applies when this is set
    pub overtime_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRateCardRequest {
    pub hourly_rate: Decimal,
    pub standard_hours: Decimal,
    pub max_late_minutes: i32,
    pub late_deduction_rate: Option<Decimal>,
    pub min_overtime_minutes: Option<i32>,
    pub overtime_rate: Option<Decimal>,
    pub overtime_paid: Option<bool>,
}

// ─── Attendance ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "attendance_type", rename_all = "snake_case")]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceType {
    Wfo,
    Wfh,
}

/// One work session. `check_out` stays null while the session is open;
/// at most one open session exists per employee.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceEvent {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    /// Company-local wall clock
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
    pub late_minutes: i32,
    pub overtime_minutes: i32,
    pub description: Option<String>,
    pub photo_in: Option<String>,
    pub photo_out: Option<String>,
    pub location: Option<String>,
    pub attendance_type: AttendanceType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckInRequest {
    pub employee_id: Uuid,
    pub company_id: Uuid,
    /// Defaults to the current local time
    pub timestamp: Option<NaiveDateTime>,
    pub photo: Option<String>,
    pub location: Option<String>,
    pub attendance_type: Option<AttendanceType>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckOutRequest {
    pub employee_id: Uuid,
    pub timestamp: Option<NaiveDateTime>,
    pub photo: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BackfillAttendanceRequest {
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub check_in: NaiveDateTime,
    pub check_out: NaiveDateTime,
    pub photo_in: Option<String>,
    pub photo_out: Option<String>,
    pub location: Option<String>,
    pub attendance_type: Option<AttendanceType>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FaceCheckRequest {
    pub company_id: Uuid,
    /// Face embedding computed by the capture device
    pub embedding: Vec<f64>,
    pub photo: Option<String>,
    pub location: Option<String>,
    pub attendance_type: Option<AttendanceType>,
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AttendanceQuery {
    pub employee_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ─── Daily Salary Ledger ──────────────────────────────────────────────────────

/// One row per employee per work date, derived from the attendance event
/// at check-out (or administrative backfill). Monetary fields are
/// fixed-point decimals.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailySalaryRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub work_date: NaiveDate,
    pub hours_worked: Decimal,
    pub late_deduction: Decimal,
    pub normal_salary: Decimal,
    pub total_salary: Decimal,
    pub month: i32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct DailySalaryQuery {
    /// Format: "YYYY-MM-DD"
    pub date: NaiveDate,
}

// ─── Monthly Salary ───────────────────────────────────────────────────────────

/// Aggregated month of daily records. `updated_by` set means a human
/// finalized the row and automation leaves it alone.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MonthlySalaryRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub normal_salary: Decimal,
    pub total_salary: Decimal,
    pub bonus: Decimal,
    pub bpjs: Decimal,
    pub tax: Decimal,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RunAggregationRequest {
    /// 1-12
    pub month: i32,
    pub year: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AggregationSummary {
    pub month: i32,
    pub year: i32,
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FinalizeMonthlyRequest {
    pub normal_salary: Option<Decimal>,
    pub total_salary: Option<Decimal>,
    pub bonus: Option<Decimal>,
    pub bpjs: Option<Decimal>,
    pub tax: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct MonthlySalaryQuery {
    pub month: i32,
    pub year: i32,
    pub employee_id: Option<Uuid>,
}

// ─── Visitors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Visitor {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub purpose: String,
    pub host_employee_id: Option<Uuid>,
    pub badge_number: String,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueBadgeRequest {
    pub company_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub purpose: String,
    pub host_employee_id: Option<Uuid>,
    pub badge_number: String,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct VisitorQuery {
    pub company_id: Uuid,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

// ─── Teams & Applications ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub age_group: String,
    pub official_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    pub name: String,
    pub age_group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamApplication {
    pub id: Uuid,
    pub team_id: Uuid,
    pub player_first_name: String,
    pub player_last_name: String,
    pub birth_date: NaiveDate,
    pub guardian_user_id: Uuid,
    pub status: ApplicationStatus,
    pub decided_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyTeamRequest {
    pub player_first_name: String,
    pub player_last_name: String,
    /// Format: "YYYY-MM-DD"
    pub birth_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideApplicationRequest {
    pub approve: bool,
}

// ─── JWT Claims ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub jti: Uuid,
    pub exp: usize,
    pub iat: usize,
}
