// src/openapi.rs

use crate::models::{
    AggregationSummary, ApplicationStatus, ApplyTeamRequest, AttendanceEvent, AttendanceType,
    AuthResponse, BackfillAttendanceRequest, CheckInRequest, CheckOutRequest, Company,
    CreateCompanyRequest, CreateEmployeeRequest, CreatePositionRequest, CreateTeamRequest,
    CreateUserRequest, DailySalaryRecord, DecideApplicationRequest, Employee, FaceCheckRequest,
    FinalizeMonthlyRequest, IssueBadgeRequest, LoginRequest, MonthlySalaryRecord, Position,
    RateCard, RegisterRequest, Role, RunAggregationRequest, SetRateCardRequest, Team,
    TeamApplication, UpdateEmployeeRequest, UpdateWorkHoursRequest, UserPublic, Visitor,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Ops API",
        version = "1.0.0",
        description = "Multi-tenant HR operations backend built with Rust and Axum. \
            Covers company/employee/position management, attendance capture with \
            face-identification check-in, daily and monthly salary computation, \
            a visitor-badge subsystem and a youth-sports application workflow.",
        license(name = "MIT")
    ),
    paths(
        // Auth
        crate::handlers::users::register,
        crate::handlers::users::login,
        crate::handlers::users::logout,
        crate::handlers::users::create_user,
        // Companies
        crate::handlers::company::create_company,
        crate::handlers::company::list_companies,
        crate::handlers::company::get_company,
        crate::handlers::company::update_work_hours,
        // Positions
        crate::handlers::position::create_position,
        crate::handlers::position::list_positions,
        crate::handlers::position::delete_position,
        // Employees
        crate::handlers::employee::create_employee,
        crate::handlers::employee::list_employees,
        crate::handlers::employee::get_employee,
        crate::handlers::employee::update_employee,
        crate::handlers::employee::delete_employee,
        // Rate cards
        crate::handlers::rate_card::set_company_rate_card,
        crate::handlers::rate_card::set_employee_rate_card,
        crate::handlers::rate_card::get_employee_rate_card,
        // Attendance
        crate::handlers::attendance::check_in,
        crate::handlers::attendance::check_out,
        crate::handlers::attendance::face_check,
        crate::handlers::attendance::backfill,
        crate::handlers::attendance::list_attendance,
        // Salaries
        crate::handlers::salary::get_daily_salary,
        crate::handlers::salary::run_monthly_aggregation,
        crate::handlers::salary::list_monthly_salaries,
        crate::handlers::salary::finalize_monthly_salary,
        // Visitors
        crate::handlers::visitor::issue_badge,
        crate::handlers::visitor::return_badge,
        crate::handlers::visitor::list_visitors,
        // Teams
        crate::handlers::team::create_team,
        crate::handlers::team::list_teams,
        crate::handlers::team::apply_to_team,
        crate::handlers::team::list_applications,
        crate::handlers::team::decide_application,
    ),
    components(
        schemas(
            Role, RegisterRequest, CreateUserRequest, LoginRequest, AuthResponse, UserPublic,
            Company, CreateCompanyRequest, UpdateWorkHoursRequest,
            Position, CreatePositionRequest,
            Employee, CreateEmployeeRequest, UpdateEmployeeRequest,
            RateCard, SetRateCardRequest,
            AttendanceType, AttendanceEvent, CheckInRequest, CheckOutRequest,
            BackfillAttendanceRequest, FaceCheckRequest,
            DailySalaryRecord, MonthlySalaryRecord,
            RunAggregationRequest, AggregationSummary, FinalizeMonthlyRequest,
            Visitor, IssueBadgeRequest,
            ApplicationStatus, Team, CreateTeamRequest, TeamApplication,
            ApplyTeamRequest, DecideApplicationRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Accounts, login and token revocation"),
        (name = "Companies", description = "Tenants and their standard work hours"),
        (name = "Positions", description = "Company positions"),
        (name = "Employees", description = "Employee profiles"),
        (name = "Rate Cards", description = "Pay policy configuration"),
        (name = "Attendance", description = "Check-in/check-out sessions and face identification"),
        (name = "Salaries", description = "Daily ledger and monthly aggregation"),
        (name = "Visitors", description = "Front-desk badge tracking"),
        (name = "Teams", description = "Youth-sports teams and applications"),
    )
)]
pub struct ApiDoc;
