// src/routes/mod.rs

use crate::{
    handlers::{
        attendance::{backfill, check_in, check_out, face_check, list_attendance},
        company::{create_company, get_company, list_companies, update_work_hours},
        employee::{
            create_employee, delete_employee, get_employee, list_employees, update_employee,
        },
        position::{create_position, delete_position, list_positions},
        rate_card::{get_employee_rate_card, set_company_rate_card, set_employee_rate_card},
        salary::{
            finalize_monthly_salary, get_daily_salary, list_monthly_salaries,
            run_monthly_aggregation,
        },
        team::{apply_to_team, create_team, decide_application, list_applications, list_teams},
        users::{create_user, login, logout, register},
        visitor::{issue_badge, list_visitors, return_badge},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Auth ─────────────────────────────────────────────
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/users", post(create_user))
        // ─── Companies ────────────────────────────────────────
        .route("/companies", post(create_company).get(list_companies))
        .route("/companies/{company_id}", get(get_company))
        .route("/companies/{company_id}/work-hours", put(update_work_hours))
        .route("/companies/{company_id}/rate-card", put(set_company_rate_card))
        // ─── Positions ────────────────────────────────────────
        .route(
            "/companies/{company_id}/positions",
            post(create_position).get(list_positions),
        )
        .route(
            "/companies/{company_id}/positions/{position_id}",
            axum::routing::delete(delete_position),
        )
        // ─── Employees ────────────────────────────────────────
        .route(
            "/companies/{company_id}/employees",
            post(create_employee).get(list_employees),
        )
        .route(
            "/employees/{employee_id}",
            get(get_employee)
                .patch(update_employee)
                .delete(delete_employee),
        )
        .route(
            "/employees/{employee_id}/rate-card",
            put(set_employee_rate_card).get(get_employee_rate_card),
        )
        .route("/employees/{employee_id}/salary/daily", get(get_daily_salary))
        // ─── Attendance ───────────────────────────────────────
        .route("/attendance", get(list_attendance))
        .route("/attendance/check-in", post(check_in))
        .route("/attendance/check-out", post(check_out))
        .route("/attendance/face", post(face_check))
        .route("/attendance/backfill", post(backfill))
        // ─── Salaries ─────────────────────────────────────────
        .route("/salaries/monthly/run", post(run_monthly_aggregation))
        .route("/salaries/monthly", get(list_monthly_salaries))
        .route("/salaries/monthly/{record_id}", patch(finalize_monthly_salary))
        // ─── Visitors ─────────────────────────────────────────
        .route("/visitors", post(issue_badge).get(list_visitors))
        .route("/visitors/{visitor_id}/return", post(return_badge))
        // ─── Teams ────────────────────────────────────────────
        .route("/teams", post(create_team).get(list_teams))
        .route(
            "/teams/{team_id}/applications",
            post(apply_to_team).get(list_applications),
        )
        .route(
            "/applications/{application_id}/decision",
            post(decide_application),
        )
}
