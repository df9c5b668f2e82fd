// src/services/salary.rs

use crate::{
    errors::{AppError, AppResult},
    models::{AttendanceEvent, AttendanceType, Company, DailySalaryRecord, RateCard},
};
use chrono::{Datelike, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

/// A company's standard shift, wall-clock.
#[derive(Debug, Clone, Copy)]
pub struct WorkHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl From<&Company> for WorkHours {
    fn from(company: &Company) -> Self {
        WorkHours {
            start: company.standard_start_time,
            end: company.standard_end_time,
        }
    }
}

/// Result of the daily salary computation. `hours_worked` and
/// `total_salary` are None while the session has no check-out; nothing is
/// persisted to the ledger until both are present.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBreakdown {
    pub late_minutes: i32,
    pub overtime_minutes: i32,
    pub hours_worked: Option<Decimal>,
    pub normal_salary: Decimal,
    pub late_deduction: Decimal,
    pub total_salary: Option<Decimal>,
}

/// Monetary rounding: half-up at 2 decimal places, applied once per
/// output quantity.
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Whole minutes between two wall-clock times, rounded up. Zero when
/// `actual` is at or before `reference`.
fn ceil_minutes(reference: NaiveTime, actual: NaiveTime) -> i32 {
    let secs = (actual - reference).num_seconds();
    if secs <= 0 {
        0
    } else {
        (secs as u64).div_ceil(60) as i32
    }
}

/// Lateness of a check-in against the company's start time. Needed at
/// check-in time, before any rate card is consulted.
pub fn late_minutes_at(hours: &WorkHours, check_in: NaiveDateTime) -> i32 {
    ceil_minutes(hours.start, check_in.time())
}

/// Overtime of a check-out against the company's end time.
pub fn overtime_minutes_at(hours: &WorkHours, check_out: NaiveDateTime) -> i32 {
    ceil_minutes(hours.end, check_out.time())
}

/// Turn an attendance event into a daily salary breakdown.
///
/// Lateness is measured from the company's standard start time; the grace
/// period subtracts before the whole-hour rounding, and hours round UP:
/// `late_hours = ceil(max(0, late_minutes - max_late_minutes) / 60)`.
/// Overtime past the standard end time is tracked; it only pays when the
/// rate card's `overtime_paid` flag is set and the overtime clears
/// `min_overtime_minutes`.
pub fn compute(
    check_in: NaiveDateTime,
    check_out: Option<NaiveDateTime>,
    hours: &WorkHours,
    card: &RateCard,
) -> DailyBreakdown {
    let late_minutes = ceil_minutes(hours.start, check_in.time());
    let billable_late_minutes = (late_minutes - card.max_late_minutes).max(0);
    let late_hours = Decimal::from((billable_late_minutes as u32).div_ceil(60));

    let normal_salary = round_money(card.standard_hours * card.hourly_rate);
    let late_deduction = round_money(late_hours * card.hourly_rate * card.late_deduction_rate);

    let Some(out) = check_out else {
        return DailyBreakdown {
            late_minutes,
            overtime_minutes: 0,
            hours_worked: None,
            normal_salary,
            late_deduction,
            total_salary: None,
        };
    };

    let overtime_minutes = ceil_minutes(hours.end, out.time());

    let worked_secs = (out - check_in).num_seconds().max(0);
    let exact_hours = Decimal::from(worked_secs) / dec!(3600);

    // Full precision until the final rounding of each quantity.
    let payable_hours = (card.standard_hours - late_hours)
        .min(exact_hours)
        .max(Decimal::ZERO);
    let mut total = payable_hours * card.hourly_rate;

    if card.overtime_paid && overtime_minutes >= card.min_overtime_minutes {
        let overtime_hours = Decimal::from(overtime_minutes) / dec!(60);
        total += overtime_hours * card.hourly_rate * card.overtime_rate;
    }

    DailyBreakdown {
        late_minutes,
        overtime_minutes,
        hours_worked: Some(round_money(exact_hours)),
        normal_salary,
        late_deduction,
        total_salary: Some(round_money(total)),
    }
}

/// Human-readable session summary stored on the attendance event.
pub fn describe(attendance_type: AttendanceType, late_minutes: i32, overtime_minutes: i32) -> String {
    let kind = match attendance_type {
        AttendanceType::Wfo => "WFO",
        AttendanceType::Wfh => "WFH",
    };
    let mut parts = vec![kind.to_string()];
    if late_minutes > 0 {
        parts.push(format!("late {late_minutes}m"));
    } else {
        parts.push("on time".to_string());
    }
    if overtime_minutes > 0 {
        parts.push(format!("overtime {overtime_minutes}m"));
    }
    parts.join(", ")
}

/// Resolve the active rate card for an employee: an employee-specific
/// card wins over the company default. None means no salary policy is
/// configured and the caller must surface that, never default to zero.
pub async fn load_rate_card(
    db: &PgPool,
    employee_id: Uuid,
    company_id: Uuid,
) -> AppResult<Option<RateCard>> {
    sqlx::query_as::<_, RateCard>(
        r#"SELECT * FROM rate_cards
           WHERE employee_id = $1 OR (company_id = $2 AND employee_id IS NULL)
           ORDER BY employee_id NULLS LAST
           LIMIT 1"#,
    )
    .bind(employee_id)
    .bind(company_id)
    .fetch_optional(db)
    .await
    .map_err(Into::into)
}

/// Single-statement upsert into the daily ledger, unique on
/// (employee_id, work_date). Concurrent check-outs for the same day land
/// on one row.
pub async fn upsert_daily_record(
    db: &PgPool,
    event: &AttendanceEvent,
    breakdown: &DailyBreakdown,
) -> AppResult<DailySalaryRecord> {
    let (hours_worked, total_salary) = match (breakdown.hours_worked, breakdown.total_salary) {
        (Some(h), Some(t)) => (h, t),
        _ => {
            return Err(AppError::Internal(
                "daily ledger rows require a closed session".to_string(),
            ));
        }
    };

    let work_date = event.check_in.date();

    sqlx::query_as::<_, DailySalaryRecord>(
        r#"INSERT INTO daily_salary_records (
            id, employee_id, company_id, work_date,
            hours_worked, late_deduction, normal_salary, total_salary,
            month, year, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
        ON CONFLICT (employee_id, work_date) DO UPDATE
        SET hours_worked = EXCLUDED.hours_worked,
            late_deduction = EXCLUDED.late_deduction,
            normal_salary = EXCLUDED.normal_salary,
            total_salary = EXCLUDED.total_salary,
            updated_at = NOW()
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(event.employee_id)
    .bind(event.company_id)
    .bind(work_date)
    .bind(hours_worked)
    .bind(breakdown.late_deduction)
    .bind(breakdown.normal_salary)
    .bind(total_salary)
    .bind(work_date.month() as i32)
    .bind(work_date.year())
    .fetch_one(db)
    .await
    .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn card(hourly_rate: Decimal, standard_hours: Decimal, max_late_minutes: i32) -> RateCard {
        RateCard {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            employee_id: None,
            hourly_rate,
            standard_hours,
            max_late_minutes,
            late_deduction_rate: dec!(1),
            min_overtime_minutes: 0,
            overtime_rate: dec!(1),
            overtime_paid: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn hours(start: &str, end: &str) -> WorkHours {
        WorkHours {
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
        }
    }

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_time(time.parse().unwrap())
    }

    #[test]
    fn on_time_check_in_has_no_lateness() {
        let b = compute(
            at("2024-03-04", "09:00:00"),
            Some(at("2024-03-04", "17:00:00")),
            &hours("09:00:00", "17:00:00"),
            &card(dec!(10000), dec!(8), 10),
        );
        assert_eq!(b.late_minutes, 0);
        assert_eq!(b.late_deduction, dec!(0));
    }

    #[test]
    fn one_minute_late_rounds_to_one_minute() {
        let b = compute(
            at("2024-03-04", "09:01:00"),
            None,
            &hours("09:00:00", "17:00:00"),
            &card(dec!(10000), dec!(8), 0),
        );
        assert_eq!(b.late_minutes, 1);
        // 1 minute beyond a zero grace period still costs a whole hour
        assert_eq!(b.late_deduction, dec!(10000));
    }

    #[test]
    fn lateness_within_grace_deducts_nothing() {
        let b = compute(
            at("2024-03-04", "09:01:00"),
            None,
            &hours("09:00:00", "17:00:00"),
            &card(dec!(10000), dec!(8), 10),
        );
        assert_eq!(b.late_minutes, 1);
        assert_eq!(b.late_deduction, dec!(0));
    }

    #[test]
    fn partial_seconds_round_up_to_the_next_minute() {
        let b = compute(
            at("2024-03-04", "09:00:30"),
            None,
            &hours("09:00:00", "17:00:00"),
            &card(dec!(10000), dec!(8), 10),
        );
        assert_eq!(b.late_minutes, 1);
    }

    #[test]
    fn fifteen_minutes_late_with_ten_minute_grace() {
        // 15 late, 10 grace -> 5 billable minutes -> 1 whole hour deducted
        let b = compute(
            at("2024-03-04", "09:15:00"),
            Some(at("2024-03-04", "17:00:00")),
            &hours("09:00:00", "17:00:00"),
            &card(dec!(10000), dec!(8), 10),
        );
        assert_eq!(b.late_minutes, 15);
        assert_eq!(b.normal_salary, dec!(80000.00));
        assert_eq!(b.late_deduction, dec!(10000.00));
        // 7 payable hours out of 7.75 worked
        assert_eq!(b.total_salary, Some(dec!(70000.00)));
    }

    #[test]
    fn overtime_is_tracked_but_unpaid_by_default() {
        let b = compute(
            at("2024-03-04", "09:00:00"),
            Some(at("2024-03-04", "18:30:00")),
            &hours("09:00:00", "17:00:00"),
            &card(dec!(10000), dec!(8), 10),
        );
        assert_eq!(b.overtime_minutes, 90);
        assert_eq!(b.hours_worked, Some(dec!(9.50)));
        assert_eq!(b.total_salary, Some(dec!(80000.00)));
    }

    #[test]
    fn overtime_pays_when_the_policy_flag_is_set() {
        let mut c = card(dec!(10000), dec!(8), 10);
        c.overtime_paid = true;
        c.overtime_rate = dec!(1.5);
        c.min_overtime_minutes = 30;
        let b = compute(
            at("2024-03-04", "09:00:00"),
            Some(at("2024-03-04", "18:30:00")),
            &hours("09:00:00", "17:00:00"),
            &c,
        );
        // 8h * 10000 + 1.5h * 10000 * 1.5
        assert_eq!(b.total_salary, Some(dec!(102500.00)));
    }

    #[test]
    fn overtime_below_the_threshold_stays_unpaid() {
        let mut c = card(dec!(10000), dec!(8), 10);
        c.overtime_paid = true;
        c.min_overtime_minutes = 60;
        let b = compute(
            at("2024-03-04", "09:00:00"),
            Some(at("2024-03-04", "17:30:00")),
            &hours("09:00:00", "17:00:00"),
            &c,
        );
        assert_eq!(b.overtime_minutes, 30);
        assert_eq!(b.total_salary, Some(dec!(80000.00)));
    }

    #[test]
    fn normal_salary_has_no_floating_point_drift() {
        let b = compute(
            at("2024-03-04", "09:00:00"),
            Some(at("2024-03-04", "17:00:00")),
            &hours("09:00:00", "17:00:00"),
            &card(dec!(12500), dec!(8), 10),
        );
        assert_eq!(b.normal_salary, dec!(100000.00));
    }

    #[test]
    fn open_session_yields_no_hours_or_total() {
        let b = compute(
            at("2024-03-04", "09:15:00"),
            None,
            &hours("09:00:00", "17:00:00"),
            &card(dec!(10000), dec!(8), 10),
        );
        assert_eq!(b.hours_worked, None);
        assert_eq!(b.total_salary, None);
        assert_eq!(b.late_minutes, 15);
    }

    #[test]
    fn payable_hours_never_go_negative() {
        // 10 late hours against an 8 hour shift
        let b = compute(
            at("2024-03-04", "19:10:00"),
            Some(at("2024-03-04", "20:00:00")),
            &hours("09:00:00", "17:00:00"),
            &card(dec!(10000), dec!(8), 0),
        );
        assert_eq!(b.total_salary, Some(dec!(0.00)));
    }

    #[test]
    fn short_day_pays_actual_hours_worked() {
        let b = compute(
            at("2024-03-04", "09:00:00"),
            Some(at("2024-03-04", "13:00:00")),
            &hours("09:00:00", "17:00:00"),
            &card(dec!(10000), dec!(8), 10),
        );
        assert_eq!(b.hours_worked, Some(dec!(4.00)));
        assert_eq!(b.total_salary, Some(dec!(40000.00)));
    }

    #[test]
    fn describe_summarizes_the_session() {
        assert_eq!(describe(AttendanceType::Wfo, 0, 0), "WFO, on time");
        assert_eq!(
            describe(AttendanceType::Wfh, 15, 90),
            "WFH, late 15m, overtime 90m"
        );
    }
}
