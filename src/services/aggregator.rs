// src/services/aggregator.rs

use crate::{
    errors::{AppError, AppResult},
    models::{AggregationSummary, DailySalaryRecord},
    services::email::EmailService,
    state::AppState,
};
use chrono::{Datelike, Local};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    pub company_id: Uuid,
    pub normal_salary: Decimal,
    pub total_salary: Decimal,
}

/// Group a month of ledger rows by employee. `normal_salary` is the MAX
/// across the group (the per-day figure is the standard daily rate, so
/// max guards against a mid-month rate change), `total_salary` the SUM.
pub(crate) fn fold_rows(rows: &[DailySalaryRecord]) -> BTreeMap<Uuid, MonthlyTotals> {
    let mut totals: BTreeMap<Uuid, MonthlyTotals> = BTreeMap::new();
    for row in rows {
        let entry = totals.entry(row.employee_id).or_insert_with(|| MonthlyTotals {
            company_id: row.company_id,
            normal_salary: Decimal::ZERO,
            total_salary: Decimal::ZERO,
        });
        entry.normal_salary = entry.normal_salary.max(row.normal_salary);
        entry.total_salary += row.total_salary;
    }
    totals
}

#[derive(Debug, PartialEq)]
pub(crate) enum WriteOutcome {
    Inserted,
    Updated,
    Skipped,
}

/// The guarded upsert touches zero rows only when a human has finalized
/// the record (`updated_by` set).
pub(crate) fn classify(rows_affected: u64, existed: bool) -> WriteOutcome {
    if rows_affected == 0 {
        WriteOutcome::Skipped
    } else if existed {
        WriteOutcome::Updated
    } else {
        WriteOutcome::Inserted
    }
}

/// Fold a month of the daily ledger into monthly salary records.
///
/// Idempotent and safe to re-run: system-owned rows are overwritten with
/// the fresh totals, finalized rows are skipped, and the read is a
/// point-in-time snapshot so late-arriving daily rows are picked up by
/// the next run. One employee's failure never aborts the batch.
pub async fn aggregate(
    db: &PgPool,
    email: &EmailService,
    month: i32,
    year: i32,
) -> AppResult<AggregationSummary> {
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation(format!(
            "month must be 1-12, got {month}"
        )));
    }

    let rows = sqlx::query_as::<_, DailySalaryRecord>(
        "SELECT * FROM daily_salary_records WHERE month = $1 AND year = $2",
    )
    .bind(month)
    .bind(year)
    .fetch_all(db)
    .await?;

    let totals = fold_rows(&rows);

    // Pre-read only labels the summary counts; correctness rests on the
    // guarded upsert below.
    let existing: HashMap<Uuid, Option<Uuid>> = sqlx::query_as::<_, (Uuid, Option<Uuid>)>(
        "SELECT employee_id, updated_by FROM monthly_salary_records WHERE month = $1 AND year = $2",
    )
    .bind(month)
    .bind(year)
    .fetch_all(db)
    .await?
    .into_iter()
    .collect();

    let mut summary = AggregationSummary {
        month,
        year,
        inserted: 0,
        updated: 0,
        skipped: 0,
        failed: 0,
    };

    for (employee_id, t) in totals {
        let result = sqlx::query(
            r#"INSERT INTO monthly_salary_records (
                id, employee_id, company_id, month, year,
                normal_salary, total_salary, bonus, bpjs, tax,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, 0, NOW(), NOW())
            ON CONFLICT (employee_id, month, year) DO UPDATE
            SET normal_salary = EXCLUDED.normal_salary,
                total_salary = EXCLUDED.total_salary,
                updated_at = NOW()
            WHERE monthly_salary_records.updated_by IS NULL"#,
        )
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(t.company_id)
        .bind(month)
        .bind(year)
        .bind(t.normal_salary)
        .bind(t.total_salary)
        .execute(db)
        .await;

        match result {
            Err(e) => {
                error!(%employee_id, month, year, error = %e, "Monthly upsert failed");
                summary.failed += 1;
            }
            Ok(done) => match classify(done.rows_affected(), existing.contains_key(&employee_id)) {
                WriteOutcome::Skipped => summary.skipped += 1,
                WriteOutcome::Updated => summary.updated += 1,
                WriteOutcome::Inserted => {
                    summary.inserted += 1;
                    notify_employee(db, email, employee_id, month, year, t.total_salary).await;
                }
            },
        }
    }

    info!(
        month,
        year,
        inserted = summary.inserted,
        updated = summary.updated,
        skipped = summary.skipped,
        failed = summary.failed,
        "Monthly aggregation complete"
    );

    Ok(summary)
}

/// Notification is a side effect; failures are logged, never propagated.
async fn notify_employee(
    db: &PgPool,
    email: &EmailService,
    employee_id: Uuid,
    month: i32,
    year: i32,
    total_salary: Decimal,
) {
    let employee = sqlx::query_as::<_, (String, String, String)>(
        "SELECT first_name, last_name, email FROM employees WHERE id = $1",
    )
    .bind(employee_id)
    .fetch_optional(db)
    .await;

    match employee {
        Ok(Some((first_name, last_name, address))) => {
            let name = format!("{first_name} {last_name}");
            if let Err(e) = email
                .send_monthly_salary_email(&address, &name, month, year, total_salary)
                .await
            {
                warn!(%employee_id, error = %e, "Monthly salary email failed");
            }
        }
        Ok(None) => {}
        Err(e) => warn!(%employee_id, error = %e, "Could not load employee for notification"),
    }
}

/// In-process monthly cadence: on the 1st, aggregate the previous month.
/// The on-demand endpoint covers everything else.
pub fn spawn_monthly_schedule(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(3600));
        let mut last_completed: Option<(i32, i32)> = None;

        loop {
            ticker.tick().await;

            let today = Local::now().date_naive();
            if today.day() != 1 {
                continue;
            }
            let Some(prev) = today.pred_opt() else {
                continue;
            };
            let period = (prev.month() as i32, prev.year());
            if last_completed == Some(period) {
                continue;
            }

            match aggregate(&state.db, &state.email, period.0, period.1).await {
                Ok(summary) => {
                    info!(?summary, "Scheduled monthly aggregation finished");
                    last_completed = Some(period);
                }
                Err(e) => error!(error = %e, "Scheduled monthly aggregation failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn row(employee: Uuid, company: Uuid, day: u32, normal: Decimal, total: Decimal) -> DailySalaryRecord {
        DailySalaryRecord {
            id: Uuid::new_v4(),
            employee_id: employee,
            company_id: company,
            work_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            hours_worked: dec!(8),
            late_deduction: dec!(0),
            normal_salary: normal,
            total_salary: total,
            month: 3,
            year: 2024,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn totals_sum_per_employee() {
        let employee = Uuid::new_v4();
        let company = Uuid::new_v4();
        let rows = vec![
            row(employee, company, 4, dec!(80000), dec!(80000.00)),
            row(employee, company, 5, dec!(80000), dec!(75000.00)),
        ];
        let totals = fold_rows(&rows);
        assert_eq!(totals[&employee].total_salary, dec!(155000.00));
        assert_eq!(totals[&employee].normal_salary, dec!(80000));
    }

    #[test]
    fn normal_salary_takes_the_maximum_across_the_month() {
        let employee = Uuid::new_v4();
        let company = Uuid::new_v4();
        let rows = vec![
            row(employee, company, 4, dec!(80000), dec!(80000)),
            row(employee, company, 5, dec!(90000), dec!(90000)),
        ];
        let totals = fold_rows(&rows);
        assert_eq!(totals[&employee].normal_salary, dec!(90000));
    }

    #[test]
    fn employees_fold_independently() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let company = Uuid::new_v4();
        let rows = vec![
            row(a, company, 4, dec!(80000), dec!(80000)),
            row(b, company, 4, dec!(60000), dec!(60000)),
            row(b, company, 5, dec!(60000), dec!(55000)),
        ];
        let totals = fold_rows(&rows);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&a].total_salary, dec!(80000));
        assert_eq!(totals[&b].total_salary, dec!(115000));
    }

    #[test]
    fn folding_twice_is_stable() {
        let employee = Uuid::new_v4();
        let company = Uuid::new_v4();
        let rows = vec![
            row(employee, company, 4, dec!(80000), dec!(80000)),
            row(employee, company, 5, dec!(80000), dec!(75000)),
        ];
        assert_eq!(fold_rows(&rows), fold_rows(&rows));
    }

    #[test]
    fn finalized_rows_classify_as_skipped() {
        assert_eq!(classify(0, true), WriteOutcome::Skipped);
        assert_eq!(classify(1, true), WriteOutcome::Updated);
        assert_eq!(classify(1, false), WriteOutcome::Inserted);
    }
}
