//! Linear projections of the date first-dose coverage reaches the whole
//! population.
//!
//! Both projections are presentational. A zero denominator is reported as
//! [`ForecastError`] and shown as "forecast unavailable" by the page.

use crate::aggregate::{AdministrationField, max_daily, total_between};
use crate::models::DailyAdministration;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime};
use thiserror::Error;

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Projected dates must land within years `1..=9999`.
const LAST_PROJECTED_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ForecastError {
    #[error("no administration data")]
    NoData,
    #[error("forecast denominator is zero")]
    DivisionByZero,
    #[error("projected date is out of range")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub days_to_finish: f64,
    pub target_date: NaiveDate,
}

/// `(population - total_first) / max_daily - elapsed_days`.
///
/// Subtracting the elapsed campaign days is kept as-is; the result can be
/// negative, which places the target date in the past.
pub fn best_day_days_to_finish(
    max_daily: u64,
    population: u64,
    total_first: u64,
    elapsed_days: usize,
) -> Result<f64, ForecastError> {
    if max_daily == 0 {
        return Err(ForecastError::DivisionByZero);
    }
    let remaining = population as f64 - total_first as f64;
    Ok(remaining / max_daily as f64 - elapsed_days as f64)
}

/// Projection at the best single-day first-dose rate seen so far.
pub fn best_day_projection(
    series: &[DailyAdministration],
    total_first: u64,
    population: u64,
    today: NaiveDate,
) -> Result<Projection, ForecastError> {
    if series.is_empty() {
        return Err(ForecastError::NoData);
    }
    let best = max_daily(series, AdministrationField::FirstDose);
    let days_to_finish = best_day_days_to_finish(best, population, total_first, series.len())?;
    Ok(Projection {
        days_to_finish,
        target_date: project_date(today, days_to_finish)?,
    })
}

/// `population / month_sum * window_days`, where `month_sum` counts first
/// doses over `[today - 1 month, today]`.
pub fn trailing_month_days_to_finish(
    month_sum: u64,
    population: u64,
    window_days: i64,
) -> Result<f64, ForecastError> {
    if month_sum == 0 {
        return Err(ForecastError::DivisionByZero);
    }
    Ok(population as f64 / month_sum as f64 * window_days as f64)
}

/// Projection at the average first-dose rate of the trailing calendar month.
pub fn trailing_month_projection(
    series: &[DailyAdministration],
    population: u64,
    today: NaiveDate,
) -> Result<Projection, ForecastError> {
    if series.is_empty() {
        return Err(ForecastError::NoData);
    }
    let month_start = today
        .checked_sub_months(Months::new(1))
        .ok_or(ForecastError::OutOfRange)?;
    let month_sum = total_between(series, AdministrationField::FirstDose, month_start, today);
    let window_days = (today - month_start).num_days();
    let days_to_finish = trailing_month_days_to_finish(month_sum, population, window_days)?;
    Ok(Projection {
        days_to_finish,
        target_date: project_date(today, days_to_finish)?,
    })
}

/// Adds fractional days to midnight of `today` and keeps the calendar date.
pub fn project_date(today: NaiveDate, days: f64) -> Result<NaiveDate, ForecastError> {
    if !days.is_finite() {
        return Err(ForecastError::OutOfRange);
    }
    let micros = days * MICROS_PER_DAY;
    if micros.abs() >= i64::MAX as f64 {
        return Err(ForecastError::OutOfRange);
    }
    let date = today
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::microseconds(micros as i64))
        .map(|moment| moment.date())
        .ok_or(ForecastError::OutOfRange)?;
    if !(1..=LAST_PROJECTED_YEAR).contains(&date.year()) {
        return Err(ForecastError::OutOfRange);
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn first_doses(start: NaiveDate, counts: &[u64]) -> Vec<DailyAdministration> {
        counts
            .iter()
            .enumerate()
            .map(|(offset, count)| {
                let mut row = DailyAdministration::empty(start + Duration::days(offset as i64));
                row.first_dose = *count;
                row
            })
            .collect()
    }

    #[test]
    fn best_day_keeps_elapsed_day_adjustment() {
        let days = best_day_days_to_finish(100_000, 1_000_000, 200_000, 10).unwrap();
        assert_eq!(days, -2.0);
    }

    #[test]
    fn best_day_without_doses_is_unavailable() {
        assert_eq!(
            best_day_days_to_finish(0, 1_000_000, 0, 3),
            Err(ForecastError::DivisionByZero)
        );
        let series = first_doses(day(2021, 1, 1), &[0, 0, 0]);
        assert_eq!(
            best_day_projection(&series, 0, 1_000_000, day(2021, 1, 3)),
            Err(ForecastError::DivisionByZero)
        );
        assert_eq!(
            best_day_projection(&[], 0, 1_000_000, day(2021, 1, 3)),
            Err(ForecastError::NoData)
        );
    }

    #[test]
    fn best_day_projection_offsets_today() {
        // best day 150, remaining 700 -> 4.67 days, minus 3 elapsed days
        let series = first_doses(day(2021, 1, 1), &[100, 50, 150]);
        let projection = best_day_projection(&series, 300, 1_000, day(2021, 1, 3)).unwrap();
        assert_eq!(projection.days_to_finish, 700.0 / 150.0 - 3.0);
        assert_eq!(projection.target_date, day(2021, 1, 4));
    }

    #[test]
    fn trailing_month_uses_calendar_month_window() {
        let today = day(2021, 3, 31);
        // window is [2021-02-28, 2021-03-31] -> 31 days
        let mut series = first_doses(day(2021, 2, 27), &[1_000]);
        series.extend(first_doses(day(2021, 3, 1), &[200; 31]));

        let projection = trailing_month_projection(&series, 6_200, today).unwrap();
        assert_eq!(projection.days_to_finish, 6_200.0 / 6_200.0 * 31.0);
        assert_eq!(projection.target_date, day(2021, 5, 1));
    }

    #[test]
    fn trailing_month_without_recent_doses_is_unavailable() {
        let series = first_doses(day(2021, 1, 1), &[500, 500]);
        assert_eq!(
            trailing_month_projection(&series, 1_000, day(2021, 6, 1)),
            Err(ForecastError::DivisionByZero)
        );
        assert_eq!(
            trailing_month_projection(&[], 1_000, day(2021, 6, 1)),
            Err(ForecastError::NoData)
        );
    }

    #[test]
    fn fractional_days_truncate_to_date() {
        let today = day(2021, 5, 10);
        assert_eq!(project_date(today, 0.0).unwrap(), today);
        assert_eq!(project_date(today, 2.9).unwrap(), day(2021, 5, 12));
        assert_eq!(project_date(today, -0.5).unwrap(), day(2021, 5, 9));
        assert_eq!(project_date(today, -2.0).unwrap(), day(2021, 5, 8));
        assert_eq!(project_date(today, f64::INFINITY), Err(ForecastError::OutOfRange));
    }

    #[test]
    fn dates_past_year_9999_are_out_of_range() {
        let today = day(2021, 1, 1);
        assert_eq!(project_date(today, 2_900_000.0).unwrap(), day(9960, 12, 7));
        assert_eq!(project_date(today, 3_000_000.0), Err(ForecastError::OutOfRange));
        assert_eq!(project_date(today, -750_000.0), Err(ForecastError::OutOfRange));
    }

    #[test]
    fn slow_campaigns_agree_on_out_of_range() {
        let today = day(2021, 1, 1);
        let series = first_doses(today, &[1]);
        assert_eq!(
            best_day_projection(&series, 1, 60_360_000, today),
            Err(ForecastError::OutOfRange)
        );
        assert_eq!(
            trailing_month_projection(&series, 60_360_000, today),
            Err(ForecastError::OutOfRange)
        );
    }
}
