use crate::aggregate::{
    AdministrationField, DeliveryField, aggregate_administrations, aggregate_by_supplier,
    aggregate_deliveries, cumulative, new_deaths, reporting_day, row_on, today_or_fallback,
    total_since_campaign_start,
};
use crate::forecast::{ForecastError, Projection, best_day_projection, trailing_month_projection};
use crate::format::{format_percentage, format_thousands, population_percentage};
use crate::models::{
    AgeBracket, AgeBracketPoint, CAMPAIGN_START, Category, CategoryPanel, ChartSeries,
    CoveragePanel, DailyAdministration, DailyDeliveries, DailyPanel, Dashboard, Datasets,
    ForecastLine, ForecastOutcome, ForecastPanel, GOVERNMENT_TARGET, MetricCell, NamedSeries,
    NationalSeries, POPULATION, Summary, Supplier,
};
use chrono::{Local, NaiveDate};
use tracing::warn;

pub fn build_dashboard(datasets: &Datasets) -> Dashboard {
    build_dashboard_at(Local::now().date_naive(), datasets)
}

pub fn build_dashboard_at(today: NaiveDate, datasets: &Datasets) -> Dashboard {
    let deliveries = aggregate_deliveries(&datasets.deliveries);
    let administrations = aggregate_administrations(&datasets.administrations);

    let total_first =
        total_since_campaign_start(&administrations, AdministrationField::FirstDose, today);
    let total_second =
        total_since_campaign_start(&administrations, AdministrationField::SecondDose, today);

    let best_day = best_day_projection(&administrations, total_first, POPULATION, today);
    let trailing_month = trailing_month_projection(&administrations, POPULATION, today);

    let summary = Summary {
        as_of: today.to_string(),
        coverage: coverage_panel(total_first, total_second),
        daily: daily_panel(today, &deliveries, &administrations, total_first, total_second),
        categories_reporting_day: reporting_day(today, |date| {
            row_on(&administrations, date).is_some()
        })
        .to_string(),
        categories: category_panels(today, &administrations),
        age_brackets: age_bracket_points(datasets),
        forecast: ForecastPanel {
            best_day: outcome("best day", best_day),
            trailing_month: outcome("trailing month", trailing_month),
        },
    };

    let series = chart_series(datasets, &administrations, total_first, best_day, trailing_month);

    Dashboard { summary, series }
}

fn cell(today: u64, total: u64) -> MetricCell {
    MetricCell {
        today,
        today_display: format_thousands(today),
        total,
        total_display: format_thousands(total),
    }
}

fn coverage_panel(total_first: u64, total_second: u64) -> CoveragePanel {
    let first_pct = population_percentage(total_first);
    let second_pct = population_percentage(total_second);
    CoveragePanel {
        population: POPULATION,
        first_dose_total: total_first,
        first_dose_display: format_thousands(total_first),
        first_dose_pct: first_pct,
        first_dose_pct_display: format_percentage(first_pct),
        second_dose_total: total_second,
        second_dose_display: format_thousands(total_second),
        second_dose_pct: second_pct,
        second_dose_pct_display: format_percentage(second_pct),
    }
}

/// Deliveries and administrations share one reporting day: today when either
/// table already has today's rows, otherwise yesterday for every figure.
fn daily_panel(
    today: NaiveDate,
    deliveries: &[DailyDeliveries],
    administrations: &[DailyAdministration],
    total_first: u64,
    total_second: u64,
) -> DailyPanel {
    let day = reporting_day(today, |date| {
        row_on(deliveries, date).is_some() || row_on(administrations, date).is_some()
    });

    let delivered_today = row_on(deliveries, day)
        .map(|row| row.doses_delivered)
        .unwrap_or(0);
    let (first_today, second_today) = row_on(administrations, day)
        .map(|row| (row.first_dose, row.second_dose))
        .unwrap_or((0, 0));
    let total_delivered = total_since_campaign_start(deliveries, DeliveryField::Doses, today);

    DailyPanel {
        reporting_day: day.to_string(),
        delivered: cell(delivered_today, total_delivered),
        administered: cell(
            first_today.saturating_add(second_today),
            total_first.saturating_add(total_second),
        ),
        first_dose: cell(first_today, total_first),
        second_dose: cell(second_today, total_second),
    }
}

fn category_panels(
    today: NaiveDate,
    administrations: &[DailyAdministration],
) -> Vec<CategoryPanel> {
    Category::ALL
        .iter()
        .map(|category| {
            let field = AdministrationField::Category(*category);
            let today_value = today_or_fallback(administrations, field, today);
            let total = total_since_campaign_start(administrations, field, today);
            CategoryPanel {
                category: *category,
                label: category.label(),
                color: category.color(),
                doses: cell(today_value, total),
            }
        })
        .collect()
}

fn age_bracket_points(datasets: &Datasets) -> Vec<AgeBracketPoint> {
    AgeBracket::ALL
        .iter()
        .map(|bracket| {
            let total_doses = datasets
                .age_brackets
                .iter()
                .filter(|summary| summary.bracket == *bracket)
                .fold(0u64, |acc, summary| acc.saturating_add(summary.total_doses));
            AgeBracketPoint {
                bracket: *bracket,
                color: bracket.color(),
                total_doses,
                total_display: format_thousands(total_doses),
            }
        })
        .collect()
}

fn outcome(name: &str, projection: Result<Projection, ForecastError>) -> ForecastOutcome {
    match projection {
        Ok(projection) => ForecastOutcome {
            target_date: Some(projection.target_date.to_string()),
            days_to_finish: Some(projection.days_to_finish),
            unavailable_reason: None,
        },
        Err(err) => {
            warn!(forecast = name, "forecast unavailable: {err}");
            ForecastOutcome {
                target_date: None,
                days_to_finish: None,
                unavailable_reason: Some(err.to_string()),
            }
        }
    }
}

fn chart_series(
    datasets: &Datasets,
    administrations: &[DailyAdministration],
    total_first: u64,
    best_day: Result<Projection, ForecastError>,
    trailing_month: Result<Projection, ForecastError>,
) -> ChartSeries {
    let dates: Vec<String> = administrations
        .iter()
        .map(|row| row.date.to_string())
        .collect();

    let suppliers = Supplier::ALL
        .iter()
        .map(|supplier| {
            let series = aggregate_by_supplier(&datasets.administrations, *supplier);
            NamedSeries {
                name: supplier.label(),
                color: supplier.color(),
                dates: series.iter().map(|row| row.date.to_string()).collect(),
                values: series
                    .iter()
                    .map(|row| row.first_dose.saturating_add(row.second_dose))
                    .collect(),
            }
        })
        .collect();

    let categories = Category::ALL
        .iter()
        .map(|category| NamedSeries {
            name: category.label(),
            color: category.color(),
            dates: dates.clone(),
            values: administrations
                .iter()
                .map(|row| row.categories.get(*category))
                .collect(),
        })
        .collect();

    let coverage = cumulative(administrations, AdministrationField::FirstDose)
        .into_iter()
        .map(|running| running as f64 / POPULATION as f64)
        .collect();

    let national = NationalSeries {
        dates: datasets.national.iter().map(|row| row.date.to_string()).collect(),
        new_cases: datasets.national.iter().map(|row| row.new_cases).collect(),
        new_deaths: new_deaths(&datasets.national),
    };

    ChartSeries {
        campaign_start: CAMPAIGN_START.to_string(),
        first_dose: administrations.iter().map(|row| row.first_dose).collect(),
        second_dose: administrations.iter().map(|row| row.second_dose).collect(),
        dates,
        coverage,
        suppliers,
        categories,
        national,
        forecast_lines: forecast_lines(administrations, total_first, best_day, trailing_month),
    }
}

/// The government target runs from the first administered day at 0% to the
/// official date at 100%; each projection runs from the latest administered
/// day at current coverage to its target date at 100%.
fn forecast_lines(
    administrations: &[DailyAdministration],
    total_first: u64,
    best_day: Result<Projection, ForecastError>,
    trailing_month: Result<Projection, ForecastError>,
) -> Vec<ForecastLine> {
    let (Some(first), Some(last)) = (administrations.first(), administrations.last()) else {
        return Vec::new();
    };
    let coverage = total_first as f64 / POPULATION as f64;

    let mut lines = vec![ForecastLine {
        name: "Previsione del Governo",
        color: "#FA5541",
        x: [first.date.to_string(), GOVERNMENT_TARGET.to_string()],
        y: [0.0, 1.0],
    }];

    let projections = [
        ("Previsione Mensile", "#FA924E", trailing_month),
        ("Previsione Migliore*", "#FAC35A", best_day),
    ];
    for (name, color, projection) in projections {
        if let Ok(projection) = projection {
            lines.push(ForecastLine {
                name,
                color,
                x: [last.date.to_string(), projection.target_date.to_string()],
                y: [coverage, 1.0],
            });
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AdministrationRecord, AgeBracketSummary, CategoryCounts, DeliveryRecord,
        NationalCaseRecord,
    };

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn administration(
        date: NaiveDate,
        supplier: &str,
        first: u64,
        second: u64,
    ) -> AdministrationRecord {
        let mut categories = CategoryCounts::default();
        categories.set(Category::Over80, first);
        categories.set(Category::SchoolStaff, second);
        AdministrationRecord {
            date,
            supplier: supplier.to_string(),
            first_dose: first,
            second_dose: second,
            categories,
        }
    }

    fn delivery(date: NaiveDate, doses_delivered: u64) -> DeliveryRecord {
        DeliveryRecord {
            date,
            doses_delivered,
        }
    }

    fn age_bracket(bracket: AgeBracket, total_doses: u64) -> AgeBracketSummary {
        AgeBracketSummary {
            bracket,
            total_doses,
        }
    }

    fn national(date: NaiveDate, cumulative_deaths: u64, new_cases: u64) -> NationalCaseRecord {
        NationalCaseRecord {
            date,
            cumulative_deaths,
            new_cases,
        }
    }

    fn datasets() -> Datasets {
        Datasets {
            deliveries: vec![
                delivery(day(2020, 12, 26), 9_750),
                delivery(day(2020, 12, 30), 469_950),
                delivery(day(2021, 1, 1), 1_000),
            ],
            administrations: vec![
                administration(day(2020, 12, 27), "Pfizer/BioNTech", 10, 0),
                administration(day(2020, 12, 28), "Pfizer/BioNTech", 15, 5),
                administration(day(2020, 12, 28), "Moderna", 5, 0),
                administration(day(2020, 12, 31), "Moderna", 1_000, 200),
            ],
            age_brackets: vec![
                age_bracket(AgeBracket::Over90, 1_500),
                age_bracket(AgeBracket::From20To29, 30),
            ],
            national: vec![
                national(day(2020, 12, 30), 100, 10),
                national(day(2020, 12, 31), 130, 12),
            ],
        }
    }

    #[test]
    fn coverage_counts_from_campaign_start() {
        let dashboard = build_dashboard_at(day(2021, 1, 1), &datasets());
        let coverage = &dashboard.summary.coverage;
        assert_eq!(coverage.first_dose_total, 1_030);
        assert_eq!(coverage.second_dose_total, 205);
        assert_eq!(coverage.first_dose_display, "1.030");
        assert_eq!(coverage.first_dose_pct_display, "0.00");
        assert_eq!(dashboard.summary.as_of, "2021-01-01");
    }

    #[test]
    fn daily_panel_uses_today_when_any_table_has_it() {
        // only deliveries have a 2021-01-01 row, administrations read 0
        let dashboard = build_dashboard_at(day(2021, 1, 1), &datasets());
        let daily = &dashboard.summary.daily;
        assert_eq!(daily.reporting_day, "2021-01-01");
        assert_eq!(daily.delivered.today, 1_000);
        assert_eq!(daily.first_dose.today, 0);
        assert_eq!(daily.administered.today, 0);
        assert_eq!(daily.delivered.total, 470_950);
        assert_eq!(daily.administered.total, 1_235);
        assert_eq!(daily.administered.total_display, "1.235");
    }

    #[test]
    fn daily_panel_falls_back_to_yesterday_as_a_group() {
        let without_deliveries = Datasets {
            deliveries: Vec::new(),
            ..datasets()
        };
        let dashboard = build_dashboard_at(day(2021, 1, 1), &without_deliveries);
        let daily = &dashboard.summary.daily;
        assert_eq!(daily.reporting_day, "2020-12-31");
        assert_eq!(daily.delivered.today, 0);
        assert_eq!(daily.first_dose.today, 1_000);
        assert_eq!(daily.second_dose.today, 200);
        assert_eq!(daily.administered.today_display, "1.200");
    }

    #[test]
    fn categories_fall_back_independently_of_deliveries() {
        let dashboard = build_dashboard_at(day(2021, 1, 1), &datasets());
        assert_eq!(dashboard.summary.categories_reporting_day, "2020-12-31");
        let over80 = dashboard
            .summary
            .categories
            .iter()
            .find(|panel| panel.category == Category::Over80)
            .expect("over 80 panel");
        assert_eq!(over80.doses.today, 1_000);
        assert_eq!(over80.doses.total, 1_030);
        assert_eq!(dashboard.summary.categories.len(), 7);
    }

    #[test]
    fn category_today_values_use_the_shared_fallback() {
        let data = datasets();
        let today = day(2021, 1, 1);
        let series = aggregate_administrations(&data.administrations);
        let dashboard = build_dashboard_at(today, &data);

        for panel in &dashboard.summary.categories {
            let field = AdministrationField::Category(panel.category);
            assert_eq!(
                panel.doses.today,
                today_or_fallback(&series, field, today),
                "category {:?}",
                panel.category
            );
        }
        let school = dashboard
            .summary
            .categories
            .iter()
            .find(|panel| panel.category == Category::SchoolStaff)
            .expect("school staff panel");
        assert_eq!(school.doses.today, 200);
    }

    #[test]
    fn age_brackets_follow_fixed_order() {
        let dashboard = build_dashboard_at(day(2021, 1, 1), &datasets());
        let brackets = &dashboard.summary.age_brackets;
        assert_eq!(brackets.len(), 9);
        assert_eq!(brackets[0].bracket, AgeBracket::From16To19);
        assert_eq!(brackets[0].total_doses, 0);
        assert_eq!(brackets[1].total_doses, 30);
        assert_eq!(brackets[8].bracket, AgeBracket::Over90);
        assert_eq!(brackets[8].total_display, "1.500");
    }

    #[test]
    fn forecasts_and_lines() {
        let dashboard = build_dashboard_at(day(2021, 1, 1), &datasets());
        let forecast = &dashboard.summary.forecast;
        assert!(forecast.best_day.target_date.is_some());
        assert!(forecast.trailing_month.target_date.is_some());
        assert_eq!(dashboard.series.forecast_lines.len(), 3);
        assert_eq!(dashboard.series.forecast_lines[0].x[1], "2021-10-30");
        assert_eq!(dashboard.series.forecast_lines[1].x[0], "2020-12-31");
    }

    #[test]
    fn far_future_projections_are_unavailable() {
        let today = day(2021, 1, 1);
        let slow = Datasets {
            administrations: vec![administration(today, "Moderna", 1, 0)],
            ..Datasets::default()
        };
        let dashboard = build_dashboard_at(today, &slow);
        let forecast = &dashboard.summary.forecast;
        assert_eq!(forecast.best_day.target_date, None);
        assert_eq!(
            forecast.best_day.unavailable_reason.as_deref(),
            Some("projected date is out of range")
        );
        assert_eq!(forecast.trailing_month.target_date, None);
        assert_eq!(dashboard.series.forecast_lines.len(), 1);
    }

    #[test]
    fn empty_sources_render_unavailable_forecasts() {
        let dashboard = build_dashboard_at(day(2021, 1, 1), &Datasets::default());
        let forecast = &dashboard.summary.forecast;
        assert_eq!(forecast.best_day.target_date, None);
        assert_eq!(
            forecast.best_day.unavailable_reason.as_deref(),
            Some("no administration data")
        );
        assert_eq!(forecast.trailing_month.target_date, None);
        assert!(dashboard.series.forecast_lines.is_empty());
        assert_eq!(dashboard.summary.coverage.first_dose_display, "0");
        assert_eq!(dashboard.summary.daily.delivered.today, 0);
    }

    #[test]
    fn chart_series_cover_every_view() {
        let dashboard = build_dashboard_at(day(2021, 1, 1), &datasets());
        let series = &dashboard.series;
        assert_eq!(series.dates, vec!["2020-12-27", "2020-12-28", "2020-12-31"]);
        assert_eq!(series.first_dose, vec![10, 20, 1_000]);
        assert_eq!(series.suppliers.len(), 4);
        assert_eq!(series.suppliers[0].values, vec![10, 20]);
        assert_eq!(series.suppliers[1].values, vec![5, 1_200]);
        assert!(series.suppliers[2].values.is_empty());
        assert_eq!(series.categories.len(), 7);
        assert_eq!(series.national.new_deaths, vec![100, 30]);
        assert_eq!(series.coverage.len(), 3);
        assert_eq!(series.coverage[2], 1_030.0 / POPULATION as f64);
    }

    #[test]
    fn summary_serializes_labels() {
        let dashboard = build_dashboard_at(day(2021, 1, 1), &datasets());
        let json = serde_json::to_value(&dashboard.summary).unwrap();
        assert_eq!(json["age_brackets"][8]["bracket"], "90+");
        assert_eq!(json["categories"][0]["category"], "health_workers");
        assert_eq!(json["categories"][0]["label"], "Operatori Sanitari");
        assert_eq!(json["daily"]["reporting_day"], "2021-01-01");
        assert!(json["forecast"]["best_day"]["unavailable_reason"].is_null());
    }
}
