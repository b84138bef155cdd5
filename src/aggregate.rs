use crate::models::{
    AdministrationRecord, CAMPAIGN_START, Category, DailyAdministration, DailyDeliveries,
    DeliveryRecord, NationalCaseRecord, Supplier,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A date-keyed row of a grouped series whose numeric columns are
/// addressed by name.
pub trait DailyRow {
    type Field: Copy;

    fn date(&self) -> NaiveDate;
    fn value(&self, field: Self::Field) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryField {
    Doses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdministrationField {
    FirstDose,
    SecondDose,
    Category(Category),
}

impl DailyRow for DailyDeliveries {
    type Field = DeliveryField;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, field: DeliveryField) -> u64 {
        match field {
            DeliveryField::Doses => self.doses_delivered,
        }
    }
}

impl DailyRow for DailyAdministration {
    type Field = AdministrationField;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self, field: AdministrationField) -> u64 {
        match field {
            AdministrationField::FirstDose => self.first_dose,
            AdministrationField::SecondDose => self.second_dose,
            AdministrationField::Category(category) => self.categories.get(category),
        }
    }
}

pub fn aggregate_deliveries(rows: &[DeliveryRecord]) -> Vec<DailyDeliveries> {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for row in rows {
        let doses = by_date.entry(row.date).or_default();
        *doses = doses.saturating_add(row.doses_delivered);
    }

    by_date
        .into_iter()
        .map(|(date, doses_delivered)| DailyDeliveries {
            date,
            doses_delivered,
        })
        .collect()
}

/// Groups administrations by date across every supplier.
pub fn aggregate_administrations(rows: &[AdministrationRecord]) -> Vec<DailyAdministration> {
    group_by_date(rows.iter())
}

/// Groups the administrations of a single supplier by date.
pub fn aggregate_by_supplier(
    rows: &[AdministrationRecord],
    supplier: Supplier,
) -> Vec<DailyAdministration> {
    group_by_date(rows.iter().filter(|row| supplier.matches(&row.supplier)))
}

fn group_by_date<'a>(
    rows: impl Iterator<Item = &'a AdministrationRecord>,
) -> Vec<DailyAdministration> {
    let mut by_date: BTreeMap<NaiveDate, DailyAdministration> = BTreeMap::new();
    for row in rows {
        let day = by_date
            .entry(row.date)
            .or_insert_with(|| DailyAdministration::empty(row.date));
        day.first_dose = day.first_dose.saturating_add(row.first_dose);
        day.second_dose = day.second_dose.saturating_add(row.second_dose);
        day.categories.absorb(&row.categories);
    }

    by_date.into_values().collect()
}

pub fn row_on<T: DailyRow>(series: &[T], date: NaiveDate) -> Option<&T> {
    series.iter().find(|row| row.date() == date)
}

/// Sum of `field` over `[from, to]`, both ends inclusive.
pub fn total_between<T: DailyRow>(
    series: &[T],
    field: T::Field,
    from: NaiveDate,
    to: NaiveDate,
) -> u64 {
    series
        .iter()
        .filter(|row| (from..=to).contains(&row.date()))
        .fold(0u64, |acc, row| acc.saturating_add(row.value(field)))
}

pub fn total_since_campaign_start<T: DailyRow>(
    series: &[T],
    field: T::Field,
    as_of: NaiveDate,
) -> u64 {
    total_between(series, field, CAMPAIGN_START, as_of)
}

/// Picks the day a group of metrics is read from: `today` when any of the
/// group's tables already has a row for it, otherwise the day before.
pub fn reporting_day(today: NaiveDate, has_row: impl Fn(NaiveDate) -> bool) -> NaiveDate {
    if has_row(today) {
        today
    } else {
        today.pred_opt().unwrap_or(today)
    }
}

/// Row every tracked field of `series` is read from for `today`.
pub fn fallback_row<T: DailyRow>(series: &[T], today: NaiveDate) -> Option<&T> {
    let day = reporting_day(today, |date| row_on(series, date).is_some());
    row_on(series, day)
}

pub fn today_or_fallback<T: DailyRow>(series: &[T], field: T::Field, today: NaiveDate) -> u64 {
    fallback_row(series, today)
        .map(|row| row.value(field))
        .unwrap_or(0)
}

/// First difference of the cumulative deaths column. The first element has
/// no predecessor and carries the first cumulative value unchanged.
pub fn new_deaths(records: &[NationalCaseRecord]) -> Vec<i64> {
    let mut previous: Option<u64> = None;
    records
        .iter()
        .map(|record| {
            let current = record.cumulative_deaths as i64;
            let delta = match previous {
                Some(prior) => current - prior as i64,
                None => current,
            };
            previous = Some(record.cumulative_deaths);
            delta
        })
        .collect()
}

pub fn cumulative<T: DailyRow>(series: &[T], field: T::Field) -> Vec<u64> {
    series
        .iter()
        .scan(0u64, |running, row| {
            *running = running.saturating_add(row.value(field));
            Some(*running)
        })
        .collect()
}

pub fn max_daily<T: DailyRow>(series: &[T], field: T::Field) -> u64 {
    series.iter().map(|row| row.value(field)).max().unwrap_or(0)
}
