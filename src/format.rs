use crate::models::POPULATION;
use num_format::{Locale, ToFormattedString};

/// Groups thousands with '.', as Italian readers expect (`1.234.567`).
pub fn format_thousands(n: u64) -> String {
    n.to_formatted_string(&Locale::it)
}

/// Share of the population, in percent, rounded to two decimals with ties
/// going to the even digit.
pub fn population_percentage(value: u64) -> f64 {
    percentage_of(value, POPULATION)
}

pub fn percentage_of(value: u64, population: u64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    let pct = value as f64 / population as f64 * 100.0;
    (pct * 100.0).round_ties_even() / 100.0
}

pub fn format_percentage(pct: f64) -> String {
    format!("{pct:.2}")
}
