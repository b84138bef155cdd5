use chrono::NaiveDate;
use serde::Serialize;

/// First day of the vaccination campaign.
pub const CAMPAIGN_START: NaiveDate = match NaiveDate::from_ymd_opt(2020, 12, 27) {
    Some(date) => date,
    None => panic!("invalid campaign start date"),
};

/// Official completion target drawn as the reference line on the forecast chart.
pub const GOVERNMENT_TARGET: NaiveDate = match NaiveDate::from_ymd_opt(2021, 10, 30) {
    Some(date) => date,
    None => panic!("invalid government target date"),
};

/// Population denominator used for every coverage percentage.
pub const POPULATION: u64 = 60_360_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HealthWorkers,
    NonHealthStaff,
    CareHomeResidents,
    Over80,
    ArmedForces,
    SchoolStaff,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::HealthWorkers,
        Category::NonHealthStaff,
        Category::CareHomeResidents,
        Category::Over80,
        Category::ArmedForces,
        Category::SchoolStaff,
        Category::Other,
    ];

    /// Column carrying this category in the administrations CSV.
    pub fn column(self) -> &'static str {
        match self {
            Category::HealthWorkers => "categoria_operatori_sanitari_sociosanitari",
            Category::NonHealthStaff => "categoria_personale_non_sanitario",
            Category::CareHomeResidents => "categoria_ospiti_rsa",
            Category::Over80 => "categoria_over80",
            Category::ArmedForces => "categoria_forze_armate",
            Category::SchoolStaff => "categoria_personale_scolastico",
            Category::Other => "categoria_altro",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::HealthWorkers => "Operatori Sanitari",
            Category::NonHealthStaff => "Operatori non Sanitari",
            Category::CareHomeResidents => "RSA",
            Category::Over80 => "Over 80",
            Category::ArmedForces => "Forze Armate",
            Category::SchoolStaff => "Personale Scolastico",
            Category::Other => "Altro",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Category::HealthWorkers => "#FF4272",
            Category::NonHealthStaff => "#F2665C",
            Category::CareHomeResidents => "#DBAF48",
            Category::Over80 => "#50DE8B",
            Category::ArmedForces => "#4B8CDE",
            Category::SchoolStaff => "#68D8DE",
            Category::Other => "#844BDB",
        }
    }

    fn slot(self) -> usize {
        match self {
            Category::HealthWorkers => 0,
            Category::NonHealthStaff => 1,
            Category::CareHomeResidents => 2,
            Category::Over80 => 3,
            Category::ArmedForces => 4,
            Category::SchoolStaff => 5,
            Category::Other => 6,
        }
    }
}

/// Dose counts keyed by [`Category`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts([u64; 7]);

impl CategoryCounts {
    pub fn get(&self, category: Category) -> u64 {
        self.0[category.slot()]
    }

    pub fn set(&mut self, category: Category, value: u64) {
        self.0[category.slot()] = value;
    }

    pub fn absorb(&mut self, other: &CategoryCounts) {
        for category in Category::ALL {
            let slot = category.slot();
            self.0[slot] = self.0[slot].saturating_add(other.0[slot]);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AgeBracket {
    #[serde(rename = "16-19")]
    From16To19,
    #[serde(rename = "20-29")]
    From20To29,
    #[serde(rename = "30-39")]
    From30To39,
    #[serde(rename = "40-49")]
    From40To49,
    #[serde(rename = "50-59")]
    From50To59,
    #[serde(rename = "60-69")]
    From60To69,
    #[serde(rename = "70-79")]
    From70To79,
    #[serde(rename = "80-89")]
    From80To89,
    #[serde(rename = "90+")]
    Over90,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 9] = [
        AgeBracket::From16To19,
        AgeBracket::From20To29,
        AgeBracket::From30To39,
        AgeBracket::From40To49,
        AgeBracket::From50To59,
        AgeBracket::From60To69,
        AgeBracket::From70To79,
        AgeBracket::From80To89,
        AgeBracket::Over90,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::From16To19 => "16-19",
            AgeBracket::From20To29 => "20-29",
            AgeBracket::From30To39 => "30-39",
            AgeBracket::From40To49 => "40-49",
            AgeBracket::From50To59 => "50-59",
            AgeBracket::From60To69 => "60-69",
            AgeBracket::From70To79 => "70-79",
            AgeBracket::From80To89 => "80-89",
            AgeBracket::Over90 => "90+",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|bracket| bracket.label() == label)
    }

    pub fn color(self) -> &'static str {
        match self {
            AgeBracket::From16To19 => "#DEB1FA",
            AgeBracket::From20To29 => "#D298FA",
            AgeBracket::From30To39 => "#CD85F9",
            AgeBracket::From40To49 => "#C670F9",
            AgeBracket::From50To59 => "#BF53FB",
            AgeBracket::From60To69 => "#A93AE0",
            AgeBracket::From70To79 => "#832DAD",
            AgeBracket::From80To89 => "#491961",
            AgeBracket::Over90 => "#2E0F3D",
        }
    }
}

/// Suppliers charted in the per-supplier breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Supplier {
    Pfizer,
    Moderna,
    AstraZeneca,
    Janssen,
}

impl Supplier {
    pub const ALL: [Supplier; 4] = [
        Supplier::Pfizer,
        Supplier::Moderna,
        Supplier::AstraZeneca,
        Supplier::Janssen,
    ];

    /// Value of the `fornitore` column for this supplier.
    pub fn source_label(self) -> &'static str {
        match self {
            Supplier::Pfizer => "Pfizer/BioNTech",
            Supplier::Moderna => "Moderna",
            Supplier::AstraZeneca => "Vaxzevria (AstraZeneca)",
            Supplier::Janssen => "Janssen",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Supplier::Pfizer => "Pfizer",
            Supplier::Moderna => "Moderna",
            Supplier::AstraZeneca => "AstraZeneca",
            Supplier::Janssen => "Janssen",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Supplier::Pfizer => "#95A9DE",
            Supplier::Moderna => "#395499",
            Supplier::AstraZeneca => "#537BE0",
            Supplier::Janssen => "#243561",
        }
    }

    pub fn matches(self, fornitore: &str) -> bool {
        fornitore.trim() == self.source_label()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub date: NaiveDate,
    pub doses_delivered: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdministrationRecord {
    pub date: NaiveDate,
    pub supplier: String,
    pub first_dose: u64,
    pub second_dose: u64,
    pub categories: CategoryCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBracketSummary {
    pub bracket: AgeBracket,
    pub total_doses: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NationalCaseRecord {
    pub date: NaiveDate,
    pub cumulative_deaths: u64,
    pub new_cases: u64,
}

/// The four source tables of one render pass.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub deliveries: Vec<DeliveryRecord>,
    pub administrations: Vec<AdministrationRecord>,
    pub age_brackets: Vec<AgeBracketSummary>,
    pub national: Vec<NationalCaseRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyDeliveries {
    pub date: NaiveDate,
    pub doses_delivered: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyAdministration {
    pub date: NaiveDate,
    pub first_dose: u64,
    pub second_dose: u64,
    pub categories: CategoryCounts,
}

impl DailyAdministration {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            first_dose: 0,
            second_dose: 0,
            categories: CategoryCounts::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricCell {
    pub today: u64,
    pub today_display: String,
    pub total: u64,
    pub total_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoveragePanel {
    pub population: u64,
    pub first_dose_total: u64,
    pub first_dose_display: String,
    pub first_dose_pct: f64,
    pub first_dose_pct_display: String,
    pub second_dose_total: u64,
    pub second_dose_display: String,
    pub second_dose_pct: f64,
    pub second_dose_pct_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyPanel {
    pub reporting_day: String,
    pub delivered: MetricCell,
    pub administered: MetricCell,
    pub first_dose: MetricCell,
    pub second_dose: MetricCell,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryPanel {
    pub category: Category,
    pub label: &'static str,
    pub color: &'static str,
    pub doses: MetricCell,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeBracketPoint {
    pub bracket: AgeBracket,
    pub color: &'static str,
    pub total_doses: u64,
    pub total_display: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastOutcome {
    pub target_date: Option<String>,
    pub days_to_finish: Option<f64>,
    pub unavailable_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastPanel {
    pub best_day: ForecastOutcome,
    pub trailing_month: ForecastOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub as_of: String,
    pub coverage: CoveragePanel,
    pub daily: DailyPanel,
    pub categories_reporting_day: String,
    pub categories: Vec<CategoryPanel>,
    pub age_brackets: Vec<AgeBracketPoint>,
    pub forecast: ForecastPanel,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedSeries {
    pub name: &'static str,
    pub color: &'static str,
    pub dates: Vec<String>,
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NationalSeries {
    pub dates: Vec<String>,
    pub new_cases: Vec<u64>,
    pub new_deaths: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastLine {
    pub name: &'static str,
    pub color: &'static str,
    pub x: [String; 2],
    pub y: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub campaign_start: String,
    pub dates: Vec<String>,
    pub first_dose: Vec<u64>,
    pub second_dose: Vec<u64>,
    pub coverage: Vec<f64>,
    pub suppliers: Vec<NamedSeries>,
    pub categories: Vec<NamedSeries>,
    pub national: NationalSeries,
    pub forecast_lines: Vec<ForecastLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub series: ChartSeries,
}
