use serde::Serialize;
use std::{env, fmt, time::Duration};

pub const DEFAULT_PORT: u16 = 8050;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const DELIVERIES_URL: &str = "https://raw.githubusercontent.com/italia/covid19-opendata-vaccini/master/dati/consegne-vaccini-latest.csv";
const ADMINISTRATIONS_URL: &str = "https://raw.githubusercontent.com/italia/covid19-opendata-vaccini/master/dati/somministrazioni-vaccini-latest.csv";
const AGE_BRACKETS_URL: &str = "https://raw.githubusercontent.com/italia/covid19-opendata-vaccini/master/dati/anagrafica-vaccini-summary-latest.csv";
const NATIONAL_URL: &str = "https://raw.githubusercontent.com/pcm-dpc/COVID-19/master/dati-andamento-nazionale/dpc-covid19-ita-andamento-nazionale.csv";

/// The four CSV datasets the dashboard is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Deliveries,
    Administrations,
    AgeBrackets,
    National,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Deliveries,
        Resource::Administrations,
        Resource::AgeBrackets,
        Resource::National,
    ];

    fn env_key(self) -> &'static str {
        match self {
            Resource::Deliveries => "DASHBOARD_DELIVERIES_URL",
            Resource::Administrations => "DASHBOARD_ADMINISTRATIONS_URL",
            Resource::AgeBrackets => "DASHBOARD_AGE_BRACKETS_URL",
            Resource::National => "DASHBOARD_NATIONAL_URL",
        }
    }

    fn default_url(self) -> &'static str {
        match self {
            Resource::Deliveries => DELIVERIES_URL,
            Resource::Administrations => ADMINISTRATIONS_URL,
            Resource::AgeBrackets => AGE_BRACKETS_URL,
            Resource::National => NATIONAL_URL,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Deliveries => "deliveries",
            Resource::Administrations => "administrations",
            Resource::AgeBrackets => "age brackets",
            Resource::National => "national cases",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub deliveries: String,
    pub administrations: String,
    pub age_brackets: String,
    pub national: String,
}

impl Sources {
    pub fn url(&self, resource: Resource) -> &str {
        match resource {
            Resource::Deliveries => &self.deliveries,
            Resource::Administrations => &self.administrations,
            Resource::AgeBrackets => &self.age_brackets,
            Resource::National => &self.national,
        }
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            deliveries: DELIVERIES_URL.to_string(),
            administrations: ADMINISTRATIONS_URL.to_string(),
            age_brackets: AGE_BRACKETS_URL.to_string(),
            national: NATIONAL_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub sources: Sources,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            sources: Sources::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, falling back to the built-in
    /// defaults for unset or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let fetch_timeout = lookup("DASHBOARD_FETCH_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT);

        let source = |resource: Resource| {
            lookup(resource.env_key())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| resource.default_url().to_string())
        };

        Self {
            port,
            sources: Sources {
                deliveries: source(Resource::Deliveries),
                administrations: source(Resource::Administrations),
                age_brackets: source(Resource::AgeBrackets),
                national: source(Resource::National),
            },
            fetch_timeout,
        }
    }
}
