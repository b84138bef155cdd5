use crate::config::{Resource, Sources};
use crate::errors::LoadError;
use crate::models::{
    AdministrationRecord, AgeBracket, AgeBracketSummary, Category, CategoryCounts, Datasets,
    DeliveryRecord, NationalCaseRecord,
};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

const DELIVERY_COLUMNS: &[&str] = &["data_consegna", "numero_dosi"];
const AGE_BRACKET_COLUMNS: &[&str] = &["fascia_anagrafica", "totale"];
const NATIONAL_COLUMNS: &[&str] = &["data", "deceduti", "nuovi_positivi"];

#[derive(Debug, Deserialize)]
struct RawDelivery {
    #[serde(rename = "data_consegna")]
    date: String,
    #[serde(rename = "numero_dosi")]
    doses: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawAdministration {
    #[serde(rename = "data_somministrazione")]
    date: String,
    #[serde(rename = "fornitore")]
    supplier: String,
    prima_dose: Option<u64>,
    seconda_dose: Option<u64>,
    categoria_operatori_sanitari_sociosanitari: Option<u64>,
    categoria_personale_non_sanitario: Option<u64>,
    categoria_ospiti_rsa: Option<u64>,
    categoria_over80: Option<u64>,
    categoria_forze_armate: Option<u64>,
    categoria_personale_scolastico: Option<u64>,
    categoria_altro: Option<u64>,
}

impl RawAdministration {
    fn category(&self, category: Category) -> u64 {
        let value = match category {
            Category::HealthWorkers => self.categoria_operatori_sanitari_sociosanitari,
            Category::NonHealthStaff => self.categoria_personale_non_sanitario,
            Category::CareHomeResidents => self.categoria_ospiti_rsa,
            Category::Over80 => self.categoria_over80,
            Category::ArmedForces => self.categoria_forze_armate,
            Category::SchoolStaff => self.categoria_personale_scolastico,
            Category::Other => self.categoria_altro,
        };
        value.unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
struct RawAgeBracket {
    fascia_anagrafica: String,
    totale: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawNational {
    data: String,
    deceduti: Option<u64>,
    nuovi_positivi: Option<u64>,
}

/// Fetches and parses the four source datasets, one after the other.
pub async fn load_datasets(client: &Client, sources: &Sources) -> Result<Datasets, LoadError> {
    let deliveries = parse_deliveries(
        &fetch_csv(client, Resource::Deliveries, sources.url(Resource::Deliveries)).await?,
    )?;
    let administrations = parse_administrations(
        &fetch_csv(
            client,
            Resource::Administrations,
            sources.url(Resource::Administrations),
        )
        .await?,
    )?;
    let age_brackets = parse_age_brackets(
        &fetch_csv(client, Resource::AgeBrackets, sources.url(Resource::AgeBrackets)).await?,
    )?;
    let national = parse_national(
        &fetch_csv(client, Resource::National, sources.url(Resource::National)).await?,
    )?;

    info!(
        deliveries = deliveries.len(),
        administrations = administrations.len(),
        age_brackets = age_brackets.len(),
        national = national.len(),
        "datasets loaded"
    );

    Ok(Datasets {
        deliveries,
        administrations,
        age_brackets,
        national,
    })
}

pub async fn fetch_csv(
    client: &Client,
    resource: Resource,
    url: &str,
) -> Result<Vec<u8>, LoadError> {
    debug!(%resource, url, "fetching dataset");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| LoadError::Fetch { resource, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            resource,
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| LoadError::Fetch { resource, source })?;
    Ok(body.to_vec())
}

pub fn parse_deliveries(bytes: &[u8]) -> Result<Vec<DeliveryRecord>, LoadError> {
    let resource = Resource::Deliveries;
    read_rows::<RawDelivery>(resource, bytes, DELIVERY_COLUMNS)?
        .into_iter()
        .map(|row| -> Result<DeliveryRecord, LoadError> {
            Ok(DeliveryRecord {
                date: parse_date(resource, &row.date)?,
                doses_delivered: row.doses.unwrap_or(0),
            })
        })
        .collect()
}

pub fn parse_administrations(bytes: &[u8]) -> Result<Vec<AdministrationRecord>, LoadError> {
    let resource = Resource::Administrations;
    let mut columns = vec!["data_somministrazione", "fornitore", "prima_dose", "seconda_dose"];
    columns.extend(Category::ALL.iter().map(|category| category.column()));

    read_rows::<RawAdministration>(resource, bytes, &columns)?
        .into_iter()
        .map(|row| -> Result<AdministrationRecord, LoadError> {
            let mut categories = CategoryCounts::default();
            for category in Category::ALL {
                categories.set(category, row.category(category));
            }
            Ok(AdministrationRecord {
                date: parse_date(resource, &row.date)?,
                supplier: row.supplier.trim().to_string(),
                first_dose: row.prima_dose.unwrap_or(0),
                second_dose: row.seconda_dose.unwrap_or(0),
                categories,
            })
        })
        .collect()
}

/// Unknown bracket labels are skipped; the dashboard charts a fixed set.
pub fn parse_age_brackets(bytes: &[u8]) -> Result<Vec<AgeBracketSummary>, LoadError> {
    let rows = read_rows::<RawAgeBracket>(Resource::AgeBrackets, bytes, AGE_BRACKET_COLUMNS)?;
    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        match AgeBracket::from_label(&row.fascia_anagrafica) {
            Some(bracket) => summaries.push(AgeBracketSummary {
                bracket,
                total_doses: row.totale.unwrap_or(0),
            }),
            None => warn!(label = %row.fascia_anagrafica, "skipping unknown age bracket"),
        }
    }
    Ok(summaries)
}

pub fn parse_national(bytes: &[u8]) -> Result<Vec<NationalCaseRecord>, LoadError> {
    let resource = Resource::National;
    read_rows::<RawNational>(resource, bytes, NATIONAL_COLUMNS)?
        .into_iter()
        .map(|row| -> Result<NationalCaseRecord, LoadError> {
            Ok(NationalCaseRecord {
                date: parse_date(resource, &row.data)?,
                cumulative_deaths: row.deceduti.unwrap_or(0),
                new_cases: row.nuovi_positivi.unwrap_or(0),
            })
        })
        .collect()
}

fn read_rows<T: DeserializeOwned>(
    resource: Resource,
    bytes: &[u8],
    columns: &[&'static str],
) -> Result<Vec<T>, LoadError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv { resource, source })?;
    if let Some(column) = columns
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(LoadError::MissingColumn {
            resource,
            column: *column,
        });
    }

    reader
        .deserialize()
        .map(|row| row.map_err(|source| LoadError::Csv { resource, source }))
        .collect()
}

/// Accepts plain dates and ISO timestamps; only the `YYYY-MM-DD` prefix counts.
fn parse_date(resource: Resource, raw: &str) -> Result<NaiveDate, LoadError> {
    let raw = raw.trim();
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| LoadError::InvalidDate {
            resource,
            value: raw.to_string(),
        })
}
