use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use crate::models::forecast::{Forecast, HOURS_PER_DAY};
use crate::models::open_meteo::ForecastDocument;
use crate::worker::ForecastProvider;

#[derive(Error, Debug)]
#[error("error retrieving weather forecast: {0}")]
pub struct FetchError(pub String);
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> FetchError {
        FetchError(format!("http request error: {}", e))
    }
}
impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> FetchError {
        FetchError(format!("json document error: {}", e))
    }
}
/// Struct for managing weather forecasts produced by Open-Meteo
pub struct Meteo {
    client: Client,
    lat: f64,
    long: f64,
    timezone: String,
}

impl Meteo {
    /// Returns a Meteo struct ready for fetching forecasts for the given point.
    ///
    /// The timezone is passed through to Open-Meteo so that the hourly series
    /// starts at local midnight rather than UTC midnight.
    ///
    /// # Arguments
    ///
    /// * 'lat' - latitude for the point to get forecasts for
    /// * 'long' - longitude for the point to get forecasts for
    /// * 'timezone' - IANA timezone name for the point
    pub fn new(lat: f64, long: f64, timezone: &str) -> Meteo {
        let client = Client::new();

        Meteo { client, lat, long, timezone: timezone.to_string() }
    }
}

impl ForecastProvider for Meteo {
    /// Retrieves the hourly forecast for the current day.
    ///
    /// The returned forecast holds exactly 24 entries per metric, one per
    /// hour of the day. A response with any other series length is rejected.
    fn fetch_forecast(&self) -> Result<Forecast, FetchError> {
        let url = "https://api.open-meteo.com/v1/forecast";
        let lat = format!("{:0.4}", self.lat);
        let long = format!("{:0.4}", self.long);
        let query = vec![
            ("latitude", lat.as_str()),
            ("longitude", long.as_str()),
            ("hourly", "temperature_2m,rain,surface_pressure,uv_index"),
            ("timezone", self.timezone.as_str()),
            ("forecast_days", "1"),
        ];

        let res = self.client
            .get(url)
            .query(&query)
            .send()?;

        if res.status() != StatusCode::OK {
            return Err(FetchError(format!("http error: {}", res.status())))
        }

        let json = res.text()?;
        let document: ForecastDocument = serde_json::from_str(&json)?;

        forecast_from_document(document)
    }
}

/// Transforms the raw Open-Meteo document into a Forecast, validating that
/// every metric covers the full day
///
/// # Arguments
///
/// * 'document' - the raw forecast document
pub fn forecast_from_document(document: ForecastDocument) -> Result<Forecast, FetchError> {
    let hourly = document.hourly;

    Ok(Forecast {
        temperature: to_day_series(&hourly.temperature_2m, "temperature_2m")?,
        rain: to_day_series(&hourly.rain, "rain")?,
        pressure: to_day_series(&hourly.surface_pressure, "surface_pressure")?,
        uv_index: to_day_series(&hourly.uv_index, "uv_index")?,
    })
}

/// Copies an hourly series into a fixed day array, erroring on length mismatch
///
/// # Arguments
///
/// * 'values' - the hourly values from the document
/// * 'name' - metric name used in the error message
fn to_day_series(values: &[f64], name: &str) -> Result<[f64; HOURS_PER_DAY], FetchError> {
    if values.len() != HOURS_PER_DAY {
        return Err(FetchError(format!(
            "number of {} entries not equal to {}, got {}", name, HOURS_PER_DAY, values.len())));
    }

    let mut result = [0.0; HOURS_PER_DAY];
    result.copy_from_slice(values);

    Ok(result)
}
