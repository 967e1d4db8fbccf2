use serde::Deserialize;

/// Raw forecast document as returned by the Open-Meteo forecast endpoint
#[derive(Deserialize)]
pub struct ForecastDocument {
    pub latitude: f64,
    pub longitude: f64,
    pub hourly: HourlySeries,
}

#[derive(Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub rain: Vec<f64>,
    pub surface_pressure: Vec<f64>,
    pub uv_index: Vec<f64>,
}
