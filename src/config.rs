use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

#[derive(Deserialize, Debug)]
pub struct GeoRef {
    pub lat: f64,
    pub long: f64,
    pub timezone: String,
}

/// Chart style constants, colors are RGB triples
#[derive(Deserialize, Clone, Debug)]
pub struct ChartParameters {
    pub width: u32,
    pub height: u32,
    pub temperature_line_color: [u8; 3],
    pub temperature_line_width: u32,
    pub rain_line_color: [u8; 3],
    pub rain_line_width: u32,
    pub grid_alpha: f64,
}

/// OAuth 1.0a user context credentials for the bot account
#[derive(Deserialize, Clone, Debug)]
pub struct TwitterKeys {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

#[derive(Deserialize, Debug)]
pub struct Files {
    pub log_root: String,
}

#[derive(Deserialize, Debug)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub geo_ref: GeoRef,
    pub chart: ChartParameters,
    pub twitter: TwitterKeys,
    pub files: Files,
    pub general: General,
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    Ok(config)
}
