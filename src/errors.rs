use thiserror::Error;

#[derive(Error, Debug)]
#[error("error in configuration: {0}")]
pub struct ConfigError(pub String);
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> ConfigError {
        ConfigError(format!("config file error: {}", e))
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> ConfigError {
        ConfigError(format!("toml document error: {}", e))
    }
}

/// Startup failures, fatal to the process
#[derive(Error, Debug)]
#[error("error during initialization: {0}")]
pub struct InitError(pub String);
impl From<std::io::Error> for InitError {
    fn from(e: std::io::Error) -> InitError {
        InitError(e.to_string())
    }
}

/// Failures while setting up a single run (run directory, run log file).
/// These abort the run but not the process.
#[derive(Error, Debug)]
#[error("error setting up run: {0}")]
pub struct RunError(pub String);
impl From<std::io::Error> for RunError {
    fn from(e: std::io::Error) -> RunError {
        RunError(e.to_string())
    }
}
