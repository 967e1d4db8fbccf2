use std::fs;
use anyhow::Result;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::{Config, General};
use crate::errors::InitError;
use crate::manager_chart::Chart;
use crate::manager_meteo::Meteo;
use crate::manager_twitter::Twitter;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {m}{n}";

/// Bundle of the managers the worker operates on
pub struct Mgr {
    pub meteo: Meteo,
    pub chart: Chart,
    pub twitter: Twitter,
}

/// Configures the process wide logger with a file appender and optionally
/// a console appender
///
/// # Arguments
///
/// * 'general' - the general configuration section
pub fn setup_logging(general: &General) -> Result<()> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&general.log_path)?;

    let mut config = log4rs::config::Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        config = config.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let _ = log4rs::init_config(config.build(root.build(general.log_level))?)?;

    Ok(())
}

/// Ensures the run log root exists and returns the manager bundle
///
/// # Arguments
///
/// * 'config' - the configuration
pub fn init(config: &Config) -> Result<Mgr, InitError> {
    init_environment(&config.files.log_root)?;

    let meteo = Meteo::new(config.geo_ref.lat, config.geo_ref.long, &config.geo_ref.timezone);
    let chart = Chart::new(config.chart.clone());
    let twitter = Twitter::new(config.twitter.clone());

    Ok(Mgr { meteo, chart, twitter })
}

/// Ensures the directory holding all run directories exists, a no-op when it
/// already does. Failure is fatal to the process since without it there is
/// nowhere to write run logs.
///
/// # Arguments
///
/// * 'log_root' - root directory holding all run directories
fn init_environment(log_root: &str) -> Result<(), InitError> {
    fs::create_dir_all(log_root)?;

    Ok(())
}
