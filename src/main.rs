use std::env;
use log::{error, info};
use crate::config::load_config;
use crate::initialization::{init, setup_logging};

mod config;
mod errors;
mod initialization;
mod manager_chart;
mod manager_meteo;
mod manager_twitter;
mod models;
mod runlog;
mod worker;

fn main() {
    let config_path = env::var("TWEETCAST_CONFIG").unwrap_or("config.toml".to_string());
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => { println!("Error loading configuration: {}", e); return; }
    };

    if let Err(e) = setup_logging(&config.general) {
        println!("Error setting up logging: {}", e);
        return;
    }

    info!("tweetcast version: {}", env!("CARGO_PKG_VERSION"));

    let mgr = match init(&config) {
        Ok(mgr) => mgr,
        Err(e) => { error!("{}", e); return; }
    };

    worker::run(&config, &mgr);
}
