//! Location sample processing.

use clap::Subcommand;
use geonudge_core::{Config, GeoPoint, LocalPlaceIndex, TaskDb, TriggerEngine};

#[derive(Subcommand)]
pub enum LocationAction {
    /// Run one trigger pass for a location sample
    Process {
        /// Latitude
        lat: f64,
        /// Longitude
        lng: f64,
    },
}

pub fn run(action: LocationAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        LocationAction::Process { lat, lng } => {
            let config = Config::load()?;
            let engine = TriggerEngine::with_config(
                TaskDb::open()?,
                LocalPlaceIndex::open()?,
                config.engine_config(),
            );
            let batches = engine.process_sample(GeoPoint::new(lat, lng))?;
            let total: usize = batches.iter().map(|b| b.count).sum();
            println!("{} batch(es), {} task(s) triggered", batches.len(), total);
            println!("{}", serde_json::to_string_pretty(&batches)?);
        }
    }
    Ok(())
}
