//! Storage health check, the CLI counterpart of a service /health probe.

use geonudge_core::{PlaceDb, TaskDb};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let tasks = TaskDb::open()?;
    let places = PlaceDb::open()?;
    let counts = tasks.counts_by_status()?;

    println!("db: ok");
    println!(
        "tasks: {} ({} pending, {} triggered)",
        counts.total, counts.pending, counts.triggered
    );
    println!("places: {}", places.count()?);
    Ok(())
}
