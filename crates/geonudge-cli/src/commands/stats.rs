//! Task statistics.

use geonudge_core::TaskDb;
use serde_json::json;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = TaskDb::open()?;
    let counts = db.counts_by_status()?;
    let by_priority = db.trigger_rate_by_priority()?;
    let stats = json!({
        "counts": counts,
        "trigger_rate_by_priority": by_priority,
    });
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
