//! Place management commands for CLI.

use clap::Subcommand;
use geonudge_core::{
    Category, Config, GeoPoint, LocalPlaceIndex, Place, PlaceDb, ProximityIndex,
};

#[derive(Subcommand)]
pub enum PlaceAction {
    /// Add a place
    Add {
        /// Place name
        name: String,
        /// Category: grocery, pharmacy, clothing or general
        category: String,
        /// Latitude
        lat: f64,
        /// Longitude
        lng: f64,
        /// Price level (1-4)
        #[arg(long)]
        price_level: Option<i64>,
        /// Rating (0.0-5.0)
        #[arg(long)]
        rating: Option<f64>,
    },
    /// List all places
    List,
    /// List places of a category near a point, nearest first
    Nearby {
        /// Category: grocery, pharmacy, clothing or general
        category: String,
        /// Latitude
        lat: f64,
        /// Longitude
        lng: f64,
        /// Search radius in meters (default from config)
        #[arg(long)]
        radius_m: Option<f64>,
    },
}

fn parse_category(raw: &str) -> Result<Category, Box<dyn std::error::Error>> {
    Category::parse(raw).ok_or_else(|| format!("unknown category: {raw}").into())
}

pub fn run(action: PlaceAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PlaceAction::Add {
            name,
            category,
            lat,
            lng,
            price_level,
            rating,
        } => {
            let db = PlaceDb::open()?;
            let mut place = Place::new(name, parse_category(&category)?, lat, lng);
            place.price_level = price_level;
            place.rating = rating;
            db.insert_place(&place)?;
            println!("Place added: {}", place.id);
            println!("{}", serde_json::to_string_pretty(&place)?);
        }
        PlaceAction::List => {
            let db = PlaceDb::open()?;
            println!("{}", serde_json::to_string_pretty(&db.list_places()?)?);
        }
        PlaceAction::Nearby {
            category,
            lat,
            lng,
            radius_m,
        } => {
            let config = Config::load()?;
            let index = LocalPlaceIndex::open()?;
            let radius = radius_m.unwrap_or(config.engine.nearby_radius_m);
            let hits = index.nearby(parse_category(&category)?, GeoPoint::new(lat, lng), radius)?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
    }
    Ok(())
}
