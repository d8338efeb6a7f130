//! SQLite-based place storage.
//!
//! Places are read-only from the engine's perspective: the proximity
//! index answers queries over them, the core never mutates one after
//! insertion.

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::StoreError;
use crate::task::Category;

/// A known place with a category and coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub lat: f64,
    pub lng: f64,
    pub price_level: Option<i64>,
    pub rating: Option<f64>,
}

impl Place {
    /// Create a new place record.
    pub fn new(name: impl Into<String>, category: Category, lat: f64, lng: f64) -> Self {
        Place {
            id: format!("place-{}-{}", Utc::now().timestamp(), uuid::Uuid::new_v4()),
            name: name.into(),
            category,
            lat,
            lng,
            price_level: None,
            rating: None,
        }
    }
}

fn row_to_place(row: &rusqlite::Row) -> Result<Place, rusqlite::Error> {
    let category_str: String = row.get(2)?;
    Ok(Place {
        id: row.get(0)?,
        name: row.get(1)?,
        category: Category::parse(&category_str).unwrap_or(Category::General),
        lat: row.get(3)?,
        lng: row.get(4)?,
        price_level: row.get(5)?,
        rating: row.get(6)?,
    })
}

/// SQLite database for place storage.
pub struct PlaceDb {
    conn: Connection,
}

impl PlaceDb {
    /// Open the place database at `~/.config/geonudge/geonudge.db`.
    ///
    /// Creates the table if it doesn't exist; shares the database file
    /// with [`super::TaskDb`].
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("geonudge.db");
        Self::open_at(&path)
    }

    /// Open the place database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS places (
                    id          TEXT PRIMARY KEY,
                    name        TEXT NOT NULL,
                    category    TEXT NOT NULL,
                    lat         REAL NOT NULL,
                    lng         REAL NOT NULL,
                    price_level INTEGER,
                    rating      REAL
                );

                CREATE INDEX IF NOT EXISTS idx_places_category ON places(category);",
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Insert a new place record.
    pub fn insert_place(&self, place: &Place) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO places (id, name, category, lat, lng, price_level, rating)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                place.id,
                place.name,
                place.category.as_str(),
                place.lat,
                place.lng,
                place.price_level,
                place.rating,
            ],
        )?;
        Ok(())
    }

    /// All places.
    pub fn list_places(&self) -> Result<Vec<Place>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, lat, lng, price_level, rating FROM places ORDER BY name ASC",
        )?;
        let rows = stmt.query_map([], row_to_place)?;
        let mut places = Vec::new();
        for row in rows {
            places.push(row?);
        }
        Ok(places)
    }

    /// All places of one category.
    pub fn list_by_category(&self, category: Category) -> Result<Vec<Place>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, lat, lng, price_level, rating
             FROM places WHERE category = ?1",
        )?;
        let rows = stmt.query_map(params![category.as_str()], row_to_place)?;
        let mut places = Vec::new();
        for row in rows {
            places.push(row?);
        }
        Ok(places)
    }

    /// Number of stored places.
    pub fn count(&self) -> Result<u64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM places", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_list_by_category() {
        let db = PlaceDb::open_memory().unwrap();
        let mut shop = Place::new("Corner Grocer", Category::Grocery, 52.52, 13.405);
        shop.rating = Some(4.2);
        let pharmacy = Place::new("Night Pharmacy", Category::Pharmacy, 52.53, 13.41);
        db.insert_place(&shop).unwrap();
        db.insert_place(&pharmacy).unwrap();

        let groceries = db.list_by_category(Category::Grocery).unwrap();
        assert_eq!(groceries.len(), 1);
        assert_eq!(groceries[0].name, "Corner Grocer");
        assert_eq!(groceries[0].rating, Some(4.2));

        assert_eq!(db.count().unwrap(), 2);
        assert_eq!(db.list_places().unwrap().len(), 2);
    }
}
