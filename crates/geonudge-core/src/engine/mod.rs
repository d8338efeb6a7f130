//! Trigger engine: one synchronous pass per location sample.
//!
//! Given a location sample, the engine loads the pending tasks in
//! priority order, gates each through the cooldown policy, asks the
//! proximity index for a nearby place of the task's category, claims the
//! task `pending → triggered` through the store, and groups the fired
//! tasks into per-category batches.
//!
//! The pass is strictly sequential: the in-pass category-cycle gate and
//! the batch accumulator both depend on processing order. The
//! per-category last-triggered snapshot is loaded once at the start and
//! never refreshed mid-pass, so a fire only affects sibling tasks through
//! the in-pass set.
//!
//! Failure semantics are at-least-once: a store error aborts the pass,
//! and tasks already claimed earlier in the same pass stay triggered.
//! Proximity failures never abort; the affected task is treated as
//! "no match" and the pass continues.

pub mod batch;
pub mod cooldown;

pub use batch::{Batch, BatchAccumulator, BatchItem};
pub use cooldown::{CooldownPolicy, GateDecision, CATEGORY_COOLDOWN_MINUTES};

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::error::{CoreError, Result, ValidationError};
use crate::proximity::{GeoPoint, ProximityIndex};
use crate::storage::TaskDb;

/// Radius for trigger-time proximity queries, meters.
pub const TRIGGER_RADIUS_M: f64 = 1000.0;

/// Maximum tasks emitted per batch.
pub const BATCH_CAP: usize = 5;

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub trigger_radius_m: f64,
    pub batch_cap: usize,
    pub cooldown: CooldownPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trigger_radius_m: TRIGGER_RADIUS_M,
            batch_cap: BATCH_CAP,
            cooldown: CooldownPolicy::default(),
        }
    }
}

/// Trigger engine over a task store and a proximity index.
pub struct TriggerEngine<P: ProximityIndex> {
    db: TaskDb,
    proximity: P,
    config: EngineConfig,
}

impl<P: ProximityIndex> TriggerEngine<P> {
    /// Create an engine with default tuning.
    pub fn new(db: TaskDb, proximity: P) -> Self {
        Self::with_config(db, proximity, EngineConfig::default())
    }

    /// Create an engine with explicit tuning.
    pub fn with_config(db: TaskDb, proximity: P, config: EngineConfig) -> Self {
        Self {
            db,
            proximity,
            config,
        }
    }

    pub fn db(&self) -> &TaskDb {
        &self.db
    }

    pub fn proximity(&self) -> &P {
        &self.proximity
    }

    /// Process one location sample at the current wall-clock time.
    pub fn process_sample(&self, point: GeoPoint) -> Result<Vec<Batch>> {
        self.process_sample_at(point, Utc::now())
    }

    /// Process one location sample at an explicit `now`.
    ///
    /// Returns the batches of newly triggered tasks, in first-fire
    /// category order. An empty vector means nothing fired and no store
    /// mutation happened.
    pub fn process_sample_at(&self, point: GeoPoint, now: DateTime<Utc>) -> Result<Vec<Batch>> {
        if !point.lat.is_finite() {
            return Err(CoreError::Validation(ValidationError::NonFiniteCoordinate {
                field: "lat",
                value: point.lat,
            }));
        }
        if !point.lng.is_finite() {
            return Err(CoreError::Validation(ValidationError::NonFiniteCoordinate {
                field: "lng",
                value: point.lng,
            }));
        }

        let pending = self.db.list_pending()?;
        // Single snapshot for the whole pass.
        let last_triggered = self.db.last_triggered_per_category()?;

        let mut fired_this_pass: HashSet<crate::task::Category> = HashSet::new();
        let mut accumulator = BatchAccumulator::new();

        debug!("pass over {} pending task(s)", pending.len());

        for task in pending {
            let decision =
                self.config
                    .cooldown
                    .evaluate(&task, &fired_this_pass, &last_triggered, now);
            if !decision.is_checkable() {
                debug!("task {} skipped: {:?}", task.id, decision);
                continue;
            }

            let hit = match self
                .proximity
                .nearest(task.category, point, self.config.trigger_radius_m)
            {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(e) => {
                    // External dependency failure degrades to a per-task
                    // skip rather than failing the whole pass.
                    warn!(
                        "proximity lookup failed for task {} ({}): {e}; treating as no match",
                        task.id, task.category
                    );
                    continue;
                }
            };

            // Conditional claim: a concurrent pass may have taken the
            // task since list_pending(). A lost claim is a silent skip
            // and does not mark the category as fired.
            if !self.db.claim_pending(&task.id, now)? {
                debug!("task {} claimed by a concurrent pass", task.id);
                continue;
            }

            fired_this_pass.insert(task.category);
            accumulator.push(
                task.category,
                BatchItem {
                    task_id: task.id,
                    text: task.text,
                    place_name: hit.name,
                    priority: task.priority,
                },
            );
        }

        Ok(accumulator.into_batches(self.config.batch_cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProximityError;
    use crate::proximity::PlaceHit;
    use crate::task::{Category, Priority, Task};

    /// Index that always answers with one hit for a fixed category.
    struct SingleCategoryIndex {
        category: Category,
    }

    impl ProximityIndex for SingleCategoryIndex {
        fn nearby(
            &self,
            category: Category,
            _point: GeoPoint,
            _radius_m: f64,
        ) -> Result<Vec<PlaceHit>, ProximityError> {
            if category == self.category {
                Ok(vec![PlaceHit {
                    name: "Corner Grocer".to_string(),
                    category,
                    distance_m: 120,
                    price_level: None,
                    rating: None,
                }])
            } else {
                Ok(vec![])
            }
        }
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let db = TaskDb::open_memory().unwrap();
        let engine = TriggerEngine::new(db, SingleCategoryIndex { category: Category::Grocery });

        let err = engine
            .process_sample(GeoPoint::new(f64::NAN, 13.405))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = engine
            .process_sample(GeoPoint::new(52.52, f64::INFINITY))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn empty_store_is_a_no_op() {
        let db = TaskDb::open_memory().unwrap();
        let engine = TriggerEngine::new(db, SingleCategoryIndex { category: Category::Grocery });
        let batches = engine.process_sample(GeoPoint::new(52.52, 13.405)).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn matching_task_fires_and_batches() {
        let db = TaskDb::open_memory().unwrap();
        let task = Task::new("buy milk", Category::Grocery, Priority::High, 60);
        db.insert_task(&task).unwrap();

        let engine = TriggerEngine::new(db, SingleCategoryIndex { category: Category::Grocery });
        let batches = engine.process_sample(GeoPoint::new(52.52, 13.405)).unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].category, Category::Grocery);
        assert_eq!(batches[0].count, 1);
        assert_eq!(batches[0].tasks[0].place_name, "Corner Grocer");

        let stored = engine.db().get_task(&task.id).unwrap();
        assert!(!stored.is_pending());
        assert!(stored.triggered_at.is_some());
    }
}
