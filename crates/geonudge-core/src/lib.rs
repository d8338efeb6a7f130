//! # Geonudge Core Library
//!
//! This library provides the core business logic for Geonudge, a
//! location-tagged reminder system. All operations are available via a
//! standalone CLI binary; any outer surface (mobile client, HTTP glue)
//! is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Trigger Engine**: one synchronous pass per location sample,
//!   gating pending tasks through cooldown policy, querying the
//!   proximity index and grouping fires into per-category batches
//! - **Storage**: SQLite-based task and place storage, TOML-based
//!   configuration
//! - **Proximity**: nearest-place lookup behind a trait, with a local
//!   scan and a remote HTTP implementation
//! - **Classifier**: ordered keyword rules assigning a category at task
//!   creation
//!
//! ## Key Components
//!
//! - [`TriggerEngine`]: the pass orchestrator
//! - [`CooldownPolicy`]: pure trigger-eligibility gates
//! - [`TaskDb`] / [`PlaceDb`]: persistence
//! - [`ProximityIndex`]: external lookup capability

pub mod classify;
pub mod engine;
pub mod error;
pub mod proximity;
pub mod storage;
pub mod task;

pub use classify::{ClassifierRule, ClassifierRules};
pub use engine::{Batch, BatchItem, CooldownPolicy, EngineConfig, GateDecision, TriggerEngine};
pub use error::{ConfigError, CoreError, ProximityError, StoreError, ValidationError};
pub use proximity::{GeoPoint, HttpProximityIndex, LocalPlaceIndex, PlaceHit, ProximityIndex};
pub use storage::{Config, Place, PlaceDb, TaskDb};
pub use task::{Category, Priority, Task, TaskStatus};
