#![forbid(unsafe_code)]

//! Core domain model and composition logic for the Routinely system.
//!
//! This crate provides:
//! - Domain types (routines, exercise entries, sets, metric targets)
//! - Group management (supersets, timed circuits)
//! - Bounded undo/redo edit history
//! - The composition engine (the single mutation surface)
//! - Exercise catalog, configuration, unit conversion
//! - Routine persistence (JSON file repository)

pub mod types;
pub mod error;
pub mod sets;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod units;
pub mod groups;
pub mod history;
pub mod engine;
pub mod repository;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use sets::SetCollection;
pub use catalog::{build_default_catalog, get_default_catalog, ExerciseCatalog, ExerciseDefinition};
pub use config::Config;
pub use units::{convert, Unit};
pub use groups::GroupManager;
pub use history::EditHistory;
pub use engine::CompositionEngine;
pub use repository::{JsonDirRepository, RoutineRepository, RoutineSummary};
