//! Error types
//!
//! The simulation itself never fails: malformed tables degrade to fewer
//! placements and out-of-range values are clamped. The only fallible
//! surfaces are loading tuning data and offering an item to a full inventory.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or parse a tuning file
#[derive(Error, Debug)]
pub enum TuningError {
    /// The file could not be read
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON did not match the tuning schema
    #[error("invalid tuning data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Inventory rejections
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Every slot is occupied; the item was not added
    #[error("inventory full: capacity {capacity}")]
    Full { capacity: usize },

    /// No item with this id exists in the catalog
    #[error("unknown item: {0}")]
    UnknownItem(String),
}
