//! Plugin settings: schema, validation and persistence.

mod atomic;
mod schema;
mod store;

pub use atomic::{atomic_read_json, atomic_write_json};
pub use schema::{
    FolderRule, ImageDisplay, ImageOrientation, ImageSize, LogicalField, Settings,
};
pub use store::SettingsStore;
