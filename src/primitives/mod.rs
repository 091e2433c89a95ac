//! Helpers and types shared across subsystems.

mod encoding;

pub use encoding::{deserialize, serialize, take};
