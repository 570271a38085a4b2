//! Reading domain
//!
//! A reading is something that has been read: a link, its title, when it
//! was read and who read it.

mod entity;

pub use entity::{sort_newest_first, Reading, READINGS_BIN};
