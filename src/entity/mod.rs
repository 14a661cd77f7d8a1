//! SeaORM entity definitions for PostgreSQL database.
//!
//! Table and column names follow the Portuguese schema shared with the
//! existing clients; the API models in `crate::models` carry English names.

pub mod company;
pub mod inspection;
pub mod inspection_component;
pub mod inspection_photo;
pub mod plant;
pub mod profile;
pub mod required_action;
pub mod valve;
