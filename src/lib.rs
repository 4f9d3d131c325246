pub mod board;
pub mod config;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod occupancy;
pub mod registry;
pub mod snapshot;
