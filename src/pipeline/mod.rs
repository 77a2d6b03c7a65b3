pub mod config;
pub mod euclid;
pub mod geo;
pub mod mapping;
pub mod persistence;
pub mod scheduler;
pub mod session;
pub mod share;
