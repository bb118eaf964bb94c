pub mod attendance;
pub mod core;
pub mod exchange;
pub mod observations;
pub mod reports;
pub mod students;
