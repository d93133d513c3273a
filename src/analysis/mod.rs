pub mod aggregate;
pub mod cluster;
pub mod describe;
pub mod error;
pub mod trend;
