pub mod encoding;
pub mod error;
pub mod forecaster;
pub mod metrics;
pub mod split;
pub mod tree;
