pub mod frames;
pub mod month;
pub mod records;
pub mod season;
