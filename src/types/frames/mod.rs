pub mod long_frame;
pub mod wide_frame;
