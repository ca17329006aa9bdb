pub mod estimate;
pub mod index;
pub mod logs;
pub mod status;
