pub mod plan;
pub mod usage;
