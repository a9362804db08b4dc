pub mod config_cmd;
pub mod output;
pub mod plans_cmd;
pub mod renderer;
pub mod summary_cmd;
