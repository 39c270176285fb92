pub mod config;
pub mod plan;
pub mod quota;
pub mod tenant;
