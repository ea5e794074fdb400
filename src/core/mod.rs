pub mod config;
pub mod domain;
pub mod paper;
pub mod paths;
