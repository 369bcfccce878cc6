pub mod commands;
pub mod config;
pub mod grep;
pub mod manager;
pub mod package;
pub mod parser;
pub mod planner;
pub mod platform;
pub mod runtime;
