// src/core/mod.rs — Decision engine and step loop

pub mod budget;
pub mod catalog;
pub mod metrics;
pub mod orchestrator;
pub mod policy;
pub mod types;
