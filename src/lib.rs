// src/lib.rs — Library root for tiergate

pub mod api;
pub mod cli;
pub mod core;
pub mod gateway;
pub mod infra;
pub mod provider;
