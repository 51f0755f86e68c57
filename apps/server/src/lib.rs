pub mod api;
pub mod config;
pub mod error;
mod main_lib;
pub mod scheduler;

pub use main_lib::{
    build_state, build_state_with, configured_providers, init_tracing, Analyst, AppState,
};
