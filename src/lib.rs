//! Terminal client for managing courses and course instances over a REST API

pub mod api;
pub mod config;
pub mod models;
pub mod tui;
