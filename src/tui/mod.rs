//! Course catalog Terminal User Interface (TUI)
//!
//! This module provides a tabbed TUI for managing courses and course
//! instances, including listing, filtering, creating and deleting records.

pub mod app;
pub mod panels;
pub mod ui;

pub use app::{App, Tab};

// Re-export panel states for easy access
pub use panels::{CoursePanel, InstancePanel, PanelAction};
