//! Tab panels of the coursedesk TUI
//!
//! Each tab owns one panel. A panel receives key events first and reports
//! back through [`PanelAction`], so the shell applies global shortcuts only
//! to keys a panel left untouched. Panels keep their state when the user
//! switches tabs.

pub mod courses;
pub mod instances;

pub use courses::CoursePanel;
pub use instances::InstancePanel;

/// Outcome of a panel handling one key event
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    /// Key not handled, the shell may apply a global shortcut
    None,
    /// Key handled, nothing to report
    Consumed,
    /// Key handled, show a status message
    SetStatus(String),
    /// Key handled, show an error message
    SetError(String),
    /// Key handled, clear the status line
    ClearMessages,
}

/// Interaction mode within a panel.
///
/// Browse mode treats plain letters as panel shortcuts. Edit mode routes
/// every printable key into the focused form field, so typing a shortcut
/// letter never triggers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelMode {
    Browse,
    Edit,
}
