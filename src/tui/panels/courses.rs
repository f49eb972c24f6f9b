//! Course management panel

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};
use tracing::{info, warn};

use crate::{
    api::{ApiClient, ApiError, NewCourse},
    models::Course,
    tui::panels::{PanelAction, PanelMode},
    tui::ui::{centered_rect, truncate_cell, InputField, Styles},
};

/// Create-form fields, in focus order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CourseField {
    Name,
    Code,
    Description,
}

/// Course panel state
pub struct CoursePanel {
    pub mode: PanelMode,
    pub fields: Vec<CourseField>,
    pub current_field: usize,

    // Create form inputs
    pub name_input: InputField,
    pub code_input: InputField,
    pub description_input: InputField,

    // Fetched list and its view state
    pub courses: Vec<Course>,
    pub show_table: bool,
    pub is_loading: bool,
    pub fetch_error: Option<String>,
    pub table_state: TableState,

    /// Course shown in the detail popup, if any
    pub detail: Option<Course>,
}

impl CoursePanel {
    pub fn new() -> Self {
        Self {
            mode: PanelMode::Browse,
            fields: vec![CourseField::Name, CourseField::Code, CourseField::Description],
            current_field: 0,

            name_input: InputField::new("Course Title")
                .with_placeholder("e.g., Data Structures"),
            code_input: InputField::new("Course Code")
                .with_placeholder("e.g., CS201"),
            description_input: InputField::new("Course Description")
                .with_placeholder("One-line summary of the course"),

            courses: Vec::new(),
            show_table: false,
            is_loading: false,
            fetch_error: None,
            table_state: TableState::default(),

            detail: None,
        }
    }

    /// Handle a key event. Returns how the shell should react.
    pub async fn handle_key(&mut self, key: KeyEvent, api: &ApiClient) -> Result<PanelAction> {
        if self.detail.is_some() {
            return Ok(self.handle_detail_key(key));
        }

        match self.mode {
            PanelMode::Edit => self.handle_edit_key(key, api).await,
            PanelMode::Browse => self.handle_browse_key(key, api).await,
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> PanelAction {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                // Closing the popup also drops the row selection
                self.detail = None;
                self.table_state.select(None);
                PanelAction::Consumed
            }
            // The popup swallows everything else
            _ => PanelAction::Consumed,
        }
    }

    async fn handle_browse_key(&mut self, key: KeyEvent, api: &ApiClient) -> Result<PanelAction> {
        match key.code {
            KeyCode::Char('l') => {
                self.show_table = true;
                self.refresh_courses(api).await;
                match &self.fetch_error {
                    Some(err) => Ok(PanelAction::SetError(format!("Error: {}", err))),
                    None => Ok(PanelAction::SetStatus(format!(
                        "Found {} courses",
                        self.courses.len()
                    ))),
                }
            }
            KeyCode::Char('r') => {
                self.show_table = false;
                self.fetch_error = None;
                self.table_state.select(None);
                Ok(PanelAction::ClearMessages)
            }
            KeyCode::Char('a') => {
                self.mode = PanelMode::Edit;
                self.current_field = 0;
                self.update_field_focus();
                Ok(PanelAction::SetStatus(
                    "New course: Tab to switch fields, Enter to submit, Esc to cancel".to_string(),
                ))
            }
            KeyCode::Up => {
                self.select_previous();
                Ok(PanelAction::Consumed)
            }
            KeyCode::Down => {
                self.select_next();
                Ok(PanelAction::Consumed)
            }
            KeyCode::Enter => {
                if !self.show_table {
                    return Ok(PanelAction::None);
                }
                match self.selected_course() {
                    Some(course) => {
                        self.detail = Some(course.clone());
                        Ok(PanelAction::Consumed)
                    }
                    None => Ok(PanelAction::SetError("No course selected".to_string())),
                }
            }
            KeyCode::Char('d') => {
                if !self.show_table {
                    return Ok(PanelAction::None);
                }
                self.delete_selected(api).await
            }
            _ => Ok(PanelAction::None),
        }
    }

    async fn handle_edit_key(&mut self, key: KeyEvent, api: &ApiClient) -> Result<PanelAction> {
        match key.code {
            KeyCode::Esc => {
                self.mode = PanelMode::Browse;
                self.clear_focus();
                Ok(PanelAction::ClearMessages)
            }
            KeyCode::Tab | KeyCode::Down => {
                self.current_field = (self.current_field + 1) % self.fields.len();
                self.update_field_focus();
                Ok(PanelAction::Consumed)
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.current_field = if self.current_field == 0 {
                    self.fields.len() - 1
                } else {
                    self.current_field - 1
                };
                self.update_field_focus();
                Ok(PanelAction::Consumed)
            }
            KeyCode::Enter => self.submit_form(api).await,
            KeyCode::Char(c) => {
                self.current_input().insert_char(c);
                Ok(PanelAction::Consumed)
            }
            KeyCode::Backspace => {
                self.current_input().delete_char();
                Ok(PanelAction::Consumed)
            }
            KeyCode::Delete => {
                self.current_input().delete_char_forward();
                Ok(PanelAction::Consumed)
            }
            KeyCode::Left => {
                self.current_input().move_cursor_left();
                Ok(PanelAction::Consumed)
            }
            KeyCode::Right => {
                self.current_input().move_cursor_right();
                Ok(PanelAction::Consumed)
            }
            KeyCode::Home => {
                self.current_input().move_cursor_to_start();
                Ok(PanelAction::Consumed)
            }
            KeyCode::End => {
                self.current_input().move_cursor_to_end();
                Ok(PanelAction::Consumed)
            }
            // Edit mode never leaks keys to global shortcuts
            _ => Ok(PanelAction::Consumed),
        }
    }

    fn current_input(&mut self) -> &mut InputField {
        match self.fields[self.current_field] {
            CourseField::Name => &mut self.name_input,
            CourseField::Code => &mut self.code_input,
            CourseField::Description => &mut self.description_input,
        }
    }

    fn update_field_focus(&mut self) {
        self.clear_focus();
        if self.mode == PanelMode::Edit {
            self.current_input().set_focus(true);
        }
    }

    fn clear_focus(&mut self) {
        self.name_input.set_focus(false);
        self.code_input.set_focus(false);
        self.description_input.set_focus(false);
    }

    /// Submit the create form with trimmed values
    pub async fn submit_form(&mut self, api: &ApiClient) -> Result<PanelAction> {
        let new_course = NewCourse {
            course_name: self.name_input.value.trim().to_string(),
            course_code: self.code_input.value.trim().to_string(),
            course_description: self.description_input.value.trim().to_string(),
        };

        if new_course.course_name.is_empty()
            || new_course.course_code.is_empty()
            || new_course.course_description.is_empty()
        {
            return Ok(PanelAction::SetError(
                "All course fields are required".to_string(),
            ));
        }

        match api.create_course(&new_course).await {
            Ok(response) => {
                info!("Created course {}", new_course.course_code);
                self.clear_form();
                self.mode = PanelMode::Browse;
                self.refresh_courses(api).await;
                Ok(PanelAction::SetStatus(
                    response
                        .message
                        .unwrap_or_else(|| "Course added successfully.".to_string()),
                ))
            }
            // The form stays intact so the user can correct the code
            Err(ApiError::Conflict(message)) => Ok(PanelAction::SetError(
                message.unwrap_or_else(|| "Course already exists.".to_string()),
            )),
            Err(err) => {
                warn!("Create course failed: {}", err);
                Ok(PanelAction::SetError("An error occurred.".to_string()))
            }
        }
    }

    fn clear_form(&mut self) {
        self.name_input.clear();
        self.code_input.clear();
        self.description_input.clear();
        self.current_field = 0;
        self.clear_focus();
    }

    /// Fetch the course list, replacing local state with the response
    pub async fn refresh_courses(&mut self, api: &ApiClient) {
        self.is_loading = true;
        self.fetch_error = None;

        match api.list_courses().await {
            Ok(courses) => {
                info!("Fetched {} courses", courses.len());
                self.courses = courses;
                self.clamp_selection();
            }
            Err(err) => {
                warn!("Course fetch failed: {}", err);
                self.fetch_error = Some(err.to_string());
            }
        }

        self.is_loading = false;
    }

    /// Delete the selected course by id, then re-fetch on success
    pub async fn delete_selected(&mut self, api: &ApiClient) -> Result<PanelAction> {
        let Some(course) = self.selected_course().cloned() else {
            return Ok(PanelAction::SetError("No course selected".to_string()));
        };

        match api.delete_course(course.id).await {
            Ok(()) => {
                info!("Deleted course {} ({})", course.id, course.course_code);
                self.refresh_courses(api).await;
                Ok(PanelAction::SetStatus("Course deleted successfully.".to_string()))
            }
            // The local list stays untouched when the server refuses
            Err(err) => {
                warn!("Delete course {} failed: {}", course.id, err);
                Ok(PanelAction::SetError(
                    "An error occurred while deleting the course.".to_string(),
                ))
            }
        }
    }

    pub fn selected_course(&self) -> Option<&Course> {
        if !self.show_table {
            return None;
        }
        self.table_state.selected().and_then(|i| self.courses.get(i))
    }

    fn select_next(&mut self) {
        if !self.show_table || self.courses.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => (i + 1) % self.courses.len(),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn select_previous(&mut self) {
        if !self.show_table || self.courses.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.courses.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn clamp_selection(&mut self) {
        match self.table_state.selected() {
            Some(_) if self.courses.is_empty() => self.table_state.select(None),
            Some(i) if i >= self.courses.len() => {
                self.table_state.select(Some(self.courses.len() - 1))
            }
            None if self.show_table && !self.courses.is_empty() => {
                self.table_state.select(Some(0))
            }
            _ => {}
        }
    }

    /// Draw the panel: create form on top, course table below
    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Code
                Constraint::Length(3), // Description
                Constraint::Min(0),    // Table
            ])
            .split(area);

        self.name_input.render(f, chunks[0]);
        self.code_input.render(f, chunks[1]);
        self.description_input.render(f, chunks[2]);
        self.draw_table(f, chunks[3]);

        if let Some(course) = &self.detail {
            draw_course_detail(f, area, course);
        }
    }

    fn draw_table(&mut self, f: &mut Frame, area: Rect) {
        if self.is_loading {
            let loading = Paragraph::new("Loading...")
                .style(Styles::info())
                .block(Block::default().title("Courses").borders(Borders::ALL));
            f.render_widget(loading, area);
            return;
        }

        if let Some(err) = &self.fetch_error {
            let error = Paragraph::new(format!("Error: {}", err))
                .style(Styles::error())
                .wrap(Wrap { trim: false })
                .block(Block::default().title("Courses").borders(Borders::ALL));
            f.render_widget(error, area);
            return;
        }

        if !self.show_table {
            let hint = Paragraph::new("Press l to list courses")
                .style(Styles::inactive())
                .block(Block::default().title("Courses").borders(Borders::ALL));
            f.render_widget(hint, area);
            return;
        }

        let rows: Vec<Row> = if self.courses.is_empty() {
            vec![Row::new(vec!["No courses available"]).style(Styles::inactive())]
        } else {
            self.courses
                .iter()
                .map(|course| {
                    Row::new(vec![
                        truncate_cell(&course.course_name, 40),
                        course.course_code.clone(),
                        truncate_cell(&course.course_description, 60),
                    ])
                })
                .collect()
        };

        let header = Row::new(vec!["Title", "Code", "Description"]).style(Styles::title());
        let widths = [
            Constraint::Percentage(35),
            Constraint::Length(12),
            Constraint::Percentage(50),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(format!("Courses ({})", self.courses.len()))
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected())
            .highlight_symbol("> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }
}

/// Popup showing every field of one course
fn draw_course_detail(f: &mut Frame, area: Rect, course: &Course) {
    let popup_area = centered_rect(60, 50, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(vec![
            Span::styled("Title: ", Styles::title()),
            Span::raw(course.course_name.clone()),
        ]),
        Line::from(vec![
            Span::styled("Code: ", Styles::title()),
            Span::raw(course.course_code.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Description: ", Styles::title()),
            Span::raw(course.course_description.clone()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Esc to close", Styles::inactive())),
    ];

    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Course Details")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );

    f.render_widget(popup, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample_course(id: i64, code: &str) -> Course {
        Course {
            id,
            course_name: format!("Course {}", code),
            course_code: code.to_string(),
            course_description: "About things".to_string(),
        }
    }

    #[test]
    fn test_new_panel_starts_in_browse_with_hidden_table() {
        let panel = CoursePanel::new();
        assert_eq!(panel.mode, PanelMode::Browse);
        assert!(!panel.show_table);
        assert!(panel.courses.is_empty());
        assert!(panel.detail.is_none());
    }

    #[test]
    fn test_selection_wraps_over_visible_courses() {
        let mut panel = CoursePanel::new();
        panel.courses = vec![sample_course(1, "A"), sample_course(2, "B")];
        panel.show_table = true;

        panel.select_next();
        assert_eq!(panel.table_state.selected(), Some(0));
        panel.select_next();
        assert_eq!(panel.table_state.selected(), Some(1));
        panel.select_next();
        assert_eq!(panel.table_state.selected(), Some(0));
        panel.select_previous();
        assert_eq!(panel.table_state.selected(), Some(1));
    }

    #[test]
    fn test_selection_inert_while_table_hidden() {
        let mut panel = CoursePanel::new();
        panel.courses = vec![sample_course(1, "A")];

        panel.select_next();
        assert_eq!(panel.table_state.selected(), None);
        assert!(panel.selected_course().is_none());
    }

    #[test]
    fn test_clamp_selection_after_list_shrinks() {
        let mut panel = CoursePanel::new();
        panel.show_table = true;
        panel.courses = vec![sample_course(1, "A"), sample_course(2, "B")];
        panel.table_state.select(Some(1));

        panel.courses.pop();
        panel.clamp_selection();
        assert_eq!(panel.table_state.selected(), Some(0));

        panel.courses.clear();
        panel.clamp_selection();
        assert_eq!(panel.table_state.selected(), None);
    }

    #[test]
    fn test_detail_popup_swallows_keys_until_closed() {
        let mut panel = CoursePanel::new();
        panel.courses = vec![sample_course(1, "A")];
        panel.show_table = true;
        panel.table_state.select(Some(0));
        panel.detail = Some(sample_course(1, "A"));

        assert_eq!(panel.handle_detail_key(key(KeyCode::Char('q'))), PanelAction::Consumed);
        assert!(panel.detail.is_some());
        assert_eq!(panel.table_state.selected(), Some(0));

        assert_eq!(panel.handle_detail_key(key(KeyCode::Esc)), PanelAction::Consumed);
        assert!(panel.detail.is_none());
        assert_eq!(panel.table_state.selected(), None);
    }
}
