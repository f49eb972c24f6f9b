//! Course instance management panel
//!
//! Owns the instance create form, the year/semester filter, and the instance
//! table. The full list is fetched once and filtered locally, so the filter
//! never issues a request. Dropdown options are derived from the full list,
//! which keeps a year visible in the dropdown even while it is filtered out
//! of the table.

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
    api::{ApiClient, ApiError, NewInstance},
    models::{distinct_semesters, distinct_years, Course, CourseInstance, InstanceFilter},
    tui::panels::{PanelAction, PanelMode},
    tui::ui::{centered_rect, render_dropdown, truncate_cell, InputField, SelectableList, Styles},
};

/// Create-form fields, in focus order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstanceField {
    Course,
    Year,
    Semester,
}

/// Which filter dimension a dropdown is editing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    Year,
    Semester,
}

impl FilterKind {
    fn label(&self) -> &'static str {
        match self {
            FilterKind::Year => "Year",
            FilterKind::Semester => "Semester",
        }
    }
}

/// Open dropdown picking a filter value. The leading `None` entry means "Any".
pub struct FilterDropdown {
    pub kind: FilterKind,
    pub list: SelectableList<Option<i32>>,
}

/// Instance panel state
pub struct InstancePanel {
    pub mode: PanelMode,
    pub fields: Vec<InstanceField>,
    pub current_field: usize,

    // Create form
    pub course_select: SelectableList<Course>,
    pub show_course_dropdown: bool,
    pub year_input: InputField,
    pub semester_input: InputField,

    // Filter state
    pub filter: InstanceFilter,
    pub year_options: Vec<i32>,
    pub semester_options: Vec<i32>,
    pub filter_dropdown: Option<FilterDropdown>,

    // Fetched data and its view state
    pub courses: Vec<Course>,
    pub instances: Vec<CourseInstance>,
    pub visible: Vec<CourseInstance>,
    pub show_table: bool,
    pub is_loading: bool,
    pub fetch_error: Option<String>,
    pub bootstrapped: bool,
    pub table_state: TableState,

    /// Instance shown in the detail popup, if any
    pub detail: Option<CourseInstance>,
}

impl InstancePanel {
    pub fn new() -> Self {
        Self {
            mode: PanelMode::Browse,
            fields: vec![
                InstanceField::Course,
                InstanceField::Year,
                InstanceField::Semester,
            ],
            current_field: 0,

            course_select: {
                let mut list = SelectableList::new(Vec::new());
                list.select(None);
                list
            },
            show_course_dropdown: false,
            year_input: InputField::new("Year")
                .with_placeholder("e.g., 2025")
                .digits_only(),
            semester_input: InputField::new("Semester")
                .with_placeholder("e.g., 1")
                .digits_only(),

            filter: InstanceFilter::default(),
            year_options: Vec::new(),
            semester_options: Vec::new(),
            filter_dropdown: None,

            courses: Vec::new(),
            instances: Vec::new(),
            visible: Vec::new(),
            show_table: false,
            is_loading: false,
            fetch_error: None,
            bootstrapped: false,
            table_state: TableState::default(),

            detail: None,
        }
    }

    /// Restore the pristine panel state: forms, filters, and table cleared
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Fetch both lists the panel depends on. Runs when the tab first becomes
    /// active and again after a reset.
    pub async fn bootstrap(&mut self, api: &ApiClient) {
        self.bootstrapped = true;
        self.is_loading = true;
        self.fetch_error = None;

        if let Err(err) = self.load_courses(api).await {
            warn!("Course fetch failed: {}", err);
            self.fetch_error = Some(err.to_string());
        } else if let Err(err) = self.load_instances(api).await {
            warn!("Instance fetch failed: {}", err);
            self.fetch_error = Some(err.to_string());
        }

        self.is_loading = false;
    }

    /// Re-fetch the instance list, keeping the current filter
    pub async fn refresh_instances(&mut self, api: &ApiClient) {
        self.is_loading = true;
        self.fetch_error = None;

        if let Err(err) = self.load_instances(api).await {
            warn!("Instance fetch failed: {}", err);
            self.fetch_error = Some(err.to_string());
        }

        self.is_loading = false;
    }

    async fn load_courses(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let courses = api.list_courses().await?;
        info!("Fetched {} courses for the instance form", courses.len());
        self.courses = courses.clone();
        self.course_select.set_items(courses);
        self.course_select.select(None);
        Ok(())
    }

    async fn load_instances(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let instances = api.list_instances().await?;
        info!("Fetched {} instances", instances.len());
        self.ingest_instances(instances);
        Ok(())
    }

    /// Store a freshly fetched list. Dropdown options always come from the
    /// full list; the visible subset is recomputed only while the table is
    /// shown.
    fn ingest_instances(&mut self, instances: Vec<CourseInstance>) {
        self.instances = instances;
        self.year_options = distinct_years(&self.instances);
        self.semester_options = distinct_semesters(&self.instances);
        if self.show_table {
            self.recompute_visible();
        }
    }

    fn recompute_visible(&mut self) {
        self.visible = self.filter.apply(&self.instances);
        self.clamp_selection();
    }

    /// Show the table with the given filter applied. Entry point for the
    /// `instances` startup command.
    pub fn show_with_filter(&mut self, filter: InstanceFilter) {
        self.filter = filter;
        self.show_table = true;
        self.recompute_visible();
    }

    fn set_filter(&mut self, kind: FilterKind, value: Option<i32>) {
        match kind {
            FilterKind::Year => self.filter.year = value,
            FilterKind::Semester => self.filter.semester = value,
        }
        if self.show_table {
            self.recompute_visible();
        }
    }

    fn open_filter_dropdown(&mut self, kind: FilterKind) {
        let options = match kind {
            FilterKind::Year => &self.year_options,
            FilterKind::Semester => &self.semester_options,
        };
        let items: Vec<Option<i32>> = std::iter::once(None)
            .chain(options.iter().copied().map(Some))
            .collect();

        let current = match kind {
            FilterKind::Year => self.filter.year,
            FilterKind::Semester => self.filter.semester,
        };
        let position = items.iter().position(|item| *item == current).unwrap_or(0);

        let mut list = SelectableList::new(items);
        list.select(Some(position));
        self.filter_dropdown = Some(FilterDropdown { kind, list });
    }

    /// Handle a key event. Returns how the shell should react.
    pub async fn handle_key(&mut self, key: KeyEvent, api: &ApiClient) -> Result<PanelAction> {
        if self.detail.is_some() {
            return Ok(self.handle_detail_key(key));
        }
        if self.filter_dropdown.is_some() {
            return Ok(self.handle_filter_dropdown_key(key));
        }
        if self.show_course_dropdown {
            return Ok(self.handle_course_dropdown_key(key));
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

    fn handle_course_dropdown_key(&mut self, key: KeyEvent) -> PanelAction {
        match key.code {
            KeyCode::Up => self.course_select.previous(),
            KeyCode::Down => self.course_select.next(),
            KeyCode::Enter | KeyCode::Esc => self.show_course_dropdown = false,
            _ => {}
        }
        PanelAction::Consumed
    }

    fn handle_filter_dropdown_key(&mut self, key: KeyEvent) -> PanelAction {
        let Some(dropdown) = self.filter_dropdown.as_mut() else {
            return PanelAction::None;
        };

        match key.code {
            KeyCode::Up => {
                dropdown.list.previous();
                PanelAction::Consumed
            }
            KeyCode::Down => {
                dropdown.list.next();
                PanelAction::Consumed
            }
            KeyCode::Enter => {
                let choice = dropdown.list.selected().copied().flatten();
                let kind = dropdown.kind;
                self.filter_dropdown = None;
                self.set_filter(kind, choice);
                match choice {
                    Some(value) => {
                        PanelAction::SetStatus(format!("{} filter: {}", kind.label(), value))
                    }
                    None => PanelAction::SetStatus(format!("{} filter: Any", kind.label())),
                }
            }
            KeyCode::Esc => {
                self.filter_dropdown = None;
                PanelAction::Consumed
            }
            _ => PanelAction::Consumed,
        }
    }

    async fn handle_browse_key(&mut self, key: KeyEvent, api: &ApiClient) -> Result<PanelAction> {
        match key.code {
            KeyCode::Char('l') => {
                self.show_table = true;
                self.recompute_visible();
                Ok(PanelAction::SetStatus(format!(
                    "Showing {} of {} instances",
                    self.visible.len(),
                    self.instances.len()
                )))
            }
            KeyCode::Char('f') => {
                self.show_table = true;
                self.recompute_visible();
                Ok(PanelAction::SetStatus(format!(
                    "Filter applied: {} of {} instances",
                    self.visible.len(),
                    self.instances.len()
                )))
            }
            KeyCode::Char('y') => {
                self.open_filter_dropdown(FilterKind::Year);
                Ok(PanelAction::Consumed)
            }
            KeyCode::Char('s') => {
                self.open_filter_dropdown(FilterKind::Semester);
                Ok(PanelAction::Consumed)
            }
            KeyCode::Char('a') => {
                self.mode = PanelMode::Edit;
                self.current_field = 0;
                self.update_field_focus();
                Ok(PanelAction::SetStatus(
                    "New instance: Tab to switch fields, Enter to submit, Esc to cancel"
                        .to_string(),
                ))
            }
            KeyCode::Char('r') => {
                self.reset();
                self.bootstrap(api).await;
                Ok(PanelAction::ClearMessages)
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
                match self.selected_instance() {
                    Some(instance) => {
                        self.detail = Some(instance.clone());
                        Ok(PanelAction::Consumed)
                    }
                    None => Ok(PanelAction::SetError("No instance selected".to_string())),
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
            KeyCode::Enter => {
                if self.fields[self.current_field] == InstanceField::Course {
                    self.open_course_dropdown();
                    Ok(PanelAction::Consumed)
                } else {
                    self.submit_form(api).await
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.current_input() {
                    input.insert_char(c);
                }
                Ok(PanelAction::Consumed)
            }
            KeyCode::Backspace => {
                if let Some(input) = self.current_input() {
                    input.delete_char();
                }
                Ok(PanelAction::Consumed)
            }
            KeyCode::Delete => {
                if let Some(input) = self.current_input() {
                    input.delete_char_forward();
                }
                Ok(PanelAction::Consumed)
            }
            KeyCode::Left => {
                if let Some(input) = self.current_input() {
                    input.move_cursor_left();
                }
                Ok(PanelAction::Consumed)
            }
            KeyCode::Right => {
                if let Some(input) = self.current_input() {
                    input.move_cursor_right();
                }
                Ok(PanelAction::Consumed)
            }
            KeyCode::Home => {
                if let Some(input) = self.current_input() {
                    input.move_cursor_to_start();
                }
                Ok(PanelAction::Consumed)
            }
            KeyCode::End => {
                if let Some(input) = self.current_input() {
                    input.move_cursor_to_end();
                }
                Ok(PanelAction::Consumed)
            }
            // Edit mode never leaks keys to global shortcuts
            _ => Ok(PanelAction::Consumed),
        }
    }

    fn current_input(&mut self) -> Option<&mut InputField> {
        match self.fields[self.current_field] {
            InstanceField::Course => None,
            InstanceField::Year => Some(&mut self.year_input),
            InstanceField::Semester => Some(&mut self.semester_input),
        }
    }

    fn update_field_focus(&mut self) {
        self.clear_focus();
        if self.mode == PanelMode::Edit {
            if let Some(input) = self.current_input() {
                input.set_focus(true);
            }
        }
    }

    fn clear_focus(&mut self) {
        self.year_input.set_focus(false);
        self.semester_input.set_focus(false);
    }

    fn open_course_dropdown(&mut self) {
        if self.course_select.selected_index().is_none() && !self.course_select.is_empty() {
            self.course_select.select(Some(0));
        }
        self.show_course_dropdown = true;
    }

    /// Submit the create form. Year and semester go to the server as numbers.
    pub async fn submit_form(&mut self, api: &ApiClient) -> Result<PanelAction> {
        let Some(course_id) = self.course_select.selected().map(|c| c.id) else {
            return Ok(PanelAction::SetError("Select a course first".to_string()));
        };

        let year = match parse_form_number(&self.year_input.value, "Year") {
            Ok(year) => year,
            Err(message) => return Ok(PanelAction::SetError(message)),
        };
        let semester = match parse_form_number(&self.semester_input.value, "Semester") {
            Ok(semester) => semester,
            Err(message) => return Ok(PanelAction::SetError(message)),
        };

        let new_instance = NewInstance {
            course: course_id,
            year,
            semester,
        };

        match api.create_instance(&new_instance).await {
            Ok(response) => {
                info!(
                    "Created instance of course {} for {}-{}",
                    course_id, year, semester
                );
                self.clear_form();
                self.mode = PanelMode::Browse;
                self.refresh_instances(api).await;
                Ok(PanelAction::SetStatus(response.message.unwrap_or_else(
                    || "Course instance added successfully.".to_string(),
                )))
            }
            // The form stays intact so the user can correct it
            Err(ApiError::Conflict(message)) => Ok(PanelAction::SetError(
                message.unwrap_or_else(|| "Course instance already exists.".to_string()),
            )),
            Err(err) => {
                warn!("Create instance failed: {}", err);
                Ok(PanelAction::SetError("An error occurred.".to_string()))
            }
        }
    }

    fn clear_form(&mut self) {
        self.course_select.select(None);
        self.year_input.clear();
        self.semester_input.clear();
        self.current_field = 0;
        self.clear_focus();
    }

    /// Delete the selected instance by id, then re-fetch on success
    pub async fn delete_selected(&mut self, api: &ApiClient) -> Result<PanelAction> {
        let Some(instance) = self.selected_instance().cloned() else {
            return Ok(PanelAction::SetError("No instance selected".to_string()));
        };

        match api.delete_instance(instance.id).await {
            Ok(()) => {
                info!("Deleted instance {}", instance.id);
                self.refresh_instances(api).await;
                Ok(PanelAction::SetStatus(
                    "Course instance deleted successfully.".to_string(),
                ))
            }
            // The local list stays untouched when the server refuses
            Err(err) => {
                warn!("Delete instance {} failed: {}", instance.id, err);
                Ok(PanelAction::SetError(
                    "An error occurred while deleting the instance.".to_string(),
                ))
            }
        }
    }

    pub fn selected_instance(&self) -> Option<&CourseInstance> {
        if !self.show_table {
            return None;
        }
        self.table_state.selected().and_then(|i| self.visible.get(i))
    }

    fn select_next(&mut self) {
        if !self.show_table || self.visible.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => (i + 1) % self.visible.len(),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn select_previous(&mut self) {
        if !self.show_table || self.visible.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.visible.len() - 1
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
            Some(_) if self.visible.is_empty() => self.table_state.select(None),
            Some(i) if i >= self.visible.len() => {
                self.table_state.select(Some(self.visible.len() - 1))
            }
            None if self.show_table && !self.visible.is_empty() => {
                self.table_state.select(Some(0))
            }
            _ => {}
        }
    }

    /// Draw the panel: create form, filter bar, then the instance table
    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Course select
                Constraint::Length(3), // Year
                Constraint::Length(3), // Semester
                Constraint::Length(3), // Filter bar
                Constraint::Min(0),    // Table
            ])
            .split(area);

        self.draw_course_field(f, chunks[0]);
        self.year_input.render(f, chunks[1]);
        self.semester_input.render(f, chunks[2]);
        self.draw_filter_bar(f, chunks[3]);
        self.draw_table(f, chunks[4]);

        if self.show_course_dropdown {
            render_dropdown(f, area, "Select Course", &mut self.course_select, |course| {
                format!("{} ({})", course.course_name, course.course_code)
            });
        }

        if let Some(dropdown) = &mut self.filter_dropdown {
            let title = match dropdown.kind {
                FilterKind::Year => "Filter by Year",
                FilterKind::Semester => "Filter by Semester",
            };
            render_dropdown(f, area, title, &mut dropdown.list, |item| match item {
                Some(value) => value.to_string(),
                None => "Any".to_string(),
            });
        }

        if let Some(instance) = &self.detail {
            draw_instance_detail(f, area, instance, &self.courses);
        }
    }

    fn draw_course_field(&self, f: &mut Frame, area: Rect) {
        let selected = self
            .course_select
            .selected()
            .map(|course| format!("{} ({})", course.course_name, course.course_code))
            .unwrap_or_else(|| "Select Course".to_string());

        let focused = self.mode == PanelMode::Edit
            && self.fields[self.current_field] == InstanceField::Course;
        let border = if focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };
        let text = if self.course_select.selected().is_none() {
            Styles::inactive()
        } else {
            Styles::default()
        };

        let field = Paragraph::new(selected).style(text).block(
            Block::default()
                .title("Course (Enter to select)")
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(field, area);
    }

    fn draw_filter_bar(&self, f: &mut Frame, area: Rect) {
        let year = self.filter.year.map_or("Any".to_string(), |v| v.to_string());
        let semester = self
            .filter
            .semester
            .map_or("Any".to_string(), |v| v.to_string());

        let line = Line::from(vec![
            Span::styled("Year: ", Styles::title()),
            Span::raw(year),
            Span::raw("    "),
            Span::styled("Semester: ", Styles::title()),
            Span::raw(semester),
        ]);

        let bar = Paragraph::new(line).block(
            Block::default()
                .title("Filter (y: year, s: semester, f: apply)")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(bar, area);
    }

    fn draw_table(&mut self, f: &mut Frame, area: Rect) {
        if self.is_loading {
            let loading = Paragraph::new("Loading...")
                .style(Styles::info())
                .block(Block::default().title("Instances").borders(Borders::ALL));
            f.render_widget(loading, area);
            return;
        }

        if let Some(err) = &self.fetch_error {
            let error = Paragraph::new(format!("Error: {}", err))
                .style(Styles::error())
                .wrap(Wrap { trim: false })
                .block(Block::default().title("Instances").borders(Borders::ALL));
            f.render_widget(error, area);
            return;
        }

        if !self.show_table {
            let hint = Paragraph::new("Press l to list instances, f to filter")
                .style(Styles::inactive())
                .block(Block::default().title("Instances").borders(Borders::ALL));
            f.render_widget(hint, area);
            return;
        }

        let rows: Vec<Row> = if self.visible.is_empty() {
            vec![Row::new(vec!["No instances available.".to_string()]).style(Styles::inactive())]
        } else {
            self.visible
                .iter()
                .map(|instance| {
                    let name = instance
                        .course
                        .resolve(&self.courses)
                        .map(|c| c.course_name.as_str())
                        .unwrap_or("Unknown");
                    Row::new(vec![
                        truncate_cell(name, 50),
                        format!("{}-{}", instance.year, instance.semester),
                    ])
                })
                .collect()
        };

        let header = Row::new(vec!["Course Name", "Year-Sem"]).style(Styles::title());
        let widths = [Constraint::Percentage(70), Constraint::Length(10)];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(format!(
                        "Instances ({} of {})",
                        self.visible.len(),
                        self.instances.len()
                    ))
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected())
            .highlight_symbol("> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }
}

/// Popup showing one instance with its course resolved against the cache
fn draw_instance_detail(f: &mut Frame, area: Rect, instance: &CourseInstance, courses: &[Course]) {
    let popup_area = centered_rect(60, 50, area);
    f.render_widget(Clear, popup_area);

    let course = instance.course.resolve(courses);
    let name = course.map(|c| c.course_name.as_str()).unwrap_or("N/A");
    let code = course.map(|c| c.course_code.as_str()).unwrap_or("N/A");

    let lines = vec![
        Line::from(vec![
            Span::styled("Course Name: ", Styles::title()),
            Span::raw(name.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Course Code: ", Styles::title()),
            Span::raw(code.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Year: ", Styles::title()),
            Span::raw(instance.year.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Semester: ", Styles::title()),
            Span::raw(instance.semester.to_string()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Esc to close", Styles::inactive())),
    ];

    let popup = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Instance Details")
            .borders(Borders::ALL)
            .border_style(Styles::active_border()),
    );

    f.render_widget(popup, popup_area);
}

/// Parse a required numeric form value
fn parse_form_number(value: &str, label: &str) -> Result<i32, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} is required", label));
    }
    trimmed
        .parse::<i32>()
        .map_err(|_| format!("{} must be a number", label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseRef;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample_instance(id: i64, course_id: i64, year: i32, semester: i32) -> CourseInstance {
        CourseInstance {
            id,
            course: CourseRef::Id(course_id),
            year,
            semester,
        }
    }

    fn panel_with_instances(instances: Vec<CourseInstance>) -> InstancePanel {
        let mut panel = InstancePanel::new();
        panel.ingest_instances(instances);
        panel
    }

    #[test]
    fn test_parse_form_number() {
        assert_eq!(parse_form_number("2024", "Year"), Ok(2024));
        assert_eq!(parse_form_number(" 7 ", "Semester"), Ok(7));
        assert_eq!(
            parse_form_number("", "Year"),
            Err("Year is required".to_string())
        );
        assert_eq!(
            parse_form_number("20x4", "Year"),
            Err("Year must be a number".to_string())
        );
        // Too many digits to fit an i32
        assert_eq!(
            parse_form_number("99999999999", "Year"),
            Err("Year must be a number".to_string())
        );
    }

    #[test]
    fn test_ingest_derives_options_from_full_list() {
        let panel = panel_with_instances(vec![
            sample_instance(1, 1, 2024, 2),
            sample_instance(2, 1, 2023, 1),
            sample_instance(3, 2, 2024, 1),
        ]);
        assert_eq!(panel.year_options, vec![2023, 2024]);
        assert_eq!(panel.semester_options, vec![1, 2]);
    }

    #[test]
    fn test_ingest_skips_recompute_while_table_hidden() {
        let panel = panel_with_instances(vec![sample_instance(1, 1, 2024, 1)]);
        assert!(!panel.show_table);
        assert!(panel.visible.is_empty());
    }

    #[test]
    fn test_filter_recomputes_only_while_visible() {
        let mut panel = panel_with_instances(vec![
            sample_instance(1, 1, 2023, 1),
            sample_instance(2, 1, 2024, 1),
        ]);

        // Hidden table: the filter changes but nothing is projected
        panel.set_filter(FilterKind::Year, Some(2024));
        assert!(panel.visible.is_empty());

        panel.show_table = true;
        panel.recompute_visible();
        assert_eq!(panel.visible.len(), 1);
        assert_eq!(panel.visible[0].id, 2);

        // Visible table: changing the filter reprojects immediately
        panel.set_filter(FilterKind::Year, None);
        assert_eq!(panel.visible.len(), 2);
    }

    #[test]
    fn test_options_keep_filtered_out_values() {
        let mut panel = panel_with_instances(vec![
            sample_instance(1, 1, 2023, 1),
            sample_instance(2, 1, 2024, 2),
        ]);
        panel.show_table = true;
        panel.set_filter(FilterKind::Year, Some(2024));

        assert_eq!(panel.visible.len(), 1);
        // 2023 stays available even though no visible row carries it
        assert_eq!(panel.year_options, vec![2023, 2024]);
        assert_eq!(panel.semester_options, vec![1, 2]);
    }

    #[test]
    fn test_filter_dropdown_positions_at_current_value() {
        let mut panel = panel_with_instances(vec![
            sample_instance(1, 1, 2023, 1),
            sample_instance(2, 1, 2024, 1),
            sample_instance(3, 1, 2025, 1),
        ]);
        panel.filter.year = Some(2024);
        panel.open_filter_dropdown(FilterKind::Year);

        let dropdown = panel.filter_dropdown.as_ref().unwrap();
        // Items are [Any, 2023, 2024, 2025]; 2024 sits at index 2
        assert_eq!(dropdown.list.selected_index(), Some(2));
    }

    #[test]
    fn test_filter_dropdown_enter_applies_and_esc_cancels() {
        let mut panel = panel_with_instances(vec![
            sample_instance(1, 1, 2023, 1),
            sample_instance(2, 1, 2024, 1),
        ]);
        panel.show_table = true;
        panel.recompute_visible();

        panel.open_filter_dropdown(FilterKind::Year);
        panel.handle_filter_dropdown_key(key(KeyCode::Down));
        let action = panel.handle_filter_dropdown_key(key(KeyCode::Enter));
        assert_eq!(action, PanelAction::SetStatus("Year filter: 2023".to_string()));
        assert_eq!(panel.filter.year, Some(2023));
        assert_eq!(panel.visible.len(), 1);
        assert!(panel.filter_dropdown.is_none());

        // Esc leaves the applied filter untouched
        panel.open_filter_dropdown(FilterKind::Year);
        panel.handle_filter_dropdown_key(key(KeyCode::Down));
        panel.handle_filter_dropdown_key(key(KeyCode::Esc));
        assert_eq!(panel.filter.year, Some(2023));
        assert!(panel.filter_dropdown.is_none());
    }

    #[test]
    fn test_reset_restores_pristine_state() {
        let mut panel = panel_with_instances(vec![sample_instance(1, 1, 2023, 1)]);
        panel.show_table = true;
        panel.recompute_visible();
        panel.filter.year = Some(2023);
        panel.year_input.insert_char('2');
        panel.bootstrapped = true;

        panel.reset();
        assert!(!panel.show_table);
        assert!(!panel.bootstrapped);
        assert!(panel.filter.is_empty());
        assert!(panel.year_input.is_empty());
        assert!(panel.instances.is_empty());
        assert!(panel.visible.is_empty());
    }

    #[test]
    fn test_selection_clamped_when_filter_narrows() {
        let mut panel = panel_with_instances(vec![
            sample_instance(1, 1, 2023, 1),
            sample_instance(2, 1, 2023, 2),
            sample_instance(3, 1, 2024, 1),
        ]);
        panel.show_table = true;
        panel.recompute_visible();
        panel.table_state.select(Some(2));

        panel.set_filter(FilterKind::Year, Some(2023));
        assert_eq!(panel.table_state.selected(), Some(1));

        panel.set_filter(FilterKind::Semester, Some(3));
        assert_eq!(panel.table_state.selected(), None);
    }
}
