//! Main TUI application state and logic

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame, Terminal,
};

use crate::api::ApiClient;
use crate::config::Config;
use crate::tui::panels::{CoursePanel, InstancePanel, PanelAction};
use crate::tui::ui::{centered_rect, Styles};

/// Application tabs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Courses,
    Instances,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Courses => "Courses",
            Tab::Instances => "Course Instances",
        }
    }

    fn index(&self) -> usize {
        match self {
            Tab::Courses => 0,
            Tab::Instances => 1,
        }
    }
}

/// Main TUI application state
pub struct App {
    /// Currently active tab
    pub active_tab: Tab,
    /// Application configuration
    pub config: Config,
    /// Shared API client
    pub api: ApiClient,

    // Panel states, kept alive across tab switches
    pub courses: CoursePanel,
    pub instances: InstancePanel,

    // Global application state
    pub should_quit: bool,
    pub show_help_popup: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    /// Create a new TUI application
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config)?;

        Ok(Self {
            active_tab: Tab::Courses,
            config,
            api,

            courses: CoursePanel::new(),
            instances: InstancePanel::new(),

            should_quit: false,
            show_help_popup: false,
            status_message: None,
            error_message: None,
        })
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if let Ok(event) = crossterm::event::read() {
                if let crossterm::event::Event::Key(key) = event {
                    self.handle_key_event(key).await?;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle keyboard input.
    ///
    /// The active panel sees the key first; global shortcuts apply only to
    /// keys the panel reports unhandled, so typing `q` into a form field
    /// never quits the application.
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.show_help_popup {
            match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) | KeyCode::Char('q') => {
                    self.show_help_popup = false;
                }
                _ => {}
            }
            return Ok(());
        }

        let action = match self.active_tab {
            Tab::Courses => self.courses.handle_key(key, &self.api).await?,
            Tab::Instances => self.instances.handle_key(key, &self.api).await?,
        };

        match action {
            PanelAction::None => self.handle_global_key(key).await?,
            PanelAction::Consumed => {}
            PanelAction::SetStatus(message) => self.set_status(message),
            PanelAction::SetError(message) => self.set_error(message),
            PanelAction::ClearMessages => self.clear_messages(),
        }

        Ok(())
    }

    async fn handle_global_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                self.show_help_popup = true;
            }
            KeyCode::Tab => {
                let next = match self.active_tab {
                    Tab::Courses => Tab::Instances,
                    Tab::Instances => Tab::Courses,
                };
                self.activate_tab(next).await;
            }
            KeyCode::Char('1') => self.activate_tab(Tab::Courses).await,
            KeyCode::Char('2') => self.activate_tab(Tab::Instances).await,
            _ => {}
        }
        Ok(())
    }

    /// Switch tabs, clearing transient messages. The instance panel fetches
    /// its data the first time it becomes active; after that, switching back
    /// and forth keeps both panels exactly as the user left them.
    pub async fn activate_tab(&mut self, tab: Tab) {
        if self.active_tab != tab {
            self.clear_messages();
        }
        self.active_tab = tab;

        if tab == Tab::Instances && !self.instances.bootstrapped {
            self.instances.bootstrap(&self.api).await;
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tab bar
                Constraint::Min(0),    // Panel content
                Constraint::Length(3), // Status bar
            ])
            .split(size);

        self.draw_tab_bar(f, chunks[0]);

        match self.active_tab {
            Tab::Courses => self.courses.draw(f, chunks[1]),
            Tab::Instances => self.instances.draw(f, chunks[1]),
        }

        self.draw_status_bar(f, chunks[2]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_tab_bar(&self, f: &mut Frame, area: Rect) {
        let titles = vec![Tab::Courses.title(), Tab::Instances.title()];

        let tabs = Tabs::new(titles)
            .select(self.active_tab.index())
            .block(Block::default().title("coursedesk").borders(Borders::ALL))
            .highlight_style(Styles::selected())
            .divider("|");

        f.render_widget(tabs, area);
    }

    /// Status bar with transient messages or per-tab key hints
    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if let Some(ref msg) = self.status_message {
            format!("Status: {}", msg)
        } else if let Some(ref err) = self.error_message {
            format!("Error: {}", err)
        } else {
            match self.active_tab {
                Tab::Courses => {
                    "Courses | a: add | l: list | Enter: details | d: delete | r: reset | Tab: switch | q: quit | ?: help"
                }
                Tab::Instances => {
                    "Instances | a: add | l: list | y/s: filter | f: apply | d: delete | r: refresh | Tab: switch | q: quit"
                }
            }
            .to_string()
        };

        let style = if self.error_message.is_some() {
            Style::default().fg(Color::Red)
        } else if self.status_message.is_some() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };

        let status_bar = Paragraph::new(status_text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    /// Draw help popup with context-sensitive shortcuts
    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(80, 70, area);

        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(self.get_context_help())
            .block(
                Block::default()
                    .title("Help - Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        f.render_widget(help_popup, popup_area);
    }

    /// Get context-sensitive help content
    fn get_context_help(&self) -> String {
        let global_help = "Global Shortcuts:\n\
            Tab - Switch tab\n\
            1 / 2 - Jump to a tab\n\
            q - Quit application\n\
            F1 / ? - Toggle this help\n\n";

        let tab_help = match self.active_tab {
            Tab::Courses => {
                "Courses:\n\
                a - Add a course (Tab between fields, Enter submits, Esc cancels)\n\
                l - List courses\n\
                \u{2191}/\u{2193} - Navigate the table\n\
                Enter - Course details\n\
                d - Delete the selected course\n\
                r - Hide the table"
            }
            Tab::Instances => {
                "Course Instances:\n\
                a - Add an instance (Enter on Course opens the picker)\n\
                l - List instances\n\
                y / s - Pick a year / semester filter\n\
                f - Apply the filter\n\
                \u{2191}/\u{2193} - Navigate the table\n\
                Enter - Instance details\n\
                d - Delete the selected instance\n\
                r - Reset the tab and re-fetch"
            }
        };

        format!("{}{}", global_help, tab_help)
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    /// Set error message
    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }

    /// Clear status and error messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }
}
