//! coursedesk binary entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use coursedesk::{
    api::ApiClient,
    config::Config,
    models::InstanceFilter,
    tui::{ui::truncate_cell, App, Tab},
};

#[derive(Parser)]
#[command(name = "coursedesk")]
#[command(about = "Terminal client for managing courses and course instances")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Run in CLI mode (print output and exit, no interactive TUI)
    #[arg(long, global = true)]
    pub cli: bool,
    /// Base URL of the course catalog API
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List courses
    Courses,
    /// List course instances, optionally filtered by year and semester
    Instances {
        /// Keep only instances from this year
        #[arg(long)]
        year: Option<i32>,
        /// Keep only instances from this semester
        #[arg(long)]
        semester: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "coursedesk=info");
    }

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url);
    }
    config.validate()?;

    // Handle CLI mode - print output and exit without TUI
    if cli.cli {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(EnvFilter::from_default_env())
            .init();

        if let Some(command) = cli.command {
            return handle_cli_command(command, &config).await;
        } else {
            eprintln!("Error: CLI mode requires a command");
            std::process::exit(1);
        }
    }

    // Initialize logging to file for TUI mode to avoid interfering with display
    init_tui_logging(&config);

    info!("Starting coursedesk TUI...");

    // Setup terminal for TUI mode
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run the application
    let mut app = App::new(config)?;

    // Handle command line arguments for TUI mode
    if let Some(command) = cli.command {
        handle_startup_command(&mut app, command).await?;
    }

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Handle any errors that occurred during execution
    match result {
        Ok(_) => {
            info!("coursedesk exited successfully");
        }
        Err(e) => {
            error!("coursedesk encountered an error: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Route log output to the configured file while the TUI owns the terminal
fn init_tui_logging(config: &Config) {
    let directory = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = config
        .log_file
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("coursedesk.log"));

    let file_appender = tracing_appender::rolling::never(directory, file_name);

    tracing_subscriber::fmt()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

/// Handle CLI mode commands - print output and exit
async fn handle_cli_command(command: Commands, config: &Config) -> Result<()> {
    let api = ApiClient::new(config)?;

    match command {
        Commands::Courses => match api.list_courses().await {
            Ok(courses) => {
                if courses.is_empty() {
                    println!("No courses found");
                } else {
                    println!("Found {} courses", courses.len());
                    println!();
                    println!(
                        "{:<6} {:<40} {:<12} {:<50}",
                        "Id", "Title", "Code", "Description"
                    );
                    println!("{}", "-".repeat(110));

                    for course in &courses {
                        println!(
                            "{:<6} {:<40} {:<12} {:<50}",
                            course.id,
                            truncate_cell(&course.course_name, 38),
                            course.course_code,
                            truncate_cell(&course.course_description, 48),
                        );
                    }

                    println!();
                    println!("Total: {} courses", courses.len());
                }
            }
            Err(e) => {
                eprintln!("Course listing failed: {}", e);
                std::process::exit(1);
            }
        },

        Commands::Instances { year, semester } => {
            let filter = InstanceFilter { year, semester };

            // Course names come from the course list; instances may carry
            // bare course ids on the wire
            let courses = match api.list_courses().await {
                Ok(courses) => courses,
                Err(e) => {
                    eprintln!("Course listing failed: {}", e);
                    std::process::exit(1);
                }
            };

            match api.list_instances().await {
                Ok(instances) => {
                    let total = instances.len();
                    let visible = filter.apply(&instances);

                    if visible.is_empty() {
                        println!("No course instances found");
                    } else {
                        if filter.is_empty() {
                            println!("Found {} course instances", visible.len());
                        } else {
                            println!("Found {} of {} course instances", visible.len(), total);
                        }
                        println!();
                        println!("{:<6} {:<40} {:<6} {:<8}", "Id", "Course", "Year", "Semester");
                        println!("{}", "-".repeat(64));

                        for instance in &visible {
                            let name = instance
                                .course
                                .resolve(&courses)
                                .map(|course| course.course_name.as_str())
                                .unwrap_or("Unknown");

                            println!(
                                "{:<6} {:<40} {:<6} {:<8}",
                                instance.id,
                                truncate_cell(name, 38),
                                instance.year,
                                instance.semester,
                            );
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Instance listing failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Handle startup commands from command line arguments
async fn handle_startup_command(app: &mut App, command: Commands) -> Result<()> {
    match command {
        Commands::Courses => {
            info!("Startup command: list courses");

            app.courses.show_table = true;
            app.courses.refresh_courses(&app.api).await;

            if let Some(err) = app.courses.fetch_error.clone() {
                app.set_error(err);
            } else {
                let count = app.courses.courses.len();
                app.set_status(format!("Found {} courses", count));
            }
        }

        Commands::Instances { year, semester } => {
            info!("Startup command: list instances");

            app.activate_tab(Tab::Instances).await;
            app.instances
                .show_with_filter(InstanceFilter { year, semester });

            if let Some(err) = app.instances.fetch_error.clone() {
                app.set_error(err);
            } else {
                let shown = app.instances.visible.len();
                let total = app.instances.instances.len();
                app.set_status(format!("Showing {} of {} instances", shown, total));
            }
        }
    }

    Ok(())
}
