use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use skyboard_core::{AppError, Config, ConfigError};
use skyboard_weather::location::{locator_from_config, StaticLocator};
use skyboard_weather::units::{self, wind_direction, wind_speed_kmh};
use skyboard_weather::view::{daily_summary, hourly_chart};
use skyboard_weather::{
    Coordinates, DeviceLocator, FileStore, ProviderSettings, SessionState, TemperatureUnit,
    WeatherBundle, WeatherCache, WeatherProvider, WeatherSession,
};
use skyboard_widgets::{
    NoteBook, Priority, PreferenceStore, SortDirection, SortField, Todo, TodoEdit, TodoFilter,
    TodoList, WidgetError,
};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "skyboard", version, about = "Weather, to-dos and notes for your dashboard")]
struct Cli {
    /// Device latitude, used when no location has been saved
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Device longitude
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show weather for the saved location or the device location
    Show,
    /// Reload weather for the saved location, else the device location
    Refresh,
    /// Look up a ZIP code and remember it
    Search { zip: String },
    /// Switch between Celsius and Fahrenheit
    Unit,
    /// Manage the to-do list
    Todo {
        #[command(subcommand)]
        action: TodoCommand,
    },
    /// Manage notes
    Note {
        #[command(subcommand)]
        action: NoteCommand,
    },
}

#[derive(Subcommand)]
enum TodoCommand {
    /// List to-dos (all, active or completed)
    List {
        #[arg(long, default_value = "all")]
        filter: TodoFilter,
        /// created, due or priority
        #[arg(long, default_value = "created")]
        sort: SortField,
        #[arg(long, default_value = "desc")]
        direction: SortDirection,
    },
    /// Add a to-do
    Add {
        title: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Mark a to-do done, or open again
    Toggle { id: String },
    /// Change a to-do's title, priority or due date
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        #[arg(long)]
        clear_due: bool,
    },
    /// Delete a to-do
    Remove { id: String },
    /// Mark every to-do done
    CompleteAll,
    /// Delete every completed to-do
    ClearCompleted,
}

#[derive(Subcommand)]
enum NoteCommand {
    /// List notes, newest first
    List,
    /// Print one note in full
    Show { id: String },
    /// Create a note
    Add { title: String, content: String },
    /// Replace a note's title or content
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note
    Remove { id: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Widget(#[from] WidgetError),
}

impl CliError {
    fn user_message(&self) -> String {
        match self {
            CliError::App(e) => e.user_message().to_string(),
            CliError::Widget(e) => e.user_message(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    skyboard_core::init().map_err(AppError::from)?;

    match cli.command {
        Some(Command::Todo { action }) => {
            let store = open_store(&Config::load().map_err(config_error)?)?;
            run_todo(action, store)
        }
        Some(Command::Note { action }) => {
            let store = open_store(&Config::load().map_err(config_error)?)?;
            run_note(action, store)
        }
        command => run_weather(cli.lat, cli.lon, command.unwrap_or(Command::Show)).await,
    }
}

async fn run_weather(lat: Option<f64>, lon: Option<f64>, command: Command) -> Result<(), CliError> {
    let (config, _) = Config::load_validated().map_err(config_error)?;

    let locator: Arc<dyn DeviceLocator> = match (lat, lon) {
        (Some(lat), Some(lon)) => Arc::new(StaticLocator::new(Coordinates::new(lat, lon))),
        _ => locator_from_config(&config.weather),
    };

    let provider = WeatherProvider::new(
        ProviderSettings::from_config(&config.weather),
        Arc::new(WeatherCache::default()),
        locator,
    )
    .map_err(AppError::from)?;

    let mut session = WeatherSession::new(
        provider,
        open_store(&config)?,
        config.weather.temperature_unit,
        config.weather.default_country.clone(),
    );

    tracing::info!("Skyboard started");

    match command {
        Command::Refresh => session.refresh(),
        Command::Search { zip } => {
            if !session.search_location(&zip) {
                return Err(WidgetError::validation("Enter a ZIP code to search").into());
            }
        }
        Command::Unit => {
            let unit = session.toggle_unit();
            println!("Temperature unit set to {}", unit.symbol());
            session.initialize();
        }
        _ => session.initialize(),
    }

    match session.settle().await {
        SessionState::Ready { weather, unit } => {
            render(weather, *unit);
            Ok(())
        }
        SessionState::Errored(e) => Err(AppError::Weather(e.clone()).into()),
        SessionState::Idle | SessionState::Loading => Ok(()),
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn PreferenceStore>, AppError> {
    let store: Arc<dyn PreferenceStore> = Arc::new(FileStore::in_dir(&config.config_dir)?);
    Ok(store)
}

/// Config loading reports through anyhow; recover the typed error when there is one.
fn config_error(e: anyhow::Error) -> AppError {
    match e.downcast::<ConfigError>() {
        Ok(config) => AppError::Config(config),
        Err(other) => AppError::Other(other),
    }
}

fn due_at(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|t| Utc.from_utc_datetime(&t))
}

fn run_todo(action: TodoCommand, store: Arc<dyn PreferenceStore>) -> Result<(), CliError> {
    let mut todos = TodoList::load(store);

    match action {
        TodoCommand::List {
            filter,
            sort,
            direction,
        } => {
            let view = todos.view(filter, sort, direction);
            if view.is_empty() {
                println!("Nothing to do");
            }
            for todo in &view {
                print_todo(todo);
            }
        }
        TodoCommand::Add {
            title,
            priority,
            due,
        } => {
            let todo = todos.add(&title, priority, due.and_then(due_at))?;
            print_todo(&todo);
        }
        TodoCommand::Toggle { id } => {
            let done = todos.toggle(&id)?;
            println!("{}", if done { "Done" } else { "Open again" });
        }
        TodoCommand::Edit {
            id,
            title,
            priority,
            due,
            clear_due,
        } => {
            let current = todos.get(&id)?.clone();
            let due_date = match (due, clear_due) {
                (Some(date), _) => due_at(date),
                (None, true) => None,
                (None, false) => current.due_date,
            };
            let edit = TodoEdit {
                title: title.unwrap_or(current.title),
                priority: priority.unwrap_or(current.priority),
                due_date,
            };
            let todo = todos.edit(&current.id, edit)?;
            print_todo(&todo);
        }
        TodoCommand::Remove { id } => {
            let todo = todos.delete(&id)?;
            println!("Deleted \"{}\"", todo.title);
        }
        TodoCommand::CompleteAll => {
            println!("{} marked done", todos.mark_all_completed()?);
        }
        TodoCommand::ClearCompleted => {
            println!("{} deleted", todos.delete_completed()?);
        }
    }

    Ok(())
}

fn print_todo(todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    let short_id: String = todo.id.chars().take(8).collect();
    match todo.due_date {
        Some(due) => println!(
            "[{}] {}  {:<6}  {}  (due {})",
            mark,
            short_id,
            todo.priority,
            todo.title,
            due.format("%b %e, %Y")
        ),
        None => println!("[{}] {}  {:<6}  {}", mark, short_id, todo.priority, todo.title),
    }
}

fn run_note(action: NoteCommand, store: Arc<dyn PreferenceStore>) -> Result<(), CliError> {
    let mut notes = NoteBook::load(store);

    match action {
        NoteCommand::List => {
            if notes.list().is_empty() {
                println!("No notes yet");
            }
            for note in notes.list() {
                let short_id: String = note.id.chars().take(8).collect();
                println!(
                    "{}  {}  {}",
                    short_id,
                    note.created_at.format("%Y-%m-%d"),
                    note.title
                );
            }
        }
        NoteCommand::Show { id } => {
            let note = notes.get(&id)?;
            println!("{}\n{}\n\n{}", note.title, note.created_at.format("%b %e, %Y"), note.content);
        }
        NoteCommand::Add { title, content } => {
            let note = notes.create(&title, &content)?;
            println!("Created note {}", note.id);
        }
        NoteCommand::Edit { id, title, content } => {
            let current = notes.get(&id)?.clone();
            notes.update(
                &current.id,
                title.as_deref().unwrap_or(&current.title),
                content.as_deref().unwrap_or(&current.content),
            )?;
            println!("Updated \"{}\"", title.unwrap_or(current.title));
        }
        NoteCommand::Remove { id } => {
            let note = notes.delete(&id)?;
            println!("Deleted \"{}\"", note.title);
        }
    }

    Ok(())
}

fn render(weather: &WeatherBundle, unit: TemperatureUnit) {
    let current = &weather.current;

    if current.country.is_empty() {
        println!("{}", current.place_name);
    } else {
        println!("{}, {}", current.place_name, current.country);
    }
    println!(
        "{}  {}  (feels like {})",
        units::format(current.temperature, unit),
        current.description(),
        units::format(current.feels_like, unit)
    );
    println!(
        "H: {}  L: {}",
        units::format(current.temp_max, unit),
        units::format(current.temp_min, unit)
    );
    println!(
        "Humidity {}%  Pressure {} hPa  Wind {} km/h {}",
        current.humidity,
        current.pressure,
        wind_speed_kmh(current.wind_speed),
        wind_direction(current.wind_deg)
    );

    if let Some(chart) = weather.forecast.as_ref().and_then(|f| hourly_chart(f, unit)) {
        println!("\nNext 24 hours ({}..{}{})", chart.axis_min, chart.axis_max, unit.symbol());
        for point in &chart.points {
            println!("  {}  {}°", point.time.format("%l:%M %p"), point.temperature);
        }
    }

    if let Some(daily) = &weather.daily {
        println!("\nDaily");
        for day in daily_summary(daily, unit) {
            println!(
                "  {}  {:>5} / {:<5}  {}",
                day.date.format("%a %b %e"),
                day.high,
                day.low,
                day.description
            );
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use anyhow::Context;
    use skyboard_weather::WeatherError;

    #[test]
    fn test_invalid_config_keeps_its_type() {
        let err: anyhow::Error = ConfigError::Invalid("weather.geo_url: bad".into()).into();
        let app = config_error(err);
        assert!(matches!(app, AppError::Config(ConfigError::Invalid(_))));
        assert_eq!(app.user_message(), "Invalid configuration. Check your settings.");
    }

    #[test]
    fn test_parse_error_under_context_keeps_its_type() {
        let err = Err::<(), _>(ConfigError::ParseError("expected `=`".into()))
            .context("Failed to parse config file")
            .unwrap_err();
        assert!(matches!(
            config_error(err),
            AppError::Config(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_other_config_failures_are_unexpected() {
        let err = anyhow::anyhow!("Failed to read config file");
        let app = config_error(err);
        assert!(matches!(app, AppError::Other(_)));
        assert_eq!(
            CliError::from(app).user_message(),
            "An unexpected error occurred. Please try again."
        );
    }

    #[test]
    fn test_weather_failure_shows_friendly_message() {
        let err = CliError::from(AppError::Weather(WeatherError::LocationNotFound(
            "Location not found".into(),
        )));
        assert_eq!(err.user_message(), "Location not found. Check and try again.");
    }

    #[test]
    fn test_due_date_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        assert_eq!(due_at(date).unwrap().to_rfc3339(), "2026-10-21T00:00:00+00:00");
    }

    #[test]
    fn test_cli_parses_todo_add() {
        let cli = Cli::try_parse_from([
            "skyboard", "todo", "add", "Buy milk", "--priority", "high", "--due", "2026-10-21",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Todo {
                action: TodoCommand::Add { title, priority, due },
            }) => {
                assert_eq!(title, "Buy milk");
                assert_eq!(priority, Priority::High);
                assert_eq!(due, NaiveDate::from_ymd_opt(2026, 10, 21));
            }
            _ => unreachable!("expected todo add"),
        }
    }
}
