use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use numsort::{
    app::App,
    category::CategoryGroup,
    clock::SystemTimeSource,
    config::{ConfigStore, FileConfigStore},
    error::ConfigError,
    round::RoundGenerator,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{GameSession, SessionConfig},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};
use tracing::Level;

/// sort numbers into every category that fits before the clock runs out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal number sorting game. Each round shows a number; pick every category it belongs to (parity, primes, multiples, comparisons, rounding and written forms) and reach the goal score before time is up."
)]
pub struct Cli {
    /// points needed to win
    #[clap(short = 'g', long)]
    goal: Option<u32>,

    /// game length in minutes
    #[clap(short = 'd', long)]
    duration: Option<u32>,

    /// hide category explanations
    #[clap(long)]
    no_hints: bool,

    /// category groups to play with
    #[clap(short = 'c', long, value_enum, value_delimiter = ',')]
    categories: Vec<CategoryGroup>,

    /// settings file to read instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// seed for reproducible rounds
    #[clap(long)]
    seed: Option<u64>,

    /// write logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// more log output (-v info, -vv debug, -vvv trace)
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Lay the command-line flags over settings loaded from disk.
    fn apply_to(&self, mut config: SessionConfig) -> Result<SessionConfig, ConfigError> {
        if let Some(goal) = self.goal {
            config.set_goal_points(goal)?;
        }
        if let Some(minutes) = self.duration {
            config.set_duration_minutes(minutes)?;
        }
        if self.no_hints {
            config.set_hover_enabled(false);
        }
        if !self.categories.is_empty() {
            config.set_enabled_groups(self.categories.iter().copied())?;
        }
        Ok(config)
    }

    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(cli.log_level())
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let loaded = cli.config_store().load()?;
    let config = match cli.apply_to(loaded) {
        Ok(config) => config,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err).exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let generator = match cli.seed {
        Some(seed) => RoundGenerator::with_seed(seed),
        None => RoundGenerator::new(),
    };
    let session = GameSession::with_parts(config, generator, SystemTimeSource);
    let mut app = App::new(session);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    while !app.should_quit {
        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Key(key) => app.handle_key(key),
            AppEvent::Resize => {}
        }
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["numsort"]);

        assert_eq!(cli.goal, None);
        assert_eq!(cli.duration, None);
        assert!(!cli.no_hints);
        assert!(cli.categories.is_empty());
        assert_eq!(cli.seed, None);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.log_level(), Level::WARN);
    }

    #[test]
    fn test_cli_goal_and_duration() {
        let cli = Cli::parse_from(["numsort", "-g", "20", "-d", "2"]);
        assert_eq!(cli.goal, Some(20));
        assert_eq!(cli.duration, Some(2));

        let cli = Cli::parse_from(["numsort", "--goal", "75", "--duration", "10"]);
        assert_eq!(cli.goal, Some(75));
        assert_eq!(cli.duration, Some(10));
    }

    #[test]
    fn test_cli_categories() {
        let cli = Cli::parse_from(["numsort", "-c", "multiples,rounding"]);
        assert_eq!(
            cli.categories,
            vec![CategoryGroup::Multiples, CategoryGroup::Rounding]
        );

        assert!(Cli::try_parse_from(["numsort", "-c", "fractions"]).is_err());
    }

    #[test]
    fn test_cli_verbosity() {
        let cli = Cli::parse_from(["numsort", "-vv"]);
        assert_eq!(cli.log_level(), Level::DEBUG);

        let cli = Cli::parse_from(["numsort", "-vvvv"]);
        assert_eq!(cli.log_level(), Level::TRACE);
    }

    #[test]
    fn test_cli_overrides_loaded_settings() {
        let cli = Cli::parse_from(["numsort", "-g", "12", "--no-hints", "-c", "written-form"]);
        let config = cli.apply_to(SessionConfig::default()).unwrap();

        assert_eq!(config.goal_points, 12);
        assert_eq!(config.duration_minutes, 5);
        assert!(!config.hover_enabled);
        assert_eq!(config.enabled_groups.len(), 1);
        assert!(config.enabled_groups.contains(&CategoryGroup::WrittenForm));
    }

    #[test]
    fn test_cli_rejects_zero_goal() {
        let cli = Cli::parse_from(["numsort", "-g", "0"]);
        assert_eq!(
            cli.apply_to(SessionConfig::default()),
            Err(ConfigError::NonPositiveGoal)
        );
    }

    #[test]
    fn test_cli_config_path() {
        let cli = Cli::parse_from(["numsort", "--config", "/tmp/numsort.json"]);
        assert_eq!(
            cli.config_store().path(),
            std::path::Path::new("/tmp/numsort.json")
        );
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
