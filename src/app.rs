//! Main application orchestration and execution

use crate::{
    cli::{supports_color, Cli, Command, ThemeAction},
    config::{display_config_summary, load_config},
    directory::EndpointDirectory,
    error::{AppError, Result},
    executor::{BatchRunner, ExecutionConfig},
    logging::{LoggerFactory, ProbeLogger},
    models::{Config, ProbeOutcome, ProbeRecord},
    output::OutputFormatterFactory,
    prober::{IcmpProber, Prober},
    report::{ConsoleSurface, ReportingSurface},
    scheduler::{Scheduler, SchedulerConfig},
    theme::{ThemeMode, ThemeStore},
    types::Region,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

const AUTO_HELP: &str = "Commands: select <region>, start, stop, status, quit";

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
    config: Config,
    directory: Arc<EndpointDirectory>,
    prober: Arc<dyn Prober>,
    writer: Option<Box<dyn Write + Send>>,
    loggers: LoggerFactory,
}

impl App {
    /// Create a new application instance; loads `.env`, environment and CLI settings
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate().map_err(AppError::validation)?;
        let config = load_config(cli.clone())?;
        Ok(Self::with_config(cli, config))
    }

    /// Create an application with an already built configuration
    pub fn with_config(cli: Cli, config: Config) -> Self {
        let loggers = LoggerFactory::new(config.clone());
        Self {
            cli,
            config,
            directory: Arc::new(EndpointDirectory::builtin()),
            prober: Arc::new(IcmpProber::new()),
            writer: None,
            loggers,
        }
    }

    /// Replace the ICMP prober
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    /// Send results somewhere other than stdout
    pub fn with_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the selected command
    pub async fn run(mut self) -> Result<()> {
        if self.config.debug {
            eprintln!("{} v{} ({})", crate::PKG_NAME, crate::VERSION, crate::GIT_COMMIT);
            eprintln!("Configuration Summary:");
            for line in display_config_summary(&self.config).lines() {
                eprintln!("  {}", line);
            }
        }

        if let Err(e) = self.directory.validate() {
            let logger = self.loggers.create_error_logger().await;
            logger.log_error(&e, Some("endpoint directory")).await;
        }

        let logger = self.loggers.create_logger("APP").await;
        crate::log_debug!(logger, "Running {:?}", self.cli.command);

        match self.cli.command.clone() {
            Command::Theme { action } => self.run_theme(action).await,
            Command::List => {
                let (surface, _) = self.build_surface().await;
                self.run_list(&surface)
            }
            Command::Probe { regions } => {
                let (surface, _) = self.build_surface().await;
                self.run_probe(&surface, &regions).await
            }
            Command::All { .. } => {
                let (surface, _) = self.build_surface().await;
                self.run_all(&surface).await
            }
            Command::Auto { count, .. } => {
                let (surface, _) = self.build_surface().await;
                self.run_auto(Arc::new(surface), count).await
            }
        }
    }

    fn use_colors(&self) -> bool {
        self.config.enable_color && (self.cli.color || supports_color())
    }

    /// Load the theme, falling back to light, and build the console surface
    async fn build_surface(&mut self) -> (ConsoleSurface, ThemeMode) {
        let store = ThemeStore::new(&self.config.theme_file);
        let (theme, theme_error) = match store.load() {
            Ok(theme) => (theme, None),
            Err(e) => (ThemeMode::Light, Some(e)),
        };

        let formatter = OutputFormatterFactory::create_formatter(self.use_colors(), theme, self.config.verbose);
        let surface = match self.writer.take() {
            Some(writer) => ConsoleSurface::with_writer(formatter, writer),
            None => ConsoleSurface::new(formatter),
        };

        if let Some(e) = theme_error {
            surface.notice(&format!("Could not read theme preference ({}); using light", e));
            let logger = self.loggers.create_error_logger().await;
            logger.log_fallback(&e, "light theme").await;
        }

        (surface, theme)
    }

    fn run_list(&self, surface: &ConsoleSurface) -> Result<()> {
        let formatter = surface.formatter();
        surface.print(&formatter.format_header("Regions")?);
        surface.print(&formatter.format_region_table(&self.directory)?);
        Ok(())
    }

    async fn run_probe(&self, surface: &ConsoleSurface, names: &[String]) -> Result<()> {
        let regions: Vec<Region> = names
            .iter()
            .map(|name| self.directory.resolve_name(name).unwrap_or_else(|| Region::from(name.trim())))
            .collect();

        let runner = self.batch_runner(ExecutionConfig::from(&self.config)).await;
        let summary = runner
            .probe_all(&regions, |region, outcome| surface.outcome(region, outcome))
            .await;

        if summary.any_success() {
            Ok(())
        } else {
            Err(AppError::network(format!("None of the {} probed regions responded", summary.total)))
        }
    }

    async fn run_all(&self, surface: &ConsoleSurface) -> Result<()> {
        let execution = ExecutionConfig::from(&self.config);
        let formatter = surface.formatter();
        surface.print(&formatter.format_header("Probing all regions")?);
        if self.config.verbose {
            surface.notice(&format!(
                "{} regions, {}, timeout {}ms",
                self.directory.len(),
                execution.mode.describe(),
                self.config.timeout_ms
            ));
        }

        let runner = self.batch_runner(execution).await;
        let summary = runner
            .probe_directory(|region, outcome| surface.outcome(region, outcome))
            .await;

        surface.print("");
        surface.print(&formatter.format_batch_summary(&summary)?);

        if summary.any_success() {
            Ok(())
        } else {
            Err(AppError::network("No region responded"))
        }
    }

    async fn run_auto(&self, console: Arc<ConsoleSurface>, count: Option<usize>) -> Result<()> {
        let initial = self.config.initial_region(&self.directory)?;
        let (observed, mut appended) = ObservedSurface::new(console.clone());

        let scheduler = Scheduler::new(
            self.directory.clone(),
            self.prober.clone(),
            Arc::new(observed),
            SchedulerConfig::from(&self.config),
            initial.clone(),
        )?
        .with_logger(self.probe_logger().await);

        console.notice(&format!(
            "Auto-ping {} every {}ms. {}",
            initial, self.config.interval_ms, AUTO_HELP
        ));
        scheduler.set_enabled(true).await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = appended.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let total = *appended.borrow_and_update();
                    if count.is_some_and(|limit| total >= limit) {
                        break;
                    }
                }
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => {
                        if self.handle_auto_command(&scheduler, &console, line.trim()).await? {
                            break;
                        }
                    }
                    // Without stdin only Ctrl-C or --count end the run
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        console.notice(&format!("Stopped reading commands: {}", e));
                        stdin_open = false;
                    }
                },
            }
        }

        scheduler.set_enabled(false).await;
        scheduler.wait_idle().await?;

        let state = scheduler.state().await;
        let records = scheduler.log().len().await;
        console.print(&console.formatter().format_auto_ping_status(false, &state.selected_region, records)?);
        Ok(())
    }

    /// Returns `true` when the user asked to quit
    async fn handle_auto_command(&self, scheduler: &Scheduler, console: &ConsoleSurface, line: &str) -> Result<bool> {
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "" => {}
            "quit" | "exit" | "q" => return Ok(true),
            "start" => scheduler.set_enabled(true).await,
            "stop" => scheduler.set_enabled(false).await,
            "status" => {
                let state = scheduler.state().await;
                let records = scheduler.log().len().await;
                console.print(&console.formatter().format_auto_ping_status(
                    state.enabled,
                    &state.selected_region,
                    records,
                )?);
            }
            "select" => match self.directory.resolve_name(argument) {
                Some(region) => {
                    console.notice(&format!("Selected {}", region));
                    scheduler.select_region(region).await;
                }
                None => console.notice(&format!("Unknown region '{}'. Run `rpt list` to see them.", argument)),
            },
            "help" | "?" => console.notice(AUTO_HELP),
            other => console.notice(&format!("Unknown command '{}'. {}", other, AUTO_HELP)),
        }

        Ok(false)
    }

    async fn run_theme(&mut self, action: ThemeAction) -> Result<()> {
        let store = ThemeStore::new(&self.config.theme_file);

        let message = match action {
            ThemeAction::Show => {
                // An unreadable file is reported as a notice and shows as light
                let (surface, theme) = self.build_surface().await;
                surface.print(&surface.formatter().format_success(&format!("Theme: {}", theme))?);
                return Ok(());
            }
            ThemeAction::Toggle => format!("Theme set to {}", store.toggle()?),
            ThemeAction::Dark => {
                store.save(ThemeMode::Dark)?;
                format!("Theme set to {}", ThemeMode::Dark)
            }
            ThemeAction::Light => {
                store.save(ThemeMode::Light)?;
                format!("Theme set to {}", ThemeMode::Light)
            }
        };

        let (surface, _) = self.build_surface().await;
        surface.print(&surface.formatter().format_success(&message)?);
        Ok(())
    }

    async fn batch_runner(&self, execution: ExecutionConfig) -> BatchRunner {
        let runner = BatchRunner::new(self.directory.clone(), self.prober.clone(), execution);
        if self.config.verbose || self.config.debug {
            runner.with_logger(self.probe_logger().await)
        } else {
            runner
        }
    }

    async fn probe_logger(&self) -> ProbeLogger {
        self.loggers.create_probe_logger().await
    }
}

/// Forwards to the console and counts appended records
struct ObservedSurface {
    inner: Arc<ConsoleSurface>,
    appended: watch::Sender<usize>,
}

impl ObservedSurface {
    fn new(inner: Arc<ConsoleSurface>) -> (Self, watch::Receiver<usize>) {
        let (appended, receiver) = watch::channel(0);
        (Self { inner, appended }, receiver)
    }
}

impl ReportingSurface for ObservedSurface {
    fn outcome(&self, region: &Region, outcome: &ProbeOutcome) {
        self.inner.outcome(region, outcome);
    }

    fn record_appended(&self, record: &ProbeRecord) {
        self.inner.record_appended(record);
        self.appended.send_modify(|count| *count += 1);
    }

    fn notice(&self, message: &str) {
        self.inner.notice(message);
    }
}
