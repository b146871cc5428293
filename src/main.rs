use boxbreath::{
    app::{App, Control},
    app_dirs::AppDirs,
    clock::{Clock, MonotonicClock},
    cue::{CueObserver, TerminalBell},
    runtime::{BreathEvent, BreathEventSource, CrosstermEventSource, Runner},
    settings::{parse_phase_duration, PhaseDuration, MAX_LIMIT_MINUTES},
    timer::{PhaseTimer, TracingObserver},
};
use clap::{builder::FalseyValueParser, error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// guided box breathing in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guided box breathing in the terminal: inhale, hold, exhale and wait for equal counts while an animated dot traces the box."
)]
pub struct Cli {
    /// seconds spent in each phase (3-8)
    #[clap(short = 'd', long, default_value = "4", value_parser = parse_phase_duration)]
    phase_duration: PhaseDuration,

    /// minutes before the session finishes its current cycle and stops (0 for no limit)
    #[clap(
        short = 'l',
        long,
        value_parser = clap::value_parser!(u32).range(0..=MAX_LIMIT_MINUTES as i64)
    )]
    time_limit: Option<u32>,

    /// ring the terminal bell when a phase starts
    #[clap(long)]
    sound: bool,

    /// keep the dot moving but drop the motion trail
    #[clap(
        long,
        env = "BOXBREATH_REDUCED_MOTION",
        value_parser = FalseyValueParser::new()
    )]
    reduced_motion: bool,

    /// start breathing immediately instead of waiting on the ready screen
    #[clap(long)]
    start: bool,
}

impl Cli {
    /// Zero means no limit.
    fn time_limit_minutes(&self) -> Option<u32> {
        self.time_limit.filter(|minutes| *minutes > 0)
    }

    fn build_timer<K: Clock>(&self, clock: K) -> PhaseTimer<K> {
        let mut timer = PhaseTimer::new(self.phase_duration, clock);
        timer.set_time_limit(self.time_limit_minutes());
        timer.set_sound_enabled(self.sound);
        timer.set_reduced_motion(self.reduced_motion);
        timer
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_tracing();
    tracing::info!(?cli, "starting");

    let mut timer = cli.build_timer(MonotonicClock::new());
    timer.subscribe(Box::new(TracingObserver));
    timer.subscribe(Box::new(CueObserver::new(TerminalBell)));
    let mut app = App::new(timer);
    if cli.start {
        app.timer.start();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new());
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(%err, "terminal loop failed");
    }
    tracing::info!(
        elapsed_secs = app.session().elapsed_total_secs,
        "exiting"
    );

    result
}

fn start_tui<B: Backend, K: Clock, E: BreathEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App<K>,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let now = app.timer.clock().now();
        let mut redraw = match runner.step(app.timer.schedule_mut(), now) {
            BreathEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    break;
                }
                false
            }
            BreathEvent::Tick => {
                app.timer.tick();
                false
            }
            BreathEvent::Frame | BreathEvent::Resize => true,
            BreathEvent::Idle => false,
            BreathEvent::Closed => {
                tracing::warn!("input closed, leaving");
                break;
            }
        };
        redraw |= app.take_redraw();

        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}

/// Logs go to a file; writing to stdout or stderr would corrupt the screen.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = AppDirs::log_path().and_then(|path| match AppDirs::open_log_file(&path) {
        Ok(file) => Some((path, file)),
        Err(_) => None,
    });

    match log_file {
        Some((path, file)) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %path.display(), "logging initialized");
        }
        None => tracing_subscriber::registry().with(env_filter).init(),
    }
}
