use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::Rng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};

use fighthype::app::{App, View};
use fighthype::config::{Config, ConfigStore, FileConfigStore};
use fighthype::mode::TrainingMode;
use fighthype::runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner};
use fighthype::TICK_RATE_MS;

/// terminal boxing analytics simulator
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Replay fabricated strike, power, and combo analytics against a training video's timeline, with shareable session highlights and a community feed."
)]
pub struct Cli {
    /// training video to analyze (mp4, mov, webm or mkv; max 100 MB)
    #[clap(short = 'v', long)]
    video: Option<PathBuf>,

    /// simulated playback duration in seconds
    #[clap(short = 's', long)]
    secs: Option<f64>,

    /// training mode for the session
    #[clap(short = 'm', long, value_enum)]
    mode: Option<TrainingMode>,

    /// fighter name shown on shared community highlights
    #[clap(short = 'f', long)]
    fighter: Option<String>,

    /// start with punch sounds muted
    #[clap(long)]
    muted: bool,

    /// start with the live HUD hidden
    #[clap(long)]
    no_hud: bool,
}

impl Cli {
    /// Overlay explicit flags on top of the persisted configuration.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.training_mode = mode.config_name();
        }
        if let Some(secs) = self.secs {
            config.duration_secs = Some(secs);
        }
        if let Some(fighter) = &self.fighter {
            config.fighter = fighter.clone();
        }
        if self.muted {
            config.muted = true;
        }
        if self.no_hud {
            config.show_hud = false;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut rng = rand::thread_rng();
    let mut app = App::new(&mut rng, &config);
    let result = run(&mut terminal, &mut app, &cli, &mut rng);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    let _ = config_store.save(&app.to_config());

    result
}

fn run<B: Backend, R: Rng>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    cli: &Cli,
    rng: &mut R,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                app.on_tick(rng);
                if app.take_bell() {
                    ring_bell();
                }
                // Upload and community are static between keys; the other
                // views animate every tick.
                if matches!(app.view, View::Processing | View::Editor) {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            AppEvent::Key(key) => {
                if handle_key(app, cli, rng, key) {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

/// The punch "sound": a terminal bell, skipped while muted upstream.
fn ring_bell() {
    let mut out = io::stdout();
    let _ = out.write_all(b"\x07");
    let _ = out.flush();
}

fn mode_for_digit(c: char) -> Option<TrainingMode> {
    match c {
        '1' => Some(TrainingMode::Shadow),
        '2' => Some(TrainingMode::Bag),
        '3' => Some(TrainingMode::Pads),
        '4' => Some(TrainingMode::Spar),
        _ => None,
    }
}

/// Returns true when the app should quit.
fn handle_key<R: Rng>(app: &mut App, cli: &Cli, rng: &mut R, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    if key.code == KeyCode::Esc {
        return true;
    }

    match app.view {
        View::Upload => match key.code {
            KeyCode::Enter => app.upload(cli.video.as_deref()),
            KeyCode::Char('c') => app.switch_view(View::Community),
            KeyCode::Char(c) => {
                if let Some(mode) = mode_for_digit(c) {
                    app.set_mode(rng, mode);
                }
            }
            _ => {}
        },
        View::Processing => {}
        View::Editor => match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => app.toggle_play(),
            KeyCode::Char('r') => app.restart(),
            KeyCode::Char('m') => app.toggle_mute(),
            KeyCode::Char('h') => app.toggle_hud(),
            KeyCode::Char('s') => {
                app.share(rng);
            }
            KeyCode::Char('t') => {
                app.tweet(rng);
            }
            KeyCode::Char('g') => {
                app.share_to_community();
            }
            KeyCode::Char('c') => app.switch_view(View::Community),
            KeyCode::Char('u') => app.reset_app(rng),
            KeyCode::Char(c) => {
                if let Some(mode) = mode_for_digit(c) {
                    app.set_mode(rng, mode);
                }
            }
            _ => {}
        },
        View::Community => match key.code {
            KeyCode::Char('b') | KeyCode::Backspace => {
                let back = app.return_view;
                app.switch_view(back);
            }
            _ => {}
        },
    }

    false
}
