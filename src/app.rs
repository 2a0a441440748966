use chrono::Local;
use rand::Rng;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::app_dirs::AppDirs;
use crate::config::Config;
use crate::engine::{PunchEvent, StatEngine};
use crate::fx::ImpactFx;
use crate::media::{MediaSource, SimulatedPlayer, VideoFile};
use crate::mode::TrainingMode;
use crate::processing::ProcessingPhase;
use crate::session::Session;
use crate::share::{self, mint_share_id, SharePayload};
use crate::store::{Highlight, HighlightDb};
use crate::TICK_RATE_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Upload,
    Processing,
    Editor,
    Community,
}

/// The controller owning the session, player, and stores. All view changes
/// go through [`App::switch_view`], which performs the required side
/// effects synchronously (leaving the editor pauses playback and thereby
/// stops sampling).
pub struct App {
    pub view: View,
    /// Where the community view's back key returns to.
    pub return_view: View,
    pub mode: TrainingMode,
    pub fighter: String,
    pub muted: bool,
    pub show_hud: bool,
    requested_secs: Option<f64>,
    pub player: SimulatedPlayer,
    pub engine: StatEngine,
    pub processing: ProcessingPhase,
    pub fx: ImpactFx,
    db: Option<HighlightDb>,
    pub highlights: Vec<Highlight>,
    pub last_share: Option<SharePayload>,
    pub error: Option<String>,
    bell_pending: bool,
}

impl App {
    pub fn new<R: Rng>(rng: &mut R, config: &Config) -> Self {
        let mode = TrainingMode::from_config_name(&config.training_mode)
            .unwrap_or(TrainingMode::Shadow);
        let requested_secs = config
            .duration_secs
            .filter(|d| d.is_finite() && *d > 0.0);

        let player = SimulatedPlayer::new(
            requested_secs.unwrap_or(crate::session::DEFAULT_DURATION_SECS),
        );
        let engine = StatEngine::new(Session::new(rng, mode, requested_secs));

        Self {
            view: View::Upload,
            return_view: View::Upload,
            mode,
            fighter: config.fighter.clone(),
            muted: config.muted,
            show_hud: config.show_hud,
            requested_secs,
            player,
            engine,
            processing: ProcessingPhase::new(),
            fx: ImpactFx::new(),
            db: HighlightDb::new().ok(),
            highlights: Vec::new(),
            last_share: None,
            error: None,
            bell_pending: false,
        }
    }

    /// Swap the highlight store (tests point this at a temp database).
    pub fn with_store(mut self, db: Option<HighlightDb>) -> Self {
        self.db = db;
        self
    }

    pub fn to_config(&self) -> Config {
        Config {
            training_mode: self.mode.config_name(),
            duration_secs: self.requested_secs,
            fighter: self.fighter.clone(),
            muted: self.muted,
            show_hud: self.show_hud,
        }
    }

    /// Validate the upload (if any) and enter the simulated analysis phase.
    /// A rejected file leaves the app on the upload view with an error.
    pub fn upload(&mut self, path: Option<&Path>) {
        self.error = None;

        let video = match path {
            Some(p) => match VideoFile::open(p) {
                Ok(v) => Some(v),
                Err(e) => {
                    self.error = Some(e.to_string());
                    return;
                }
            },
            None => None,
        };

        let duration = self
            .requested_secs
            .unwrap_or(crate::session::DEFAULT_DURATION_SECS);
        self.player.load(video, duration);
        self.processing = ProcessingPhase::new();
        self.switch_view(View::Processing);
    }

    /// One step of the shared tick loop; also the playback sampling point.
    pub fn on_tick<R: Rng>(&mut self, rng: &mut R) {
        match self.view {
            View::Processing => {
                if self.processing.advance() {
                    self.finish_analysis(rng);
                }
            }
            View::Editor => {
                self.fx.update(TICK_RATE_MS as f64 / 1000.0);

                let was_playing = self.player.is_playing();
                let ended = self.player.advance();

                if was_playing {
                    if let Some(event) = self.engine.sample(self.player.position(), rng) {
                        self.on_punch(rng, event);
                    }
                }
                if ended {
                    let _ = self.append_session_log();
                    self.engine.reset();
                }
            }
            View::Upload | View::Community => {}
        }
    }

    fn finish_analysis<R: Rng>(&mut self, rng: &mut R) {
        self.engine
            .regenerate(rng, self.mode, self.player.duration());
        self.switch_view(View::Editor);
        self.player.restart();
    }

    fn on_punch<R: Rng>(&mut self, rng: &mut R, event: PunchEvent) {
        self.fx.trigger(rng, event.power);
        if !self.muted {
            self.bell_pending = true;
        }
    }

    /// True at most once per punch; the main loop rings the terminal bell.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    pub fn switch_view(&mut self, view: View) {
        if self.view == View::Editor && view != View::Editor {
            self.player.pause();
        }
        if view == View::Community && self.view != View::Community {
            self.return_view = self.view;
            self.reload_highlights();
        }
        self.view = view;
    }

    /// Re-roll the whole session for `mode` (also used to re-roll the
    /// current mode, like tapping its button again).
    pub fn set_mode<R: Rng>(&mut self, rng: &mut R, mode: TrainingMode) {
        self.mode = mode;
        self.engine
            .regenerate(rng, mode, self.player.duration());
    }

    /// Seek to the start with zeroed stats and play again.
    pub fn restart(&mut self) {
        self.engine.reset();
        self.player.restart();
    }

    pub fn toggle_play(&mut self) {
        self.player.toggle();
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn toggle_hud(&mut self) {
        self.show_hud = !self.show_hud;
    }

    /// Mint and persist a share link for the current stats.
    pub fn share<R: Rng>(&mut self, rng: &mut R) -> Option<&SharePayload> {
        let now_ms = Local::now().timestamp_millis();
        let payload = SharePayload {
            id: mint_share_id(rng, now_ms),
            session_id: self.engine.session().id.clone(),
            mode: self.mode.config_name(),
            file_name: self.player.video().map(|v| v.file_name()),
            created_at_ms: now_ms,
            stats: self.engine.snapshot(),
        };

        if let Some(db) = &self.db {
            let _ = db.save_share_link(&payload);
        }
        self.last_share = Some(payload);
        self.last_share.as_ref()
    }

    /// Open the tweet composer for the most recent share link, minting one
    /// first if needed.
    pub fn tweet<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.last_share.is_none() {
            self.share(rng);
        }
        match &self.last_share {
            Some(payload) => share::open_tweet(payload),
            None => false,
        }
    }

    /// Post the current stats to the community feed.
    pub fn share_to_community(&mut self) -> bool {
        let snap = self.engine.snapshot();
        let highlight = Highlight {
            session_id: self.engine.session().id.clone(),
            fighter: self.fighter.clone(),
            power: snap.current_power,
            strikes: snap.punch_count,
            combo: snap.combo_count,
            mode: self.mode.config_name(),
            created_at: Local::now(),
        };

        let saved = match &self.db {
            Some(db) => db.save_highlight(&highlight).is_ok(),
            None => false,
        };
        if saved && self.view == View::Community {
            self.reload_highlights();
        }
        saved
    }

    fn reload_highlights(&mut self) {
        self.highlights = match &self.db {
            Some(db) => db.highlights().unwrap_or_default(),
            None => Vec::new(),
        };
    }

    /// Drop the video and session and return to the upload view.
    pub fn reset_app<R: Rng>(&mut self, rng: &mut R) {
        self.error = None;
        self.last_share = None;
        let duration = self
            .requested_secs
            .unwrap_or(crate::session::DEFAULT_DURATION_SECS);
        self.player.load(None, duration);
        self.engine.regenerate(rng, self.mode, self.requested_secs);
        self.fx = ImpactFx::new();
        self.switch_view(View::Upload);
    }

    /// Append a one-line summary of the finished run to log.csv under the
    /// config dir.
    pub fn append_session_log(&self) -> io::Result<()> {
        if let Some(config_dir) = AppDirs::config_dir() {
            let log_path = config_dir.join("log.csv");

            std::fs::create_dir_all(&config_dir)?;

            // If the log file doesn't exist, we need to emit a header
            let needs_header = !log_path.exists();

            let mut log_file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(log_path)?;

            if needs_header {
                writeln!(
                    log_file,
                    "date,session_id,mode,punches,peak_power,avg_power,max_combo,accuracy"
                )?;
            }

            let stats = self.engine.stats();
            writeln!(
                log_file,
                "{},{},{},{},{},{},{},{}",
                Local::now().format("%c"),
                self.engine.session().id,
                self.mode.config_name(),
                stats.punch_count,
                stats.peak_power,
                stats.avg_power,
                stats.max_combo,
                stats.accuracy,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(21)
    }

    fn headless_app(rng: &mut StdRng) -> App {
        App::new(rng, &Config::default()).with_store(None)
    }

    #[test]
    fn test_starts_on_upload_view() {
        let mut rng = rng();
        let app = headless_app(&mut rng);
        assert_eq!(app.view, View::Upload);
        assert_eq!(app.mode, TrainingMode::Shadow);
        assert!(!app.player.is_playing());
    }

    #[test]
    fn test_upload_without_file_enters_processing() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        app.upload(None);
        assert_eq!(app.view, View::Processing);
        assert_eq!(app.processing.progress(), 0);
    }

    #[test]
    fn test_upload_rejection_stays_on_upload_with_error() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        let dir = tempdir().unwrap();
        let bad = dir.path().join("notes.txt");
        std::fs::write(&bad, b"x").unwrap();

        app.upload(Some(&bad));
        assert_eq!(app.view, View::Upload);
        assert!(app.error.is_some());
    }

    #[test]
    fn test_processing_completes_into_editor_with_fresh_session() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        let stale_id = app.engine.session().id.clone();

        app.upload(None);
        for _ in 0..50 {
            app.on_tick(&mut rng);
        }

        assert_eq!(app.view, View::Editor);
        assert!(app.player.is_playing());
        assert_ne!(app.engine.session().id, stale_id);
        assert_eq!(app.engine.stats().punch_count, 0);
    }

    #[test]
    fn test_leaving_editor_pauses_playback() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        app.upload(None);
        for _ in 0..50 {
            app.on_tick(&mut rng);
        }
        assert!(app.player.is_playing());

        app.switch_view(View::Community);
        assert!(!app.player.is_playing());
    }

    #[test]
    fn test_set_mode_regenerates_session() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        let old_id = app.engine.session().id.clone();

        app.set_mode(&mut rng, TrainingMode::Spar);

        assert_eq!(app.mode, TrainingMode::Spar);
        assert_ne!(app.engine.session().id, old_id);
        let profile = TrainingMode::Spar.profile();
        assert!(app.engine.session().total_punches >= profile.punches.0);
        assert!(app.engine.session().total_punches < profile.punches.1);
    }

    #[test]
    fn test_restart_zeroes_stats_and_rewinds() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        app.upload(None);
        for _ in 0..50 {
            app.on_tick(&mut rng);
        }

        app.restart();
        assert_eq!(app.player.position(), 0.0);
        assert!(app.player.is_playing());
        assert_eq!(app.engine.stats().punch_count, 0);
    }

    #[test]
    fn test_punch_rings_bell_unless_muted() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        let event = PunchEvent {
            power: 80,
            punch_count: 1,
            combo: 1,
        };

        app.on_punch(&mut rng, event);
        assert!(app.take_bell());
        assert!(!app.take_bell());

        app.toggle_mute();
        app.on_punch(&mut rng, event);
        assert!(!app.take_bell());
        assert!(app.fx.is_active);
    }

    #[test]
    fn test_share_persists_and_round_trips() {
        let mut rng = rng();
        let dir = tempdir().unwrap();
        let db = HighlightDb::with_path(dir.path().join("hl.db")).unwrap();
        let mut app = App::new(&mut rng, &Config::default()).with_store(Some(db));

        let id = app.share(&mut rng).unwrap().id.clone();
        assert!(id.starts_with("SH"));

        let db = HighlightDb::with_path(dir.path().join("hl.db")).unwrap();
        let loaded = db.share_link(&id).unwrap().unwrap();
        assert_eq!(loaded.session_id, app.engine.session().id);
    }

    #[test]
    fn test_share_to_community_appears_on_feed() {
        let mut rng = rng();
        let dir = tempdir().unwrap();
        let db = HighlightDb::with_path(dir.path().join("hl.db")).unwrap();
        let mut app = App::new(&mut rng, &Config::default()).with_store(Some(db));
        app.fighter = "Southpaw".to_string();

        assert!(app.share_to_community());
        app.switch_view(View::Community);
        assert_eq!(app.highlights.len(), 1);
        assert_eq!(app.highlights[0].fighter, "Southpaw");
    }

    #[test]
    fn test_reset_app_returns_to_upload_with_fresh_state() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        app.upload(None);
        for _ in 0..50 {
            app.on_tick(&mut rng);
        }
        let old_id = app.engine.session().id.clone();

        app.reset_app(&mut rng);
        assert_eq!(app.view, View::Upload);
        assert!(!app.player.is_playing());
        assert_eq!(app.player.position(), 0.0);
        assert!(app.player.video().is_none());
        assert_ne!(app.engine.session().id, old_id);
        assert!(app.error.is_none());
    }

    #[test]
    fn test_to_config_reflects_toggles() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        app.toggle_mute();
        app.toggle_hud();
        app.set_mode(&mut rng, TrainingMode::Pads);

        let cfg = app.to_config();
        assert_eq!(cfg.training_mode, "pads");
        assert!(cfg.muted);
        assert!(!cfg.show_hud);
    }

    #[test]
    fn test_ticks_outside_editor_do_not_sample() {
        let mut rng = rng();
        let mut app = headless_app(&mut rng);
        for _ in 0..10 {
            app.on_tick(&mut rng);
        }
        assert_eq!(app.view, View::Upload);
        assert_eq!(app.engine.stats().punch_count, 0);
        assert_eq!(app.player.position(), 0.0);
    }
}
