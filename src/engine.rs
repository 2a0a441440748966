use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::mode::TrainingMode;
use crate::session::Session;
use crate::util::mean;

/// Punches closer together than this extend the current combo.
pub const COMBO_WINDOW_SECS: f64 = 2.0;

/// Stamina drains toward this floor as playback approaches the end.
pub const STAMINA_FLOOR: f64 = 20.0;

/// Ordinal intensity readout derived from the current combo length.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Intensity {
    Low,
    Medium,
    High,
    Extreme,
}

impl Intensity {
    pub fn from_combo(combo: u32) -> Self {
        match combo {
            c if c >= 8 => Intensity::Extreme,
            c if c >= 5 => Intensity::High,
            c if c >= 3 => Intensity::Medium,
            _ => Intensity::Low,
        }
    }
}

/// Discrete notification emitted once per sample that crossed at least one
/// timeline stamp. Carries what the feedback collaborators need for the
/// transient pulse and tone.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PunchEvent {
    pub power: u32,
    pub punch_count: u32,
    pub combo: u32,
}

/// Mutable aggregate owned exclusively by the engine. Reset to the zero
/// state on video load, mode change, restart, or explicit reset.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningStats {
    pub punch_count: u32,
    pub current_power: u32,
    pub peak_power: u32,
    pub avg_power: u32,
    pub combo_count: u32,
    pub max_combo: u32,
    pub accuracy: u32,
    pub stamina: f64,
    pub intensity: Intensity,
    pub reaction_time: f64,
    pub live_speed: u32,
    pub last_punch_time: f64,
    pub power_scores: Vec<u32>,
    pub reaction_times: Vec<f64>,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            punch_count: 0,
            current_power: 0,
            peak_power: 0,
            avg_power: 0,
            combo_count: 0,
            max_combo: 0,
            accuracy: 0,
            stamina: 100.0,
            intensity: Intensity::Low,
            reaction_time: 0.0,
            live_speed: 0,
            last_punch_time: 0.0,
            power_scores: Vec::new(),
            reaction_times: Vec::new(),
        }
    }
}

/// Read-only bundle handed to the presentation collaborator once per tick,
/// and embedded in share payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub punch_count: u32,
    pub total_punches: u32,
    pub current_power: u32,
    pub peak_power: u32,
    pub avg_power: u32,
    pub combo_count: u32,
    pub max_combo: u32,
    pub accuracy: u32,
    pub defense_rating: u32,
    pub reaction_time: f64,
    pub stamina: f64,
    pub intensity: Intensity,
    pub live_speed: u32,
}

/// The stat engine: replays a session's punch timeline against the playback
/// cursor and derives every displayed metric from it. All randomness comes
/// in through the explicit `rng` parameter so tests can fix the sequence.
#[derive(Debug)]
pub struct StatEngine {
    session: Session,
    stats: RunningStats,
}

impl StatEngine {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            stats: RunningStats::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    /// Zero the running stats, keeping the session and timeline. This is the
    /// restart/video-load path; a mode change goes through [`regenerate`].
    ///
    /// [`regenerate`]: StatEngine::regenerate
    pub fn reset(&mut self) {
        self.stats = RunningStats::default();
    }

    /// Replace the session outright (mode change or new video): fresh id,
    /// fresh draws, fresh timeline, zeroed stats.
    pub fn regenerate<R: Rng>(&mut self, rng: &mut R, mode: TrainingMode, duration: Option<f64>) {
        self.session = Session::new(rng, mode, duration);
        self.reset();
    }

    /// Process one playback-position sample. Callers only invoke this while
    /// the player reports "playing"; a paused cursor produces no samples.
    ///
    /// Returns a [`PunchEvent`] when the cursor crossed at least one new
    /// timeline stamp since the previous sample. A jump across several
    /// stamps still yields a single event: the punch count catches up to the
    /// crossed total while the combo advances by one.
    pub fn sample<R: Rng>(&mut self, position: f64, rng: &mut R) -> Option<PunchEvent> {
        let due = self.session.timeline.events_at(position) as u32;

        let event = if due > self.stats.punch_count {
            Some(self.on_punch(due, position, rng))
        } else {
            None
        };

        self.on_tick(position, rng);
        event
    }

    fn on_punch<R: Rng>(&mut self, due: u32, position: f64, rng: &mut R) -> PunchEvent {
        self.stats.punch_count = due;

        let gap = position - self.stats.last_punch_time;
        if gap < COMBO_WINDOW_SECS {
            self.stats.combo_count += 1;
            if self.stats.combo_count > self.stats.max_combo {
                self.stats.max_combo = self.stats.combo_count;
            }
        } else {
            self.stats.combo_count = 1;
        }

        self.stats.reaction_times.push(gap);
        self.stats.last_punch_time = position;

        let (lo, hi) = self.session.mode.profile().base_power;
        let base_power = rng.gen_range(lo..hi);
        let combo_multiplier = 1.0 + f64::from(self.stats.combo_count.min(10)) * 0.05;
        let power = (base_power * combo_multiplier).min(100.0).floor() as u32;

        self.stats.current_power = power;
        self.stats.power_scores.push(power);
        if power > self.stats.peak_power {
            self.stats.peak_power = power;
        }

        let scores: Vec<f64> = self.stats.power_scores.iter().map(|&p| f64::from(p)).collect();
        if let Some(avg) = mean(&scores) {
            self.stats.avg_power = avg.floor() as u32;
        }

        PunchEvent {
            power,
            punch_count: self.stats.punch_count,
            combo: self.stats.combo_count,
        }
    }

    fn on_tick<R: Rng>(&mut self, position: f64, rng: &mut R) {
        let profile = self.session.mode.profile();

        // Cosmetic live speed: base plus a slow oscillation plus jitter.
        let wave = (position * 2.0).sin() * 15.0;
        let noise = rng.gen_range(-3.0..3.0);
        self.stats.live_speed = (f64::from(profile.base_speed) + wave + noise).max(0.0) as u32;

        if self.session.total_punches > 0 {
            let ratio = f64::from(self.stats.punch_count) / f64::from(self.session.total_punches);
            self.stats.accuracy = ((ratio * 100.0).floor() as u32).min(100);
        }

        self.stats.stamina = (100.0 - (position / self.session.duration) * 100.0).max(STAMINA_FLOOR);
        self.stats.intensity = Intensity::from_combo(self.stats.combo_count);

        if let Some(avg) = mean(&self.stats.reaction_times) {
            self.stats.reaction_time = avg;
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            punch_count: self.stats.punch_count,
            total_punches: self.session.total_punches,
            current_power: self.stats.current_power,
            peak_power: self.stats.peak_power,
            avg_power: self.stats.avg_power,
            combo_count: self.stats.combo_count,
            max_combo: self.stats.max_combo,
            accuracy: self.stats.accuracy,
            defense_rating: self.session.defense_rating,
            reaction_time: self.stats.reaction_time,
            stamina: self.stats.stamina,
            intensity: self.stats.intensity,
            live_speed: self.stats.live_speed,
        }
    }
}
