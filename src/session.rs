use chrono::{DateTime, Local};
use rand::Rng;

use crate::mode::TrainingMode;
use crate::timeline::Timeline;

/// Substituted whenever the media collaborator cannot report a duration.
pub const DEFAULT_DURATION_SECS: f64 = 60.0;

const ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// One training run: the mode draws, the punch timeline, and an id for
/// display and sharing. Rebuilt wholesale on reset or mode change; nothing
/// carries over between sessions.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub mode: TrainingMode,
    pub total_punches: u32,
    pub defense_rating: u32,
    pub duration: f64,
    pub started_at: DateTime<Local>,
    pub timeline: Timeline,
}

impl Session {
    /// Draw a fresh session for `mode`. An unknown or invalid duration falls
    /// back to [`DEFAULT_DURATION_SECS`] before the timeline is generated.
    pub fn new<R: Rng>(rng: &mut R, mode: TrainingMode, duration: Option<f64>) -> Self {
        let duration = duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(DEFAULT_DURATION_SECS);

        let profile = mode.profile();
        let total_punches = rng.gen_range(profile.punches.0..profile.punches.1);
        let defense_rating = rng.gen_range(profile.defense.0..profile.defense.1);
        let timeline = Timeline::generate(rng, total_punches, duration);

        Self {
            id: generate_session_id(rng),
            mode,
            total_punches,
            defense_rating,
            duration,
            started_at: Local::now(),
            timeline,
        }
    }
}

/// "FH" plus six random uppercase alphanumerics, e.g. `FH3QK9A`.
pub fn generate_session_id<R: Rng>(rng: &mut R) -> String {
    let tail: String = (0..6)
        .map(|_| ID_CHARS[rng.gen_range(0..ID_CHARS.len())] as char)
        .collect();
    format!("FH{tail}")
}
