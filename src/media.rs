use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Upload size cap.
pub const MAX_VIDEO_BYTES: u64 = 100 * 1024 * 1024;

const VALID_EXTENSIONS: [&str; 4] = ["mp4", "mov", "webm", "mkv"];

#[derive(Debug)]
pub enum VideoError {
    UnsupportedFormat(String),
    TooLarge(u64),
    Io(io::Error),
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoError::UnsupportedFormat(ext) => {
                write!(f, "unsupported format '{ext}': use MP4, MOV, WEBM or MKV")
            }
            VideoError::TooLarge(bytes) => {
                write!(f, "file too large ({} MB): max 100 MB", bytes / (1024 * 1024))
            }
            VideoError::Io(err) => write!(f, "cannot read video: {err}"),
        }
    }
}

impl std::error::Error for VideoError {}

impl From<io::Error> for VideoError {
    fn from(err: io::Error) -> Self {
        VideoError::Io(err)
    }
}

/// A validated upload. No decoding happens anywhere; the file only lends
/// the session its name and a pretext for the analysis phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl VideoFile {
    /// Validate extension and size the way the upload screen did.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        let path = path.as_ref();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !VALID_EXTENSIONS.contains(&ext.as_str()) {
            return Err(VideoError::UnsupportedFormat(ext));
        }

        let size_bytes = fs::metadata(path)?.len();
        if size_bytes > MAX_VIDEO_BYTES {
            return Err(VideoError::TooLarge(size_bytes));
        }

        Ok(Self {
            path: path.to_path_buf(),
            size_bytes,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "boxing-training.mp4".to_string())
    }
}

/// What the core is allowed to read from the playback side: position,
/// duration, play state. Never mutated through this trait.
pub trait MediaSource {
    fn position(&self) -> f64;
    fn duration(&self) -> Option<f64>;
    fn is_playing(&self) -> bool;
}

/// Stand-in for a real media element: a playhead that advances with wall
/// time while playing. Owns the loaded video; loading a new one releases
/// the previous (ownership replaces URL revocation).
#[derive(Debug)]
pub struct SimulatedPlayer {
    video: Option<VideoFile>,
    duration: f64,
    position: f64,
    playing: bool,
    ended: bool,
    last_advance: Option<Instant>,
}

impl SimulatedPlayer {
    pub fn new(duration: f64) -> Self {
        Self {
            video: None,
            duration,
            position: 0.0,
            playing: false,
            ended: false,
            last_advance: None,
        }
    }

    /// Swap in a new source and rewind. The previous video (if any) is
    /// dropped here.
    pub fn load(&mut self, video: Option<VideoFile>, duration: f64) {
        self.video = video;
        self.duration = duration;
        self.position = 0.0;
        self.playing = false;
        self.ended = false;
        self.last_advance = None;
    }

    pub fn video(&self) -> Option<&VideoFile> {
        self.video.as_ref()
    }

    pub fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.ended = false;
            self.last_advance = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        self.advance();
        self.playing = false;
        self.last_advance = None;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seek to the start and resume playing.
    pub fn restart(&mut self) {
        self.position = 0.0;
        self.ended = false;
        self.playing = false;
        self.play();
    }

    pub fn seek(&mut self, position: f64) {
        self.position = position.clamp(0.0, self.duration);
        self.ended = false;
        if self.playing {
            self.last_advance = Some(Instant::now());
        }
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Move the playhead forward by elapsed wall time. Returns true exactly
    /// once, on the tick where playback crosses the duration.
    pub fn advance(&mut self) -> bool {
        if !self.playing {
            return false;
        }

        let now = Instant::now();
        if let Some(last) = self.last_advance {
            self.position += now.duration_since(last).as_secs_f64();
        }
        self.last_advance = Some(now);

        if self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
            self.ended = true;
            self.last_advance = None;
            return true;
        }
        false
    }
}

impl MediaSource for SimulatedPlayer {
    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        (self.duration.is_finite() && self.duration > 0.0).then_some(self.duration)
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, bytes: usize) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(&vec![0u8; bytes]).unwrap();
        path
    }

    #[test]
    fn test_open_accepts_small_mp4() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "jab.mp4", 1024);
        let video = VideoFile::open(&path).unwrap();
        assert_eq!(video.size_bytes, 1024);
        assert_eq!(video.file_name(), "jab.mp4");
    }

    #[test]
    fn test_open_accepts_uppercase_extension() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "round1.MOV", 10);
        assert!(VideoFile::open(&path).is_ok());
    }

    #[test]
    fn test_open_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "notes.txt", 10);
        assert_matches!(VideoFile::open(&path), Err(VideoError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_open_rejects_missing_extension() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "clip", 10);
        assert_matches!(VideoFile::open(&path), Err(VideoError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        assert_matches!(
            VideoFile::open("/definitely/not/here.mp4"),
            Err(VideoError::Io(_))
        );
    }

    #[test]
    fn test_player_starts_paused_at_zero() {
        let player = SimulatedPlayer::new(60.0);
        assert!(!player.is_playing());
        assert_eq!(player.position(), 0.0);
        assert_eq!(player.duration(), Some(60.0));
    }

    #[test]
    fn test_player_duration_unknown_when_invalid() {
        let player = SimulatedPlayer::new(0.0);
        assert_eq!(player.duration(), None);
    }

    #[test]
    fn test_paused_player_does_not_advance() {
        let mut player = SimulatedPlayer::new(60.0);
        assert!(!player.advance());
        assert_eq!(player.position(), 0.0);
    }

    #[test]
    fn test_play_advance_pause() {
        let mut player = SimulatedPlayer::new(60.0);
        player.play();
        assert!(player.is_playing());
        std::thread::sleep(std::time::Duration::from_millis(20));
        player.advance();
        assert!(player.position() > 0.0);

        player.pause();
        let frozen = player.position();
        std::thread::sleep(std::time::Duration::from_millis(20));
        player.advance();
        assert_eq!(player.position(), frozen);
    }

    #[test]
    fn test_restart_rewinds_and_plays() {
        let mut player = SimulatedPlayer::new(60.0);
        player.play();
        player.seek(30.0);
        player.restart();
        assert!(player.is_playing());
        assert_eq!(player.position(), 0.0);
    }

    #[test]
    fn test_ended_fires_once_and_pauses() {
        let mut player = SimulatedPlayer::new(0.001);
        player.play();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(player.advance());
        assert!(player.has_ended());
        assert!(!player.is_playing());
        assert_eq!(player.position(), 0.001);
        assert!(!player.advance());
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let mut player = SimulatedPlayer::new(60.0);
        player.seek(120.0);
        assert_eq!(player.position(), 60.0);
        player.seek(-5.0);
        assert_eq!(player.position(), 0.0);
    }

    #[test]
    fn test_load_replaces_source_and_rewinds() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "spar.webm", 64);
        let mut player = SimulatedPlayer::new(60.0);
        player.play();
        player.seek(10.0);

        player.load(Some(VideoFile::open(&path).unwrap()), 90.0);
        assert_eq!(player.position(), 0.0);
        assert!(!player.is_playing());
        assert_eq!(player.duration(), Some(90.0));
        assert_eq!(player.video().unwrap().file_name(), "spar.webm");
    }
}
