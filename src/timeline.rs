use itertools::Itertools;
use rand::Rng;

/// Pre-generated punch timestamps for one session, sorted ascending.
/// Immutable once built; the sampler only ever counts how many entries the
/// playhead has crossed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    stamps: Vec<f64>,
}

impl Timeline {
    /// Draw `total_events` uniform timestamps in `[0, duration)` and sort
    /// them. Coincident stamps are kept; both get counted when crossed.
    /// A non-positive or non-finite duration yields an empty timeline;
    /// callers creating a session substitute the default duration first.
    pub fn generate<R: Rng>(rng: &mut R, total_events: u32, duration: f64) -> Self {
        if !duration.is_finite() || duration <= 0.0 {
            return Self::default();
        }

        let stamps = (0..total_events)
            .map(|_| rng.gen_range(0.0..duration))
            .sorted_by(|a, b| a.partial_cmp(b).unwrap())
            .collect();

        Self { stamps }
    }

    /// Build a timeline from explicit timestamps (sorted on the way in).
    pub fn from_stamps(mut stamps: Vec<f64>) -> Self {
        stamps.sort_by(|a, b| a.partial_cmp(b).unwrap());
        Self { stamps }
    }

    /// How many punches are due at `position`: entries with timestamp
    /// `<= position`. Monotone in `position`, bounded by `len()`.
    pub fn events_at(&self, position: f64) -> usize {
        self.stamps.partition_point(|&t| t <= position)
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn stamps(&self) -> &[f64] {
        &self.stamps
    }
}
