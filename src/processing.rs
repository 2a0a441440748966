const STEPS: [&str; 6] = [
    "Reading video data...",
    "Extracting motion frames...",
    "Analyzing strike patterns...",
    "Calculating power metrics...",
    "Generating AI insights...",
    "Creating combat profile...",
];

/// The simulated "AI analysis" phase: a progress bar that fills by 2% per
/// tick while walking through canned step labels. Purely theatrical; the
/// session is generated in one shot when this completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingPhase {
    progress: u8,
}

impl ProcessingPhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick. Returns true once progress reaches 100.
    pub fn advance(&mut self) -> bool {
        self.progress = (self.progress + 2).min(100);
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn step(&self) -> &'static str {
        let index = (usize::from(self.progress) * STEPS.len() / 100).min(STEPS.len() - 1);
        STEPS[index]
    }
}
