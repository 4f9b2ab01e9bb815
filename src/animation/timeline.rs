//! Cursor scheduler over an ordered step list
//!
//! Each tick hands the scheduler some elapsed time. The current step's
//! progress grows by that time; when it reaches the step's duration the
//! step completes, the cursor advances and the leftover time flows into
//! the next step. Steps shorter than the remaining budget therefore
//! cascade within a single tick.

use tracing::debug;

use super::Step;

/// Receives step callbacks while a timeline plays
///
/// All methods default to no-ops; `()` is the silent renderer.
pub trait StepRenderer {
    /// Called once when a step becomes current
    fn setup(&mut self, _step: &Step) {}

    /// Called on every tick that advances the step, with progress in `0..=1`
    fn update(&mut self, _step: &Step, _fraction: f64) {}

    /// Called once when the step finishes
    fn complete(&mut self, _step: &Step) {}
}

impl StepRenderer for () {}

/// Playback state of a [`Timeline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not running; nothing in flight
    Stopped,
    /// Holding at the cursor
    Paused,
    /// Advancing on ticks
    Playing,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The timeline is not playing
    Idle,
    /// Steps remain after this tick
    Running,
    /// The last step completed during this tick
    Finished,
}

/// Ordered steps plus a cursor
#[derive(Debug, Clone)]
pub struct Timeline {
    steps: Vec<Step>,
    cursor: usize,
    progress_ms: f64,
    set_up: bool,
    state: PlaybackState,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    /// Create empty, stopped timeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cursor: 0,
            progress_ms: 0.0,
            set_up: false,
            state: PlaybackState::Stopped,
        }
    }

    /// Append a step
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// All steps
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when there are no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the next step to complete
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when every step has completed
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Sum of all step durations
    pub fn total_duration_ms(&self) -> f64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }

    /// Start or resume advancing
    pub fn play(&mut self) {
        if !self.is_finished() {
            self.state = PlaybackState::Playing;
        }
    }

    /// Hold at the cursor
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Stop without moving the cursor
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
    }

    /// Advance by `elapsed_ms`
    pub fn tick(&mut self, elapsed_ms: f64, renderer: &mut dyn StepRenderer) -> Tick {
        if self.state != PlaybackState::Playing {
            return Tick::Idle;
        }
        let mut budget = elapsed_ms.max(0.0);
        loop {
            let Some(step) = self.steps.get(self.cursor) else {
                self.state = PlaybackState::Stopped;
                debug!(steps = self.steps.len(), "timeline finished");
                return Tick::Finished;
            };
            if !self.set_up {
                renderer.setup(step);
                self.set_up = true;
            }
            let remaining = (step.duration_ms - self.progress_ms).max(0.0);
            if budget >= remaining {
                budget -= remaining;
                renderer.update(step, 1.0);
                renderer.complete(step);
                self.cursor += 1;
                self.progress_ms = 0.0;
                self.set_up = false;
            } else {
                self.progress_ms += budget;
                renderer.update(step, self.progress_ms / step.duration_ms);
                return Tick::Running;
            }
        }
    }

    /// Complete every remaining step without intermediate frames
    ///
    /// Returns the number of steps completed.
    pub fn skip_to_end(&mut self, renderer: &mut dyn StepRenderer) -> usize {
        self.state = PlaybackState::Stopped;
        let mut completed = 0;
        while let Some(step) = self.steps.get(self.cursor) {
            if !self.set_up {
                renderer.setup(step);
            }
            renderer.complete(step);
            self.cursor += 1;
            self.set_up = false;
            completed += 1;
        }
        self.progress_ms = 0.0;
        completed
    }

    /// blake3 digest of the step sequence
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for step in &self.steps {
            hasher.update(format!("{:?}", step.action).as_bytes());
            hasher.update(&step.duration_ms.to_bits().to_le_bytes());
        }
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::StepAction;

    #[derive(Default)]
    struct Recorder {
        completed: Vec<StepAction>,
        last_fraction: f64,
    }

    impl StepRenderer for Recorder {
        fn update(&mut self, _step: &Step, fraction: f64) {
            self.last_fraction = fraction;
        }

        fn complete(&mut self, step: &Step) {
            self.completed.push(step.action.clone());
        }
    }

    fn timeline() -> Timeline {
        let mut t = Timeline::new();
        t.push(Step::new(StepAction::Start { label: "x".into() }, 1.0));
        t.push(Step::new(StepAction::ShowTree, 100.0));
        t.push(Step::new(StepAction::End, 1.0));
        t
    }

    #[test]
    fn test_idle_until_played() {
        let mut t = timeline();
        assert_eq!(t.tick(10.0, &mut ()), Tick::Idle);
        assert_eq!(t.cursor(), 0);
    }

    #[test]
    fn test_leftover_time_carries_over() {
        let mut t = timeline();
        let mut r = Recorder::default();
        t.play();
        assert_eq!(t.tick(51.0, &mut r), Tick::Running);
        assert_eq!(t.cursor(), 1);
        assert!((r.last_fraction - 0.5).abs() < 1e-9);
        assert_eq!(t.tick(51.0, &mut r), Tick::Finished);
        assert_eq!(r.completed.len(), 3);
        assert_eq!(t.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_pause_holds_cursor() {
        let mut t = timeline();
        t.play();
        t.tick(30.0, &mut ());
        t.pause();
        assert_eq!(t.state(), PlaybackState::Paused);
        assert_eq!(t.tick(500.0, &mut ()), Tick::Idle);
        assert_eq!(t.cursor(), 1);
        t.play();
        assert_eq!(t.tick(500.0, &mut ()), Tick::Finished);
    }

    #[test]
    fn test_skip_completes_everything() {
        let mut t = timeline();
        let mut r = Recorder::default();
        t.play();
        t.tick(10.0, &mut r);
        assert_eq!(t.skip_to_end(&mut r), 2);
        assert!(t.is_finished());
        assert_eq!(r.completed.last(), Some(&StepAction::End));
        t.play();
        assert_eq!(t.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = timeline();
        let mut b = timeline();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.push(Step::new(StepAction::RemoveArray, 1.0));
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
