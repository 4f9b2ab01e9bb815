//! Interactive session
//!
//! Owns the live tree, the producer (and with it the single active
//! timeline) and the history. Playback is driven from outside through
//! [`Session::tick`]; when a timeline finishes the tick reports it, and in
//! continuous mode the session chains straight into the next history
//! entry.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::algorithm::{AlgorithmError, AlgorithmUnit, Operation, Outcome, Value};
use crate::animation::{
    AnimationProducer, PlaybackState, Step, StepAction, StepRenderer, Tick, Timeline,
    TimelineProducer,
};
use crate::config::{ConfigError, SessionConfig};
use crate::history::History;
use crate::tree::{BinaryTree, NodeId};

/// Errors raised by session control
#[derive(Error, Debug)]
pub enum SessionError {
    /// An algorithm failed to construct or run
    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),

    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Nothing has been executed yet
    #[error("no algorithm has been executed")]
    NoAlgorithm,

    /// Already at the first entry
    #[error("no previous history entry")]
    NoPrevious,

    /// Already at the last entry
    #[error("no next history entry")]
    NoNext,

    /// Seek past the end of history
    #[error("history index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// History length
        len: usize,
    },
}

/// Counts start/end markers on their way to the real renderer
struct MarkerHook<'r> {
    inner: &'r mut dyn StepRenderer,
    starts: usize,
    ends: usize,
}

impl<'r> MarkerHook<'r> {
    fn new(inner: &'r mut dyn StepRenderer) -> Self {
        Self {
            inner,
            starts: 0,
            ends: 0,
        }
    }
}

impl StepRenderer for MarkerHook<'_> {
    fn setup(&mut self, step: &Step) {
        self.inner.setup(step);
    }

    fn update(&mut self, step: &Step, fraction: f64) {
        self.inner.update(step, fraction);
    }

    fn complete(&mut self, step: &Step) {
        match step.action {
            StepAction::Start { .. } => self.starts += 1,
            StepAction::End => self.ends += 1,
            _ => {}
        }
        self.inner.complete(step);
    }
}

/// Live tree, animation and history for one user
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    tree: BinaryTree<Value>,
    producer: TimelineProducer,
    history: History,
    rng: SmallRng,
    last_outcome: Option<Outcome>,
}

impl Session {
    /// Create session with an empty tree
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        info!(seed = ?config.seed, continuous = config.continuous, "session created");
        Ok(Self {
            producer: TimelineProducer::new(&config),
            history: History::new(config.continuous),
            tree: BinaryTree::new(),
            rng,
            last_outcome: None,
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Live tree
    pub fn tree(&self) -> &BinaryTree<Value> {
        &self.tree
    }

    /// Active timeline
    pub fn timeline(&self) -> &Timeline {
        self.producer.timeline()
    }

    /// Producer (stage positions, selection)
    pub fn producer(&self) -> &TimelineProducer {
        &self.producer
    }

    /// History
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Unit at the history cursor, e.g. to register listeners
    pub fn current_unit_mut(&mut self) -> Option<&mut AlgorithmUnit> {
        self.history.current_unit_mut()
    }

    /// Result of the most recent execution
    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Selected node
    pub fn selected_node(&self) -> Option<NodeId> {
        self.producer.selected()
    }

    /// Select a node (as a click would) without animating
    pub fn select_node(&mut self, node: Option<NodeId>) {
        self.producer.select(node, false);
    }

    /// Playback state of the active timeline
    pub fn playback_state(&self) -> PlaybackState {
        self.producer.timeline().state()
    }

    /// Toggle continuous chaining
    pub fn set_continuous(&mut self, continuous: bool) {
        self.config.continuous = continuous;
        self.history.set_continuous(continuous);
    }

    /// Resume playback
    pub fn play(&mut self) {
        self.producer.timeline_mut().play();
    }

    /// Hold playback
    pub fn pause(&mut self) {
        self.producer.timeline_mut().pause();
    }

    /// Play if paused or stopped, pause if playing
    pub fn toggle_play(&mut self) {
        match self.playback_state() {
            PlaybackState::Playing => self.pause(),
            _ => self.play(),
        }
    }

    fn default_target(&self, op: &Operation) -> Option<NodeId> {
        if !op.needs_node() {
            return None;
        }
        let selected = self
            .producer
            .selected()
            .filter(|n| self.tree.preorder().any(|r| r == *n));
        match op {
            Operation::BstGetMax | Operation::BstGetMin => selected.or(self.tree.root()),
            _ => selected,
        }
    }

    /// Finish whatever is animating before the tree changes under it
    fn settle(&mut self) {
        if self.playback_state() != PlaybackState::Stopped {
            self.skip_forward(&mut ());
        }
    }

    /// Record and run a new operation
    ///
    /// Node-taking operations without an explicit target use the current
    /// selection (BST max/min fall back to the root). Entries after the
    /// history cursor are discarded, but only once the operation has run:
    /// a failing operation leaves the history, the tree and the selection
    /// as they were and an empty timeline.
    pub fn submit(
        &mut self,
        op: Operation,
        target: Option<NodeId>,
    ) -> Result<Outcome, SessionError> {
        self.settle();
        let target = target.or_else(|| self.default_target(&op));
        let mut unit = AlgorithmUnit::new(op, &self.tree, target, &mut self.producer)?;
        debug!(label = %unit, "submit");
        match unit.execute(&mut self.tree, &mut self.producer, &mut self.rng) {
            Ok(outcome) => {
                self.history.push(unit);
                self.history.advance();
                Ok(self.started(outcome))
            }
            Err(err) => {
                roll_back(&unit, &mut self.tree, &mut self.producer, &err);
                Err(err.into())
            }
        }
    }

    /// Execute the entry at the cursor, undoing it first when replaying
    fn execute_current(&mut self, replay: bool) -> Result<Outcome, SessionError> {
        let unit = self
            .history
            .current_unit_mut()
            .ok_or(SessionError::NoAlgorithm)?;
        if replay {
            unit.undo(&mut self.tree);
        }
        match unit.execute(&mut self.tree, &mut self.producer, &mut self.rng) {
            Ok(outcome) => Ok(self.started(outcome)),
            Err(err) => {
                roll_back(unit, &mut self.tree, &mut self.producer, &err);
                Err(err.into())
            }
        }
    }

    fn started(&mut self, outcome: Outcome) -> Outcome {
        self.producer.timeline_mut().play();
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    fn fire_markers(&mut self, starts: usize, ends: usize) {
        if let Some(unit) = self.history.current_unit_mut() {
            for _ in 0..starts {
                unit.fire_start_listeners();
            }
            for _ in 0..ends {
                unit.fire_end_listeners();
            }
        }
    }

    /// Advance playback by `elapsed_ms`
    ///
    /// A finished timeline in continuous mode immediately executes and
    /// starts playing the next history entry.
    pub fn tick(
        &mut self,
        elapsed_ms: f64,
        renderer: &mut dyn StepRenderer,
    ) -> Result<Tick, SessionError> {
        let mut hook = MarkerHook::new(renderer);
        let tick = self.producer.timeline_mut().tick(elapsed_ms, &mut hook);
        let (starts, ends) = (hook.starts, hook.ends);
        self.fire_markers(starts, ends);

        if tick == Tick::Finished && self.history.is_continuous() && self.history.has_next() {
            self.history.advance();
            self.execute_current(false)?;
        }
        Ok(tick)
    }

    /// Tick at the configured frame rate until playback stops
    ///
    /// Returns the number of ticks taken.
    pub fn run_to_end(&mut self, renderer: &mut dyn StepRenderer) -> Result<usize, SessionError> {
        let frame = self.config.frame_interval_ms();
        let mut ticks = 0;
        while self.tick(frame, renderer)? != Tick::Idle {
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Complete the active timeline at once
    ///
    /// End listeners fire when the end marker completes, as in normal
    /// playback, but the session never chains into the next entry from
    /// here.
    pub fn skip_forward(&mut self, renderer: &mut dyn StepRenderer) {
        let mut hook = MarkerHook::new(renderer);
        let completed = self.producer.timeline_mut().skip_to_end(&mut hook);
        let (starts, ends) = (hook.starts, hook.ends);
        debug!(completed, "skipped forward");
        self.fire_markers(starts, ends);
    }

    /// Rewind the current entry: undo it and play it again from the first
    /// step
    pub fn skip_backward(&mut self) -> Result<Outcome, SessionError> {
        self.execute_current(true)
    }

    /// Step back one history entry and replay it
    pub fn previous(&mut self) -> Result<Outcome, SessionError> {
        self.settle();
        self.history.retreat().ok_or(SessionError::NoPrevious)?;
        self.execute_current(true)
    }

    /// Step forward one history entry and replay it
    pub fn next(&mut self) -> Result<Outcome, SessionError> {
        self.settle();
        self.history.advance().ok_or(SessionError::NoNext)?;
        self.execute_current(true)
    }

    /// Jump to a history entry and replay it
    pub fn redo_at(&mut self, index: usize) -> Result<Outcome, SessionError> {
        self.settle();
        if !self.history.seek(index) {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.history.len(),
            });
        }
        self.execute_current(true)
    }
}

/// Put the tree back to the unit's snapshot after a failed execution and
/// drop the half-recorded timeline
fn roll_back(
    unit: &AlgorithmUnit,
    tree: &mut BinaryTree<Value>,
    producer: &mut TimelineProducer,
    err: &AlgorithmError,
) {
    unit.undo(tree);
    producer.discard_timeline(tree);
    let selected = unit.selected_path().and_then(|path| path.resolve(tree));
    producer.select(selected, false);
    warn!(label = %unit, %err, "operation failed, tree restored");
}
