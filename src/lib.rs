//! # Stepwise Tree Algorithms
//!
//! Binary search tree and binary max-heap algorithms that describe every
//! comparison, move and swap they perform as a replayable animation
//! timeline.
//!
//! ## Core Pieces
//!
//! 1. **Tree model**: arena-backed binary tree addressed by level-order
//!    positional indices (root 0, children `2i+1` / `2i+2`)
//! 2. **Algorithm units**: each operation snapshots the tree, runs against
//!    the live tree and can be undone and re-run any number of times
//! 3. **Timelines**: steps with durations, played by a cursor scheduler
//!    that calls back into a renderer
//! 4. **History**: executed units with a cursor, seekable, optionally
//!    chaining from one entry into the next
//!
//! ## Usage Example
//!
//! ```ignore
//! use treestep::{Operation, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default().with_seed(7))?;
//! for v in [5, 3, 8, 1] {
//!     session.submit(Operation::BstInsert(v), None)?;
//! }
//! let inorder = session.submit(Operation::InorderArray, None)?;
//! assert_eq!(inorder.values(), vec![1, 3, 5, 8]);
//! session.run_to_end(&mut ())?;
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod algorithm; // Operations and the unit harness
pub mod animation; // Steps, producer and timeline playback
pub mod config; // Session tunables
pub mod history; // Executed-unit history
pub mod session; // Live tree plus playback control
pub mod tree; // Arena binary tree and positional indices

pub use algorithm::{AlgorithmError, AlgorithmUnit, Found, Operation, Outcome, Value};
pub use animation::{
    Actor, AnimationProducer, PlaybackState, Step, StepAction, StepRenderer, Tick, Timeline,
    TimelineProducer,
};
pub use config::{ConfigError, SessionConfig};
pub use history::History;
pub use session::{Session, SessionError};
pub use tree::{BinaryTree, NodeId, Side, StructuralError};
