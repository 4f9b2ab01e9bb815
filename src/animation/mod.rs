//! Animation timeline
//!
//! Algorithms describe what happens on stage through the narrow
//! [`AnimationProducer`] interface. [`TimelineProducer`] turns those calls
//! into an ordered list of [`Step`]s on a [`Timeline`], and the timeline's
//! cursor scheduler replays them against a [`StepRenderer`] on ticks.

mod layout;
mod producer;
mod timeline;

pub use layout::{Layout, Point};
pub use producer::{AnimationProducer, TimelineProducer};
pub use timeline::{PlaybackState, StepRenderer, Tick, Timeline};

use std::fmt;

use crate::algorithm::Value;
use crate::tree::{IndexPath, NodeId};

/// Something that can appear on stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Actor {
    /// A tree node
    Node(NodeId),
    /// An assistant marker (search arrow or value ghost)
    Probe(u32),
}

/// Text carried by an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Glyph {
    /// ⇙
    DownLeft,
    /// ⇘
    DownRight,
    /// ⇑
    Up,
    /// ⇓
    Down,
    /// ↖
    UpLeft,
    /// ↗
    UpRight,
    /// A value
    Value(Value),
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Glyph::DownLeft => write!(f, "⇙"),
            Glyph::DownRight => write!(f, "⇘"),
            Glyph::Up => write!(f, "⇑"),
            Glyph::Down => write!(f, "⇓"),
            Glyph::UpLeft => write!(f, "↖"),
            Glyph::UpRight => write!(f, "↗"),
            Glyph::Value(v) => write!(f, "{v}"),
        }
    }
}

/// Comparison sign shown between two actors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    /// `<`
    Less,
    /// `=`
    Equal,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl Comparison {
    /// Strict sign relating `a` to `b`
    pub fn between(a: Value, b: Value) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Comparison::Less,
            std::cmp::Ordering::Equal => Comparison::Equal,
            std::cmp::Ordering::Greater => Comparison::Greater,
        }
    }

    /// Printed sign
    pub fn sign(self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::Equal => "=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sign())
    }
}

/// Where an actor should go, resolved by the producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Place {
    /// The slot at the end of a root-to-node path
    Index(IndexPath),
    /// Just above the slot at the end of a root-to-node path
    NextToIndex(IndexPath),
    /// Just above wherever another actor currently stands
    NextTo(Actor),
    /// Exactly where another actor currently stands
    At(Actor),
    /// A cell of the array panel
    ArraySlot(usize),
}

impl Place {
    /// Slot of a positional index
    pub fn index(index: usize) -> Self {
        Place::Index(IndexPath::from_index(index))
    }

    /// Just above the slot of a positional index
    pub fn next_to_index(index: usize) -> Self {
        Place::NextToIndex(IndexPath::from_index(index))
    }
}

/// What a step does
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepAction {
    /// Opens a top-level timeline
    Start {
        /// Operation description
        label: String,
    },
    /// Closes a top-level timeline
    End,
    /// Draws the whole tree from scratch
    RedrawTree {
        /// Sparse value array
        values: Vec<Option<Value>>,
    },
    /// Reveals an actor
    Show {
        /// Actor to reveal
        actor: Actor,
        /// Its text
        glyph: Glyph,
        /// Where it appears
        at: Point,
    },
    /// Takes an actor off stage
    Remove {
        /// Actor to remove
        actor: Actor,
        /// Fade out instead of vanishing
        fade: bool,
    },
    /// Moves one actor
    Move {
        /// Actor being moved
        actor: Actor,
        /// Start location
        from: Point,
        /// End location
        to: Point,
    },
    /// Moves several nodes together
    MoveSubtree {
        /// `(node, from, to)` triples
        moves: Vec<(NodeId, Point, Point)>,
    },
    /// Two nodes trade places
    Swap {
        /// First node
        a: NodeId,
        /// Second node
        b: NodeId,
        /// Where `a` ends up
        a_to: Point,
        /// Where `b` ends up
        b_to: Point,
    },
    /// Connects parent and child
    AddEdge {
        /// Upper end
        parent: NodeId,
        /// Lower end
        child: NodeId,
    },
    /// Disconnects parent and child
    RemoveEdge {
        /// Upper end
        parent: NodeId,
        /// Lower end
        child: NodeId,
    },
    /// Shows a comparison sign between two actors
    Compare {
        /// Left operand
        left: Actor,
        /// Sign
        sign: Comparison,
        /// Right operand
        right: Actor,
    },
    /// Changes an actor's text
    Relabel {
        /// Actor
        actor: Actor,
        /// New text
        glyph: Glyph,
        /// Draw struck through (dead end)
        struck: bool,
    },
    /// Opens the array panel
    AddArray {
        /// Number of cells
        len: usize,
    },
    /// Writes a value into an array cell
    InsertIntoArray {
        /// Cell
        slot: usize,
        /// Value written
        value: Value,
    },
    /// Closes the array panel
    RemoveArray,
    /// Pause on the current tree
    ShowTree,
    /// Highlights a node, or clears the highlight
    Select {
        /// Selected node
        node: Option<NodeId>,
    },
}

/// One timeline entry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// What happens
    pub action: StepAction,
    /// How long it takes
    pub duration_ms: f64,
}

impl Step {
    /// Create step
    pub fn new(action: StepAction, duration_ms: f64) -> Self {
        Self {
            action,
            duration_ms,
        }
    }
}
