//! Animation producer
//!
//! [`AnimationProducer`] is everything an algorithm may ask of the stage.
//! [`TimelineProducer`] records those requests as timed [`Step`]s and keeps
//! a stage map of where each actor stands so moves know their origin and
//! "next to" placements can follow actors around.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{
    Actor, Comparison, Glyph, Layout, Place, Point, Step, StepAction, Timeline,
};
use crate::algorithm::Value;
use crate::config::SessionConfig;
use crate::tree::{BinaryTree, IndexPath, NodeId};

/// Stage requests issued by algorithms while they mutate the tree
pub trait AnimationProducer {
    /// Replace the active timeline with a fresh one opened by a start marker
    fn reset_timeline(&mut self, label: &str, tree: &BinaryTree<Value>);

    /// Close the active timeline with an end marker
    fn finish_timeline(&mut self);

    /// Allocate a fresh assistant marker
    fn new_probe(&mut self) -> Actor;

    /// Reveal an actor
    fn show(&mut self, actor: Actor, glyph: Glyph, place: Place);

    /// Take an actor off stage
    fn remove(&mut self, actor: Actor, fade: bool);

    /// Move an actor
    fn move_to(&mut self, actor: Actor, place: Place);

    /// Move nodes to the slots at the end of their paths together
    fn move_subtree(&mut self, moves: &[(NodeId, IndexPath)]);

    /// Two nodes trade places; each entry is a node and its new path
    fn swap(&mut self, a: (NodeId, IndexPath), b: (NodeId, IndexPath));

    /// Connect parent and child
    fn add_edge(&mut self, parent: NodeId, child: NodeId);

    /// Disconnect parent and child
    fn remove_edge(&mut self, parent: NodeId, child: NodeId);

    /// Show a comparison sign
    fn compare(&mut self, left: Actor, sign: Comparison, right: Actor);

    /// Change an actor's text
    fn relabel(&mut self, actor: Actor, glyph: Glyph, struck: bool);

    /// Open the array panel
    fn add_array(&mut self, len: usize);

    /// Write into an array cell
    fn insert_into_array(&mut self, slot: usize, value: Value);

    /// Close the array panel, if open
    fn remove_array(&mut self);

    /// Pause on the current tree for `ratio` of a show step
    fn show_tree(&mut self, ratio: f64);

    /// Redraw the whole tree from its current state
    fn redraw_tree(&mut self, tree: &BinaryTree<Value>);

    /// Change the selection; `show` emits a visible step
    fn select(&mut self, node: Option<NodeId>, show: bool);

    /// Current selection
    fn selected(&self) -> Option<NodeId>;

    /// Forget the selection without emitting anything
    fn clear_selection(&mut self);
}

/// Producer that records steps on a [`Timeline`]
#[derive(Debug)]
pub struct TimelineProducer {
    config: SessionConfig,
    layout: Layout,
    timeline: Timeline,
    stage: HashMap<Actor, Point>,
    next_probe: u32,
    selected: Option<NodeId>,
    array_len: Option<usize>,
}

impl TimelineProducer {
    /// Create producer
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            config: config.clone(),
            layout: Layout::new(config.width, config.height),
            timeline: Timeline::new(),
            stage: HashMap::new(),
            next_probe: 0,
            selected: None,
            array_len: None,
        }
    }

    /// Active timeline
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Drop the active timeline and restage the tree without recording
    /// anything
    pub fn discard_timeline(&mut self, tree: &BinaryTree<Value>) {
        debug!(discarded = self.timeline.len(), "timeline discarded");
        self.timeline = Timeline::new();
        self.stage.clear();
        self.next_probe = 0;
        self.array_len = None;
        self.seed_stage(tree);
    }

    /// Active timeline, mutably
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Layout in use
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Where an actor currently stands
    pub fn position(&self, actor: Actor) -> Option<Point> {
        self.stage.get(&actor).copied()
    }

    fn instant(&mut self, action: StepAction) {
        let step = Step::new(action, self.config.instant_duration_ms);
        self.timeline.push(step);
    }

    fn timed(&mut self, action: StepAction, ratio: f64) {
        let step = Step::new(action, self.config.step_duration_ms * ratio);
        self.timeline.push(step);
    }

    fn travel(&self, distance: f64) -> f64 {
        (distance / self.config.move_speed).max(self.config.instant_duration_ms)
    }

    fn resolve(&self, place: Place) -> Point {
        match place {
            Place::Index(path) => self.layout.path_location(&path),
            Place::NextToIndex(path) => self.layout.next_to_path(&path),
            Place::NextTo(actor) => self.layout.next_to(self.stand(actor)),
            Place::At(actor) => self.stand(actor),
            Place::ArraySlot(slot) => {
                let len = self.array_len.unwrap_or(slot + 1);
                self.layout.array_slot(slot, len)
            }
        }
    }

    fn stand(&self, actor: Actor) -> Point {
        match self.stage.get(&actor) {
            Some(p) => *p,
            None => {
                warn!(?actor, "actor not on stage, placing at origin");
                Point::default()
            }
        }
    }

    fn seed_stage(&mut self, tree: &BinaryTree<Value>) -> Vec<Option<Value>> {
        self.stage.retain(|actor, _| matches!(actor, Actor::Probe(_)));
        for (id, path) in tree.pathed_nodes() {
            self.stage
                .insert(Actor::Node(id), self.layout.path_location(&path));
        }
        tree.to_value_array().unwrap_or_default()
    }
}

impl AnimationProducer for TimelineProducer {
    fn reset_timeline(&mut self, label: &str, tree: &BinaryTree<Value>) {
        debug!(label, discarded = self.timeline.len(), "timeline reset");
        self.timeline = Timeline::new();
        self.stage.clear();
        self.next_probe = 0;
        let values = self.seed_stage(tree);
        self.instant(StepAction::Start {
            label: label.to_string(),
        });
        self.instant(StepAction::RedrawTree { values });
    }

    fn finish_timeline(&mut self) {
        self.instant(StepAction::End);
    }

    fn new_probe(&mut self) -> Actor {
        let probe = Actor::Probe(self.next_probe);
        self.next_probe += 1;
        probe
    }

    fn show(&mut self, actor: Actor, glyph: Glyph, place: Place) {
        let at = self.resolve(place);
        self.stage.insert(actor, at);
        self.timed(StepAction::Show { actor, glyph, at }, 1.0);
    }

    fn remove(&mut self, actor: Actor, fade: bool) {
        self.stage.remove(&actor);
        if fade {
            self.timed(StepAction::Remove { actor, fade }, 1.0);
        } else {
            self.instant(StepAction::Remove { actor, fade });
        }
    }

    fn move_to(&mut self, actor: Actor, place: Place) {
        let to = self.resolve(place);
        let from = self.stage.get(&actor).copied().unwrap_or(to);
        self.stage.insert(actor, to);
        let duration = self.travel(from.distance(to));
        self.timeline
            .push(Step::new(StepAction::Move { actor, from, to }, duration));
    }

    fn move_subtree(&mut self, moves: &[(NodeId, IndexPath)]) {
        let mut longest: f64 = 0.0;
        let mut triples = Vec::with_capacity(moves.len());
        for (node, path) in moves {
            let node = *node;
            let to = self.layout.path_location(path);
            let from = self.stage.get(&Actor::Node(node)).copied().unwrap_or(to);
            longest = longest.max(from.distance(to));
            self.stage.insert(Actor::Node(node), to);
            triples.push((node, from, to));
        }
        let duration = self.travel(longest);
        self.timeline
            .push(Step::new(StepAction::MoveSubtree { moves: triples }, duration));
    }

    fn swap(&mut self, (a, a_path): (NodeId, IndexPath), (b, b_path): (NodeId, IndexPath)) {
        let a_to = self.layout.path_location(&a_path);
        let b_to = self.layout.path_location(&b_path);
        let a_from = self.stage.get(&Actor::Node(a)).copied().unwrap_or(b_to);
        let b_from = self.stage.get(&Actor::Node(b)).copied().unwrap_or(a_to);
        self.stage.insert(Actor::Node(a), a_to);
        self.stage.insert(Actor::Node(b), b_to);
        let duration = self.travel(a_from.distance(a_to).max(b_from.distance(b_to)));
        self.timeline
            .push(Step::new(StepAction::Swap { a, b, a_to, b_to }, duration));
    }

    fn add_edge(&mut self, parent: NodeId, child: NodeId) {
        self.instant(StepAction::AddEdge { parent, child });
    }

    fn remove_edge(&mut self, parent: NodeId, child: NodeId) {
        self.instant(StepAction::RemoveEdge { parent, child });
    }

    fn compare(&mut self, left: Actor, sign: Comparison, right: Actor) {
        self.timed(StepAction::Compare { left, sign, right }, 1.0);
    }

    fn relabel(&mut self, actor: Actor, glyph: Glyph, struck: bool) {
        self.instant(StepAction::Relabel {
            actor,
            glyph,
            struck,
        });
    }

    fn add_array(&mut self, len: usize) {
        self.array_len = Some(len);
        self.instant(StepAction::AddArray { len });
    }

    fn insert_into_array(&mut self, slot: usize, value: Value) {
        self.timed(StepAction::InsertIntoArray { slot, value }, 1.0);
    }

    fn remove_array(&mut self) {
        if self.array_len.take().is_some() {
            self.instant(StepAction::RemoveArray);
        }
    }

    fn show_tree(&mut self, ratio: f64) {
        self.timed(StepAction::ShowTree, ratio);
    }

    fn redraw_tree(&mut self, tree: &BinaryTree<Value>) {
        let values = self.seed_stage(tree);
        self.instant(StepAction::RedrawTree { values });
    }

    fn select(&mut self, node: Option<NodeId>, show: bool) {
        self.selected = node;
        if show {
            self.instant(StepAction::Select { node });
        }
    }

    fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producer() -> TimelineProducer {
        TimelineProducer::new(&SessionConfig::default())
    }

    #[test]
    fn test_reset_opens_with_start_and_redraw() {
        let mut p = producer();
        let tree = BinaryTree::from_values([5, 3]);
        p.reset_timeline("insert(value: 1)", &tree);
        let steps = p.timeline().steps();
        assert_eq!(steps.len(), 2);
        assert!(matches!(&steps[0].action, StepAction::Start { label } if label == "insert(value: 1)"));
        assert_eq!(
            steps[1].action,
            StepAction::RedrawTree {
                values: vec![Some(5), Some(3)]
            }
        );
    }

    #[test]
    fn test_move_duration_follows_distance() {
        let mut p = producer();
        let tree = BinaryTree::from_values([5, 3]);
        p.reset_timeline("x", &tree);
        let left = tree.node_at(1).unwrap();
        // (200, 200) -> (400, 100)
        p.move_to(Actor::Node(left), Place::index(0));
        let step = p.timeline().steps().last().unwrap();
        let expected = (200f64.hypot(100.0)) / 0.25;
        assert!((step.duration_ms - expected).abs() < 1e-9);
    }

    #[test]
    fn test_next_to_follows_actor() {
        let mut p = producer();
        let probe = p.new_probe();
        p.show(probe, Glyph::Down, Place::index(2));
        let ghost = p.new_probe();
        p.show(ghost, Glyph::Value(4), Place::NextTo(probe));
        assert_eq!(p.position(ghost), Some(Point::new(600.0, 125.0)));
    }

    #[test]
    fn test_remove_array_only_when_open() {
        let mut p = producer();
        p.remove_array();
        assert!(p.timeline().is_empty());
        p.add_array(3);
        p.remove_array();
        assert_eq!(p.timeline().len(), 2);
    }

    #[test]
    fn test_silent_selection() {
        let mut p = producer();
        let tree = BinaryTree::from_values([1]);
        let root = tree.root();
        p.select(root, false);
        assert_eq!(p.selected(), root);
        assert!(p.timeline().is_empty());
        p.clear_selection();
        assert_eq!(p.selected(), None);
    }

    #[test]
    fn test_chain_deeper_than_index_range_is_staged() {
        let mut tree = BinaryTree::new();
        let mut tip = tree.new_node(0);
        tree.set_root(Some(tip)).unwrap();
        for v in 1..70 {
            let next = tree.new_node(v);
            tree.set_right(tip, Some(next)).unwrap();
            tip = next;
        }
        let mut p = producer();
        p.reset_timeline("x", &tree);
        assert!(tree
            .preorder()
            .all(|id| p.position(Actor::Node(id)).is_some()));
        let deepest = p.position(Actor::Node(tip)).unwrap();
        assert_eq!(deepest.y, 70.0 * p.layout().vertical_spacing());
    }
}
