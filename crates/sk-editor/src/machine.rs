//! Hierarchical interactive state machine.
//!
//! States form a tree declared once with `StateDef`. Exactly one
//! root-to-leaf path is active at a time. Each node on the active path owns
//! an `Activation` created by its `State::enter` and consumed by
//! `Activation::on_exit`, so per-gesture data never outlives the gesture.
//!
//! Events walk the active path root-to-leaf. A node only sees the kinds it
//! registered through `State::handles`. A handler that requests a transition
//! (via `StateCtx::transition`) stops propagation, and the transition is
//! applied before `dispatch` returns.
//!
//! Paths are dot separated and relative to the root: `select.crop.idle`.

use crate::cursor::Cursor;
use crate::input::{EventKinds, InputEvent, InputsState, PointerTarget};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use sk_core::{MarkId, Modifiers, Point, RecordId, ResizeHandle, Store};
use smallvec::SmallVec;
use std::any::Any;
use std::collections::{HashMap, VecDeque};

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    #[error("invalid transition: no state at `{path}`")]
    InvalidTransition { path: String },

    #[error("transition chain exceeded {limit} steps")]
    TransitionLoop { limit: usize },

    #[error("state tree `{root}` has no child states")]
    EmptyTree { root: String },

    #[error("duplicate state `{path}`")]
    DuplicateState { path: String },

    #[error("invalid state id `{id}`")]
    InvalidStateId { id: String },
}

// ─── Transition payload ──────────────────────────────────────────────────

/// Data handed to every `enter` hook of a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateInfo {
    pub target: PointerTarget,
    /// The shape the new state should act on.
    pub shape_id: Option<RecordId>,
    pub point: Point,
    pub modifiers: Modifiers,
    pub handle: Option<ResizeHandle>,
    /// The gesture is finishing a shape that was just created.
    pub is_creating: bool,
    /// Where to go when the interaction completes, instead of its idle state.
    pub on_interaction_end: Option<String>,
    /// Mark taken before the shape was created; cancel bails to it.
    pub creation_mark: Option<MarkId>,
}

impl StateInfo {
    pub fn for_shape(id: RecordId) -> Self {
        Self {
            shape_id: Some(id),
            ..Self::default()
        }
    }

    /// Capture the pointer fields of `event`.
    pub fn from_event(event: &InputEvent) -> Self {
        match event {
            InputEvent::PointerDown {
                target,
                point,
                modifiers,
            }
            | InputEvent::PointerMove {
                target,
                point,
                modifiers,
            }
            | InputEvent::PointerUp {
                target,
                point,
                modifiers,
            } => Self {
                target: *target,
                shape_id: target.shape_id(),
                point: *point,
                modifiers: *modifiers,
                handle: match target {
                    PointerTarget::Handle { handle, .. } => Some(*handle),
                    _ => None,
                },
                ..Self::default()
            },
            other => Self {
                modifiers: other.modifiers().unwrap_or_default(),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub target: String,
    pub info: StateInfo,
}

// ─── Hook context ────────────────────────────────────────────────────────

/// Everything a hook may touch. Built by the editor for each event.
pub struct StateCtx<'a> {
    pub store: &'a mut Store,
    pub inputs: &'a InputsState,
    pub cursor: &'a mut Cursor,
    queue: &'a mut VecDeque<InputEvent>,
    pending: Option<TransitionRequest>,
}

impl<'a> StateCtx<'a> {
    pub fn new(
        store: &'a mut Store,
        inputs: &'a InputsState,
        cursor: &'a mut Cursor,
        queue: &'a mut VecDeque<InputEvent>,
    ) -> Self {
        Self {
            store,
            inputs,
            cursor,
            queue,
            pending: None,
        }
    }

    /// Request a transition. Applied by the machine once the current hook
    /// returns; a later request in the same hook replaces an earlier one.
    pub fn transition(&mut self, target: impl Into<String>, info: StateInfo) {
        let target = target.into();
        if let Some(previous) = &self.pending {
            log::debug!("machine: `{}` replaces pending `{}`", target, previous.target);
        }
        self.pending = Some(TransitionRequest { target, info });
    }

    /// Queue a follow-up event, dispatched after the current one.
    pub fn send(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    pub fn has_pending_transition(&self) -> bool {
        self.pending.is_some()
    }

    fn take_transition(&mut self) -> Option<TransitionRequest> {
        self.pending.take()
    }
}

// ─── State traits ────────────────────────────────────────────────────────

/// A node's behavior. Stateless; per-activation data lives in the
/// `Activation` returned by `enter`.
pub trait State {
    /// Event kinds this node wants to see while active.
    fn handles(&self) -> EventKinds {
        EventKinds::NONE
    }

    fn enter(&self, ctx: &mut StateCtx<'_>, info: &StateInfo) -> Box<dyn Activation>;
}

/// Per-activation context of an active node.
pub trait Activation: Any {
    /// The info the node was entered with.
    fn info(&self) -> &StateInfo;

    fn on_event(&mut self, _ctx: &mut StateCtx<'_>, _event: &InputEvent) {}

    /// Runs exactly once when the node leaves the active path.
    fn on_exit(self: Box<Self>, _ctx: &mut StateCtx<'_>) {}

    /// Runs instead of `on_exit` when the active leaf is entered again.
    /// Whatever this activation holds must be settled here; the next
    /// `enter` starts from scratch.
    fn on_reenter(self: Box<Self>, _ctx: &mut StateCtx<'_>) {}
}

/// A grouping node with no behavior of its own.
pub struct Branch;

impl State for Branch {
    fn enter(&self, _ctx: &mut StateCtx<'_>, info: &StateInfo) -> Box<dyn Activation> {
        Box::new(Passive::new(info.clone()))
    }
}

/// Activation that only remembers its info.
#[derive(Debug)]
pub struct Passive {
    info: StateInfo,
}

impl Passive {
    pub fn new(info: StateInfo) -> Self {
        Self { info }
    }
}

impl Activation for Passive {
    fn info(&self) -> &StateInfo {
        &self.info
    }
}

// ─── Tree declaration ────────────────────────────────────────────────────

/// Declarative description of a state subtree. Children are kept in
/// declaration order; the first child is the default when a transition
/// names a non-leaf.
pub struct StateDef {
    id: String,
    state: Box<dyn State>,
    children: Vec<StateDef>,
}

impl StateDef {
    pub fn new(id: &str, state: impl State + 'static) -> Self {
        Self {
            id: id.to_string(),
            state: Box::new(state),
            children: Vec::new(),
        }
    }

    pub fn branch(id: &str) -> Self {
        Self::new(id, Branch)
    }

    #[must_use]
    pub fn child(mut self, child: StateDef) -> Self {
        self.children.push(child);
        self
    }
}

// ─── Machine ─────────────────────────────────────────────────────────────

struct StateNode {
    id: String,
    /// Root-relative path; empty for the root.
    path: String,
    state: Box<dyn State>,
    children: Vec<NodeIndex>,
    activation: Option<Box<dyn Activation>>,
}

type ActivePath = SmallVec<[NodeIndex; 6]>;

pub struct StateMachine {
    graph: StableDiGraph<StateNode, ()>,
    root: NodeIndex,
    /// Root-relative path → node.
    by_path: HashMap<String, NodeIndex>,
    active: ActivePath,
    max_chain: usize,
}

impl StateMachine {
    /// Build a machine from a declared tree. Nothing is active until the
    /// first `transition_to`.
    pub fn new(tree: StateDef, max_chain: usize) -> Result<Self, MachineError> {
        if tree.children.is_empty() {
            return Err(MachineError::EmptyTree { root: tree.id });
        }
        validate_id(&tree.id)?;

        let mut graph = StableDiGraph::new();
        let mut by_path = HashMap::new();
        let root = graph.add_node(StateNode {
            id: tree.id,
            path: String::new(),
            state: tree.state,
            children: Vec::new(),
            activation: None,
        });

        let mut stack: Vec<(NodeIndex, StateDef)> =
            tree.children.into_iter().rev().map(|c| (root, c)).collect();
        while let Some((parent, def)) = stack.pop() {
            validate_id(&def.id)?;
            let parent_path = &graph[parent].path;
            let path = if parent_path.is_empty() {
                def.id.clone()
            } else {
                format!("{parent_path}.{}", def.id)
            };
            if by_path.contains_key(&path) {
                return Err(MachineError::DuplicateState { path });
            }
            let idx = graph.add_node(StateNode {
                id: def.id,
                path: path.clone(),
                state: def.state,
                children: Vec::new(),
                activation: None,
            });
            graph.add_edge(parent, idx, ());
            graph[parent].children.push(idx);
            by_path.insert(path, idx);
            stack.extend(def.children.into_iter().rev().map(|c| (idx, c)));
        }

        Ok(Self {
            graph,
            root,
            by_path,
            active: ActivePath::new(),
            max_chain,
        })
    }

    // ─── Transitions ─────────────────────────────────────────────────────

    /// Make `path` (or its default leaf) active.
    ///
    /// Exits run leaf-first below the common ancestor, then enters run
    /// top-down. An unresolvable path fails before any hook runs.
    pub fn transition_to(
        &mut self,
        ctx: &mut StateCtx<'_>,
        path: &str,
        info: StateInfo,
    ) -> Result<(), MachineError> {
        self.run_transition(
            ctx,
            TransitionRequest {
                target: path.to_string(),
                info,
            },
        )
    }

    fn run_transition(
        &mut self,
        ctx: &mut StateCtx<'_>,
        request: TransitionRequest,
    ) -> Result<(), MachineError> {
        let mut next = Some(request);
        let mut steps = 0;
        while let Some(request) = next.take() {
            if steps > self.max_chain {
                return Err(MachineError::TransitionLoop {
                    limit: self.max_chain,
                });
            }
            next = self.apply_transition(ctx, request)?;
            steps += 1;
        }
        Ok(())
    }

    /// Apply one transition. Returns a transition requested by an enter hook.
    fn apply_transition(
        &mut self,
        ctx: &mut StateCtx<'_>,
        request: TransitionRequest,
    ) -> Result<Option<TransitionRequest>, MachineError> {
        let target = self
            .resolve(&request.target)
            .ok_or_else(|| MachineError::InvalidTransition {
                path: request.target.clone(),
            })?;

        let mut new_path = self.ancestry(target);
        let target_depth = new_path.len();
        while let Some(&first) = new_path.last().and_then(|&n| self.graph[n].children.first()) {
            new_path.push(first);
        }

        // An active target stays active, unless it is the leaf itself, which
        // is re-entered in place.
        let shared = self
            .active
            .iter()
            .zip(&new_path)
            .take_while(|(a, b)| a == b)
            .count();
        let mut keep = shared.min(target_depth);
        let reenter = keep == new_path.len();
        if reenter {
            keep -= 1;
        }

        log::debug!(
            "machine: {} -> {}",
            self.current_path(),
            self.graph[target].path
        );

        // Exit the old suffix, leaf first.
        if !reenter {
            while self.active.len() > keep {
                let Some(idx) = self.active.pop() else { break };
                if let Some(activation) = self.graph[idx].activation.take() {
                    activation.on_exit(ctx);
                }
                self.discard_request(ctx, idx, "exiting");
            }
        } else {
            self.active.truncate(keep);
            let leaf = new_path[keep];
            if let Some(activation) = self.graph[leaf].activation.take() {
                activation.on_reenter(ctx);
            }
            self.discard_request(ctx, leaf, "re-entering");
        }

        // Enter the new suffix, root first.
        for &idx in &new_path[keep..] {
            let node = &mut self.graph[idx];
            node.activation = Some(node.state.enter(ctx, &request.info));
            self.active.push(idx);
        }

        Ok(ctx.take_transition())
    }

    /// Transitions requested while a node is being torn down are dropped.
    fn discard_request(&self, ctx: &mut StateCtx<'_>, idx: NodeIndex, phase: &str) {
        if let Some(dropped) = ctx.take_transition() {
            log::warn!(
                "machine: `{}` requested `{}` while {phase}; ignored",
                self.graph[idx].path,
                dropped.target
            );
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    /// Offer `event` to each active node, root first.
    pub fn dispatch(
        &mut self,
        ctx: &mut StateCtx<'_>,
        event: &InputEvent,
    ) -> Result<(), MachineError> {
        let kind = event.kind();
        log::trace!("machine: {kind:?} at {}", self.current_path());

        for depth in 0..self.active.len() {
            let idx = self.active[depth];
            let node = &mut self.graph[idx];
            if !node.state.handles().contains(kind) {
                continue;
            }
            let Some(activation) = node.activation.as_mut() else {
                continue;
            };
            activation.on_event(ctx, event);
            if let Some(request) = ctx.take_transition() {
                return self.run_transition(ctx, request);
            }
        }
        Ok(())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    fn resolve(&self, path: &str) -> Option<NodeIndex> {
        self.by_path.get(path).copied()
    }

    /// Nodes from the root down to `idx`, inclusive.
    fn ancestry(&self, idx: NodeIndex) -> ActivePath {
        let mut chain = ActivePath::new();
        let mut current = Some(idx);
        while let Some(node) = current {
            chain.push(node);
            current = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .next();
        }
        chain.reverse();
        chain
    }

    /// Root-relative path of the active leaf, e.g. `select.crop.idle`.
    pub fn current_path(&self) -> &str {
        self.active
            .last()
            .map_or("", |&idx| self.graph[idx].path.as_str())
    }

    pub fn root(&self) -> StateRef<'_> {
        StateRef {
            machine: self,
            index: self.root,
        }
    }

    pub fn active_leaf(&self) -> Option<StateRef<'_>> {
        self.active.last().map(|&index| StateRef {
            machine: self,
            index,
        })
    }

    /// The active path as node handles, root first.
    pub fn active_path(&self) -> impl Iterator<Item = StateRef<'_>> {
        self.active.iter().map(|&index| StateRef {
            machine: self,
            index,
        })
    }

    /// Look up a node by root-relative path. `None` if it doesn't exist.
    pub fn state_descendant(&self, path: &str) -> Option<StateRef<'_>> {
        self.resolve(path).map(|index| StateRef {
            machine: self,
            index,
        })
    }

    pub fn is_active(&self, path: &str) -> bool {
        self.resolve(path)
            .is_some_and(|idx| self.active.contains(&idx))
    }

    /// Info the node at `path` was entered with, while it is active.
    pub fn info(&self, path: &str) -> Option<&StateInfo> {
        self.state_descendant(path)?.into_info()
    }

    /// Typed access to the activation of the node at `path`.
    pub fn activation<T: Activation>(&self, path: &str) -> Option<&T> {
        self.state_descendant(path)?.into_activation()
    }
}

fn validate_id(id: &str) -> Result<(), MachineError> {
    if id.is_empty() || id.contains('.') {
        return Err(MachineError::InvalidStateId { id: id.to_string() });
    }
    Ok(())
}

/// Read-only handle to one node of a `StateMachine`.
#[derive(Clone, Copy)]
pub struct StateRef<'a> {
    machine: &'a StateMachine,
    index: NodeIndex,
}

impl<'a> StateRef<'a> {
    fn node(&self) -> &'a StateNode {
        &self.machine.graph[self.index]
    }

    pub fn id(&self) -> &'a str {
        &self.node().id
    }

    /// Full path including the root id, e.g. `root.select.crop.idle`.
    pub fn path(&self) -> String {
        let root = &self.machine.graph[self.machine.root].id;
        let relative = &self.node().path;
        if relative.is_empty() {
            root.clone()
        } else {
            format!("{root}.{relative}")
        }
    }

    /// Root-relative path, as accepted by `transition_to`.
    pub fn relative_path(&self) -> &'a str {
        &self.node().path
    }

    pub fn is_active(&self) -> bool {
        self.node().activation.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.node().children.is_empty()
    }

    pub fn parent(&self) -> Option<StateRef<'a>> {
        self.machine
            .graph
            .neighbors_directed(self.index, Direction::Incoming)
            .next()
            .map(|index| StateRef {
                machine: self.machine,
                index,
            })
    }

    /// Children in declaration order.
    pub fn children(self) -> impl Iterator<Item = StateRef<'a>> + 'a {
        let machine = self.machine;
        self.node()
            .children
            .iter()
            .map(move |&index| StateRef { machine, index })
    }

    /// The active child, if this node is active and not a leaf.
    pub fn current(&self) -> Option<StateRef<'a>> {
        self.children().find(|c| c.is_active())
    }

    pub fn into_info(self) -> Option<&'a StateInfo> {
        self.node().activation.as_deref().map(|a| a.info())
    }

    pub fn into_activation<T: Activation>(self) -> Option<&'a T> {
        let activation: &'a dyn Activation = self.node().activation.as_deref()?;
        let any: &'a dyn Any = activation;
        any.downcast_ref::<T>()
    }
}

impl std::fmt::Debug for StateRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StateRef({})", self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::EventKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every hook call; optionally transitions on an event kind or
    /// right after entering.
    struct Recorder {
        name: &'static str,
        log: Log,
        handles: EventKinds,
        on_event_go: Option<&'static str>,
        on_enter_go: Option<&'static str>,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: log.clone(),
                handles: EventKinds::NONE,
                on_event_go: None,
                on_enter_go: None,
            }
        }

        fn handling(mut self, kinds: impl Into<EventKinds>) -> Self {
            self.handles = kinds.into();
            self
        }

        fn going_to(mut self, target: &'static str) -> Self {
            self.on_event_go = Some(target);
            self
        }

        fn bouncing_to(mut self, target: &'static str) -> Self {
            self.on_enter_go = Some(target);
            self
        }
    }

    struct RecorderActivation {
        name: &'static str,
        log: Log,
        info: StateInfo,
        go: Option<&'static str>,
    }

    impl State for Recorder {
        fn handles(&self) -> EventKinds {
            self.handles
        }

        fn enter(&self, ctx: &mut StateCtx<'_>, info: &StateInfo) -> Box<dyn Activation> {
            self.log.borrow_mut().push(format!("enter:{}", self.name));
            if let Some(target) = self.on_enter_go {
                ctx.transition(target, StateInfo::default());
            }
            Box::new(RecorderActivation {
                name: self.name,
                log: self.log.clone(),
                info: info.clone(),
                go: self.on_event_go,
            })
        }
    }

    impl Activation for RecorderActivation {
        fn info(&self) -> &StateInfo {
            &self.info
        }

        fn on_event(&mut self, ctx: &mut StateCtx<'_>, event: &InputEvent) {
            self.log
                .borrow_mut()
                .push(format!("event:{}:{:?}", self.name, event.kind()));
            if let Some(target) = self.go {
                ctx.transition(target, StateInfo::default());
            }
        }

        fn on_exit(self: Box<Self>, _ctx: &mut StateCtx<'_>) {
            self.log.borrow_mut().push(format!("exit:{}", self.name));
        }

        fn on_reenter(self: Box<Self>, _ctx: &mut StateCtx<'_>) {
            self.log.borrow_mut().push(format!("reenter:{}", self.name));
        }
    }

    struct Harness {
        store: Store,
        inputs: InputsState,
        cursor: Cursor,
        queue: VecDeque<InputEvent>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: Store::default(),
                inputs: InputsState::default(),
                cursor: Cursor::default(),
                queue: VecDeque::new(),
            }
        }

        fn ctx(&mut self) -> StateCtx<'_> {
            StateCtx::new(&mut self.store, &self.inputs, &mut self.cursor, &mut self.queue)
        }
    }

    //  root
    //  ├── a
    //  │   ├── x
    //  │   └── y
    //  └── b
    //      └── z
    fn tree(log: &Log) -> StateDef {
        StateDef::new("root", Recorder::new("root", log))
            .child(
                StateDef::new("a", Recorder::new("a", log))
                    .child(StateDef::new("x", Recorder::new("x", log)))
                    .child(StateDef::new("y", Recorder::new("y", log))),
            )
            .child(StateDef::new("b", Recorder::new("b", log)).child(StateDef::new("z", Recorder::new("z", log))))
    }

    fn started(log: &Log, h: &mut Harness) -> StateMachine {
        let mut machine = StateMachine::new(tree(log), 8).unwrap();
        machine.transition_to(&mut h.ctx(), "a.x", StateInfo::default()).unwrap();
        log.borrow_mut().clear();
        machine
    }

    fn take(log: &Log) -> Vec<String> {
        log.borrow_mut().drain(..).collect()
    }

    #[test]
    fn first_transition_enters_from_root() {
        let log = Log::default();
        let mut h = Harness::new();
        let mut machine = StateMachine::new(tree(&log), 8).unwrap();
        assert_eq!(machine.current_path(), "");
        machine.transition_to(&mut h.ctx(), "b", StateInfo::default()).unwrap();
        assert_eq!(take(&log), ["enter:root", "enter:b", "enter:z"]);
        assert_eq!(machine.current_path(), "b.z");
    }

    #[test]
    fn exits_leaf_first_then_enters() {
        let log = Log::default();
        let mut h = Harness::new();
        let mut machine = started(&log, &mut h);
        machine.transition_to(&mut h.ctx(), "b.z", StateInfo::default()).unwrap();
        assert_eq!(take(&log), ["exit:x", "exit:a", "enter:b", "enter:z"]);
    }

    #[test]
    fn sibling_transition_keeps_parent() {
        let log = Log::default();
        let mut h = Harness::new();
        let mut machine = started(&log, &mut h);
        machine.transition_to(&mut h.ctx(), "a.y", StateInfo::default()).unwrap();
        assert_eq!(take(&log), ["exit:x", "enter:y"]);
        assert!(machine.is_active("a"));
        assert!(machine.is_active("a.y"));
        assert!(!machine.is_active("a.x"));
    }

    #[test]
    fn exactly_one_child_active_per_level() {
        let log = Log::default();
        let mut h = Harness::new();
        let mut machine = started(&log, &mut h);
        for path in ["a.y", "b", "a", "a.y", "b.z"] {
            machine.transition_to(&mut h.ctx(), path, StateInfo::default()).unwrap();
            let mut node = Some(machine.root());
            while let Some(current) = node {
                let active = current.children().filter(|c| c.is_active()).count();
                if current.is_leaf() {
                    assert_eq!(active, 0);
                } else {
                    assert_eq!(active, 1, "under {}", current.path());
                }
                node = current.current();
            }
        }
    }

    #[test]
    fn invalid_transition_changes_nothing() {
        let log = Log::default();
        let mut h = Harness::new();
        let mut machine = started(&log, &mut h);
        let err = machine
            .transition_to(&mut h.ctx(), "a.nope", StateInfo::default())
            .unwrap_err();
        assert_eq!(
            err,
            MachineError::InvalidTransition {
                path: "a.nope".into()
            }
        );
        assert!(take(&log).is_empty());
        assert_eq!(machine.current_path(), "a.x");
    }

    #[test]
    fn reentering_leaf_replaces_activation_without_exit() {
        let log = Log::default();
        let mut h = Harness::new();
        let mut machine = started(&log, &mut h);
        let info = StateInfo {
            is_creating: true,
            ..StateInfo::default()
        };
        machine.transition_to(&mut h.ctx(), "a.x", info).unwrap();
        assert_eq!(take(&log), ["reenter:x", "enter:x"]);
        assert!(machine.info("a.x").unwrap().is_creating);
        assert!(!machine.info("a").unwrap().is_creating);
    }

    #[test]
    fn ancestor_transition_reenters_default_chain() {
        let log = Log::default();
        let mut h = Harness::new();
        let mut machine = started(&log, &mut h);
        machine.transition_to(&mut h.ctx(), "a.y", StateInfo::default()).unwrap();
        take(&log);
        machine.transition_to(&mut h.ctx(), "a", StateInfo::default()).unwrap();
        assert_eq!(take(&log), ["exit:y", "enter:x"]);
        assert_eq!(machine.current_path(), "a.x");
    }

    #[test]
    fn dispatch_runs_root_first() {
        let log = Log::default();
        let mut h = Harness::new();
        let tree = StateDef::new("root", Recorder::new("root", &log).handling(EventKind::KeyDown))
            .child(
                StateDef::new("mid", Recorder::new("mid", &log))
                    .child(StateDef::new("leaf", Recorder::new("leaf", &log).handling(EventKind::KeyDown))),
            );
        let mut machine = StateMachine::new(tree, 8).unwrap();
        machine.transition_to(&mut h.ctx(), "mid", StateInfo::default()).unwrap();
        take(&log);

        let event = InputEvent::key_down("k", Modifiers::NONE);
        machine.dispatch(&mut h.ctx(), &event).unwrap();
        assert_eq!(take(&log), ["event:root:KeyDown", "event:leaf:KeyDown"]);

        // Not registered anywhere: silently dropped.
        machine.dispatch(&mut h.ctx(), &InputEvent::Complete).unwrap();
        assert!(take(&log).is_empty());
    }

    #[test]
    fn root_transition_truncates_propagation() {
        let log = Log::default();
        let mut h = Harness::new();
        let tree = StateDef::new(
            "root",
            Recorder::new("root", &log)
                .handling(EventKind::KeyDown)
                .going_to("other"),
        )
        .child(
            StateDef::new("mid", Recorder::new("mid", &log))
                .child(StateDef::new("leaf", Recorder::new("leaf", &log).handling(EventKind::KeyDown))),
        )
        .child(StateDef::new("other", Recorder::new("other", &log)));
        let mut machine = StateMachine::new(tree, 8).unwrap();
        machine.transition_to(&mut h.ctx(), "mid.leaf", StateInfo::default()).unwrap();
        take(&log);

        machine
            .dispatch(&mut h.ctx(), &InputEvent::key_down("k", Modifiers::NONE))
            .unwrap();
        assert_eq!(
            take(&log),
            ["event:root:KeyDown", "exit:leaf", "exit:mid", "enter:other"]
        );
        assert_eq!(machine.current_path(), "other");
    }

    #[test]
    fn enter_hook_chains_transition() {
        let log = Log::default();
        let mut h = Harness::new();
        let tree = StateDef::new("root", Recorder::new("root", &log))
            .child(StateDef::new("start", Recorder::new("start", &log)))
            .child(StateDef::new("hop", Recorder::new("hop", &log).bouncing_to("land")))
            .child(StateDef::new("land", Recorder::new("land", &log)));
        let mut machine = StateMachine::new(tree, 8).unwrap();
        machine.transition_to(&mut h.ctx(), "start", StateInfo::default()).unwrap();
        take(&log);

        machine.transition_to(&mut h.ctx(), "hop", StateInfo::default()).unwrap();
        assert_eq!(take(&log), ["exit:start", "enter:hop", "exit:hop", "enter:land"]);
        assert_eq!(machine.current_path(), "land");
    }

    #[test]
    fn endless_chain_is_a_loop_error() {
        let log = Log::default();
        let mut h = Harness::new();
        let tree = StateDef::new("root", Recorder::new("root", &log))
            .child(StateDef::new("ping", Recorder::new("ping", &log).bouncing_to("pong")))
            .child(StateDef::new("pong", Recorder::new("pong", &log).bouncing_to("ping")));
        let mut machine = StateMachine::new(tree, 4).unwrap();
        let err = machine
            .transition_to(&mut h.ctx(), "ping", StateInfo::default())
            .unwrap_err();
        assert_eq!(err, MachineError::TransitionLoop { limit: 4 });
    }

    #[test]
    fn build_errors() {
        let log = Log::default();
        assert!(matches!(
            StateMachine::new(StateDef::new("root", Recorder::new("root", &log)), 8),
            Err(MachineError::EmptyTree { .. })
        ));
        let dup = StateDef::branch("root")
            .child(StateDef::branch("a"))
            .child(StateDef::branch("a"));
        assert_eq!(
            StateMachine::new(dup, 8).err(),
            Some(MachineError::DuplicateState { path: "a".into() })
        );
        let dotted = StateDef::branch("root").child(StateDef::branch("a.b"));
        assert!(matches!(
            StateMachine::new(dotted, 8),
            Err(MachineError::InvalidStateId { .. })
        ));
    }

    #[test]
    fn lookups() {
        let log = Log::default();
        let mut h = Harness::new();
        let machine = started(&log, &mut h);
        let leaf = machine.active_leaf().unwrap();
        assert_eq!(leaf.id(), "x");
        assert_eq!(leaf.path(), "root.a.x");
        assert_eq!(leaf.parent().unwrap().relative_path(), "a");
        assert!(machine.state_descendant("b.z").is_some());
        assert!(machine.state_descendant("b.q").is_none());
        assert!(machine.info("b").is_none());
        assert!(machine.activation::<RecorderActivation>("a.x").is_some());
        assert!(machine.activation::<Passive>("a.x").is_none());
        let ids: Vec<_> = machine.root().children().map(|c| c.id()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
