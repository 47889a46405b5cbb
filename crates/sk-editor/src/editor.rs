//! The `Editor` facade: owns the store, input state, cursor and state
//! machine, and feeds events through them one at a time.

use crate::config::{ConfigError, EditorConfig};
use crate::cursor::Cursor;
use crate::input::{InputEvent, InputsState};
use crate::machine::{Activation, MachineError, StateCtx, StateDef, StateInfo, StateMachine};
use crate::states::default_tree;
use sk_core::Store;
use std::collections::VecDeque;

/// Why an `Editor` could not be built.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Machine(#[from] MachineError),
}

pub struct Editor {
    store: Store,
    inputs: InputsState,
    cursor: Cursor,
    /// Follow-up events raised by handlers, drained after the current one.
    queue: VecDeque<InputEvent>,
    machine: StateMachine,
    config: EditorConfig,
}

impl Editor {
    /// An editor over an empty document with the built-in states.
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        let store = Store::new(config.max_history);
        Self::with_store(store, config)
    }

    pub fn with_store(store: Store, config: EditorConfig) -> Result<Self, EditorError> {
        Self::with_tree(default_tree(), store, config)
    }

    /// An editor running a custom state tree. The config is validated first.
    pub fn with_tree(
        tree: StateDef,
        store: Store,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        let machine = StateMachine::new(tree, config.max_transition_chain)?;
        let mut editor = Self {
            store,
            inputs: InputsState::default(),
            cursor: Cursor::default(),
            queue: VecDeque::new(),
            machine,
            config,
        };
        let initial = editor.config.initial_state.clone();
        editor.transition_to(&initial, StateInfo::default())?;
        Ok(editor)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Dispatch `event` and everything it queues, in order.
    ///
    /// On error the remaining queued events are dropped.
    pub fn dispatch(&mut self, event: InputEvent) -> Result<(), MachineError> {
        self.queue.push_back(event);
        self.drain_queue()
    }

    pub fn transition_to(&mut self, path: &str, info: StateInfo) -> Result<(), MachineError> {
        let mut ctx = StateCtx::new(
            &mut self.store,
            &self.inputs,
            &mut self.cursor,
            &mut self.queue,
        );
        self.machine.transition_to(&mut ctx, path, info)?;
        self.drain_queue()
    }

    fn drain_queue(&mut self) -> Result<(), MachineError> {
        let drag_distance = self.config.drag_distance_squared();
        while let Some(event) = self.queue.pop_front() {
            self.inputs.update(&event, drag_distance);
            let mut ctx = StateCtx::new(
                &mut self.store,
                &self.inputs,
                &mut self.cursor,
                &mut self.queue,
            );
            if let Err(err) = self.machine.dispatch(&mut ctx, &event) {
                self.queue.clear();
                return Err(err);
            }
        }
        Ok(())
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Direct store access for changes made outside any interaction.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn inputs(&self) -> &InputsState {
        &self.inputs
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ─── State queries ───────────────────────────────────────────────────

    /// Root-relative path of the active leaf.
    pub fn current_path(&self) -> &str {
        self.machine.current_path()
    }

    pub fn is_active(&self, path: &str) -> bool {
        self.machine.is_active(path)
    }

    pub fn info(&self, path: &str) -> Option<&StateInfo> {
        self.machine.info(path)
    }

    pub fn activation<T: Activation>(&self, path: &str) -> Option<&T> {
        self.machine.activation(path)
    }

    /// Whether the current resize is sizing a shape that was just created.
    pub fn is_creating_shape(&self) -> bool {
        self.info("select.resizing")
            .is_some_and(|info| info.is_creating)
    }
}
