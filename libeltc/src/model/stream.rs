//! Replay-latest state stream
//!
//! [`StateBus`] holds the current [`AppState`] and a list of subscribers. A
//! new subscriber first receives the current state, then every state emitted
//! afterwards, in emission order. Each subscriber has its own unbounded
//! queue, so a slow subscriber never loses or coalesces states and never
//! blocks the emitter.
//!
//! # Generations
//!
//! Every action that supersedes earlier work takes a new [`Generation`].
//! Asynchronous work remembers the generation it started under and emits
//! through [`StateBus::emit_if_current`], which drops the state if a newer
//! generation has started in the meantime. The check and the emission happen
//! under one lock, so a stale result can never slip in after a newer state.
//!
//! # Example
//!
//! ```
//! use libeltc::app::AppState;
//! use libeltc::model::stream::StateBus;
//!
//! let bus = StateBus::new(AppState::Initial);
//! let mut receiver = bus.subscribe();
//!
//! let generation = bus.replace(AppState::LoadingBuilds);
//! assert!(bus.emit_if_current(generation, AppState::login()));
//!
//! assert_eq!(
//!     receiver.drain(),
//!     vec![AppState::Initial, AppState::LoadingBuilds, AppState::login()]
//! );
//! ```

use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::app::AppState;

/// Token identifying the action that started a piece of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

struct Inner {
    current: AppState,
    generation: u64,
    subscribers: Vec<mpsc::UnboundedSender<AppState>>,
}

impl Inner {
    fn next_generation(&mut self) -> Generation {
        self.generation += 1;
        Generation(self.generation)
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation.0
    }

    fn publish(&mut self, state: AppState) {
        // Receivers that were dropped are pruned here
        self.subscribers
            .retain(|subscriber| subscriber.send(state.clone()).is_ok());
        self.current = state;
    }
}

/// Replay-latest broadcast of application states
pub struct StateBus {
    inner: Mutex<Inner>,
}

impl StateBus {
    pub fn new(initial: AppState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: initial,
                generation: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Subscribe to states, starting with the current one
    pub fn subscribe(&self) -> StateReceiver {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        // Cannot fail: the receiver is still in scope
        let _ = sender.send(inner.current.clone());
        inner.subscribers.push(sender);
        StateReceiver { receiver }
    }

    /// Latest emitted state
    pub fn current(&self) -> AppState {
        self.lock().current.clone()
    }

    /// Start a new generation without emitting anything
    pub fn begin(&self) -> Generation {
        self.lock().next_generation()
    }

    /// Start a new generation and emit `state` as its first state
    pub fn replace(&self, state: AppState) -> Generation {
        let mut inner = self.lock();
        let generation = inner.next_generation();
        inner.publish(state);
        generation
    }

    /// Whether `generation` is still the latest one
    pub fn is_current(&self, generation: Generation) -> bool {
        self.lock().is_current(generation)
    }

    /// Emit `state` if `generation` is still the latest one
    ///
    /// Returns `false` (and emits nothing) for a superseded generation.
    pub fn emit_if_current(&self, generation: Generation, state: AppState) -> bool {
        let mut inner = self.lock();
        if !inner.is_current(generation) {
            return false;
        }
        inner.publish(state);
        true
    }

    /// Derive a new state from the current one
    ///
    /// When `f` returns `Some`, a new generation starts and the state is
    /// emitted. When it returns `None`, nothing changes.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&AppState) -> Option<AppState>,
    {
        let mut inner = self.lock();
        match f(&inner.current) {
            Some(state) => {
                inner.next_generation();
                inner.publish(state);
                true
            }
            None => false,
        }
    }

    /// Number of live subscribers as of the last emission
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving half of a [`StateBus`] subscription
///
/// Also usable as a `futures::Stream` of states. The stream ends when the bus
/// is dropped.
#[derive(Debug)]
pub struct StateReceiver {
    receiver: mpsc::UnboundedReceiver<AppState>,
}

impl StateReceiver {
    /// Wait for the next state
    ///
    /// Returns `None` once the bus is gone and every queued state was read.
    pub async fn recv(&mut self) -> Option<AppState> {
        self.receiver.recv().await
    }

    /// Take the next queued state without waiting
    pub fn try_recv(&mut self) -> Option<AppState> {
        self.receiver.try_recv().ok()
    }

    /// Take every queued state without waiting
    pub fn drain(&mut self) -> Vec<AppState> {
        let mut states = Vec::new();
        while let Some(state) = self.try_recv() {
            states.push(state);
        }
        states
    }
}

impl Stream for StateReceiver {
    type Item = AppState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
