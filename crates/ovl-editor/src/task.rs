//! Single-in-flight guard for asynchronous scene operations.
//!
//! Cloning a node and deserializing a scene are delegated to the scene
//! capability and come back later as a `Completion`. Each kind of task may
//! have at most one request outstanding; the ticket handed out at `begin`
//! is the only one `finish` accepts, so a late completion from a superseded
//! request can never mutate state.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Deep copy of one node, for duplication.
    Clone,
    /// Scene restore from a history snapshot.
    Restore,
    /// Programmatic load of a serialized scene.
    Load,
}

/// Receipt for one outstanding task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskTicket {
    pub kind: TaskKind,
    seq: u64,
}

/// Tracks outstanding tasks, each carrying the context `T` needed to finish it.
#[derive(Debug)]
pub struct TaskGuard<T> {
    next_seq: u64,
    in_flight: HashMap<TaskKind, (u64, T)>,
}

impl<T> TaskGuard<T> {
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            in_flight: HashMap::new(),
        }
    }

    /// Start a task. Returns `None` while another task of the same kind is
    /// outstanding.
    pub fn begin(&mut self, kind: TaskKind, context: T) -> Option<TaskTicket> {
        if self.in_flight.contains_key(&kind) {
            return None;
        }
        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight.insert(kind, (seq, context));
        Some(TaskTicket { kind, seq })
    }

    /// Close the task `ticket` refers to and hand back its context.
    /// Stale or unknown tickets yield `None` and leave the guard untouched.
    pub fn finish(&mut self, ticket: TaskTicket) -> Option<T> {
        let current = self.in_flight.get(&ticket.kind).map(|(seq, _)| *seq);
        if current != Some(ticket.seq) {
            return None;
        }
        self.in_flight.remove(&ticket.kind).map(|(_, context)| context)
    }

    pub fn is_busy(&self, kind: TaskKind) -> bool {
        self.in_flight.contains_key(&kind)
    }

    /// True while the scene is being replaced wholesale; edits must wait.
    pub fn blocks_edits(&self) -> bool {
        self.is_busy(TaskKind::Restore) || self.is_busy(TaskKind::Load)
    }

    /// Forget every outstanding task. Their completions become stale.
    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}

impl<T> Default for TaskGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}
