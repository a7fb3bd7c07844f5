//! Bounded queue of pending editor commands.
//!
//! Editors that run on their own schedule (input handlers, scripted
//! scenarios) push commands here; the simulation applies them in arrival
//! order at the start of the next tick, followed by a single replan.
//!
//! ```rust
//! use hex_trainz::queue::EditQueue;
//! use hex_trainz::EditorCommand;
//! use hex_trainz::TrainId;
//!
//! let mut queue: EditQueue<2> = EditQueue::new();
//! assert!(queue.push(EditorCommand::ToggleLoop { train: TrainId(1) }));
//! assert!(queue.push(EditorCommand::ToggleLoop { train: TrainId(2) }));
//!
//! // Full: the newest command is refused
//! assert!(!queue.push(EditorCommand::ToggleLoop { train: TrainId(3) }));
//!
//! // First in, first out
//! assert_eq!(queue.pop(), Some(EditorCommand::ToggleLoop { train: TrainId(1) }));
//! ```

use heapless::Deque;

use crate::commands::EditorCommand;

/// Default capacity used by [`Simulation`](crate::Simulation).
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// FIFO of editor commands with fixed capacity `N`.
///
/// When full, new commands are rejected; queued ones are never displaced.
#[derive(Debug)]
pub struct EditQueue<const N: usize> {
    items: Deque<EditorCommand, N>,
}

impl<const N: usize> EditQueue<N> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: Deque::new(),
        }
    }

    /// Queues a command. Returns false if the queue is full.
    #[must_use]
    pub fn push(&mut self, cmd: EditorCommand) -> bool {
        self.items.push_back(cmd).is_ok()
    }

    /// Takes the oldest command.
    pub fn pop(&mut self) -> Option<EditorCommand> {
        self.items.pop_front()
    }

    /// Oldest command without removing it.
    pub fn peek(&self) -> Option<&EditorCommand> {
        self.items.front()
    }

    /// Removes every queued command, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = EditorCommand> + '_ {
        core::iter::from_fn(move || self.items.pop_front())
    }

    /// Drops every queued command.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the number of queued commands.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if the queue is at capacity.
    pub fn is_full(&self) -> bool {
        self.items.is_full()
    }
}

impl<const N: usize> Default for EditQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
