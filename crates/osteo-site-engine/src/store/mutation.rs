use std::fmt;

use uuid::Uuid;

use crate::store::remote::RemoteError;
use crate::store::{ItemId, ItemKey};

/// Handle on one in-flight optimistic mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub(crate) Uuid);

impl Ticket {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The external write matching a local optimistic change
#[derive(Debug, Clone, PartialEq)]
pub enum Request<T> {
    Create { item: T },
    Update { id: ItemId, item: T },
    Delete { id: ItemId },
    /// Full order of saved ids after the move
    Reorder { order: Vec<ItemId> },
}

/// Successful backend acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// A create was stored under this id
    Created(ItemId),
    Done,
}

/// Lifecycle of a mutation: `Pending` moves to exactly one final state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack(RemoteError),
}

impl MutationState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, MutationState::Pending)
    }
}

/// What a mutation changed locally, enough to reverse it
#[derive(Debug, Clone)]
pub(crate) enum Change<T> {
    Create {
        key: Uuid,
    },
    Update {
        id: ItemId,
        previous: T,
    },
    Delete {
        id: ItemId,
        previous: T,
        index: usize,
        /// Neighbours at delete time; `None` when the item was first or last
        predecessor: Option<ItemKey>,
        successor: Option<ItemKey>,
    },
    Reorder {
        from: usize,
        to: usize,
        previous: Vec<ItemKey>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Mutation<T> {
    pub(crate) change: Change<T>,
    pub(crate) state: MutationState,
    /// Order in which mutations were begun
    pub(crate) seq: u64,
}

/// Inverse of a committed mutation, replayable through `Store::undo`
#[derive(Debug, Clone, PartialEq)]
pub enum Undo<T> {
    /// Bring back a deleted item at its former position
    Recreate { item: T, index: usize },
    /// Put back the value an update replaced
    Restore { id: ItemId, item: T },
    /// Remove an item that was created
    Remove { id: ItemId },
    /// Move an item back where it came from
    Reorder { from: usize, to: usize },
}

/// Result of settling a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Committed {
        /// Key of the affected item after commit; `None` for reorders
        key: Option<ItemKey>,
        undo: Undo<T>,
    },
    RolledBack {
        error: RemoteError,
    },
}

impl<T> Outcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }
}
