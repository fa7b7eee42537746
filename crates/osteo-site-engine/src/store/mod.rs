//! Optimistic collections for the backoffice.
//!
//! A [`Store`] owns one ordered collection (images, partners, posts,
//! testimonials or pages). Each `begin_*` entry point applies its change
//! locally straight away and hands back the [`Request`] the caller must send
//! to the backend. Once the backend answers, [`Store::settle`] either
//! commits the change, replacing temporary keys with server ids, or rolls
//! it back exactly once. A committed change yields an [`Undo`] that can be
//! replayed with [`Store::undo`].

pub mod mutation;
pub mod record;
pub mod remote;

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use uuid::Uuid;

pub use mutation::{Ack, MutationState, Outcome, Request, Ticket, Undo};
pub use record::{Record, ValidationError};
pub use remote::{Remote, RemoteError};

use mutation::{Change, Mutation};

/// Server-assigned identifier
pub type ItemId = i64;

/// Key of an entry: server id once saved, temporary id while a create is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Saved(ItemId),
    Pending(Uuid),
}

impl ItemKey {
    pub fn saved_id(self) -> Option<ItemId> {
        match self {
            ItemKey::Saved(id) => Some(id),
            ItemKey::Pending(_) => None,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Saved(id) => write!(f, "{id}"),
            ItemKey::Pending(key) => write!(f, "pending:{key}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub key: ItemKey,
    pub item: T,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("invalid value, {0}")]
    Invalid(#[from] ValidationError),
    #[error("{label} {id} not found")]
    NotFound { label: &'static str, id: ItemId },
    #[error("position {index} is out of range for {len} items")]
    OutOfRange { index: usize, len: usize },
    #[error("unknown mutation {0}")]
    UnknownTicket(Ticket),
    #[error("mutation {0} is already settled")]
    AlreadySettled(Ticket),
}

/// Owned, single-writer collection with optimistic mutations
#[derive(Debug, Clone)]
pub struct Store<T: Record> {
    entries: Vec<Entry<T>>,
    mutations: HashMap<Ticket, Mutation<T>>,
    next_seq: u64,
    /// Sequence number of the latest update begun on each saved id
    last_write: HashMap<ItemId, u64>,
}

impl<T: Record> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Store<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            mutations: HashMap::new(),
            next_seq: 0,
            last_write: HashMap::new(),
        }
    }

    /// Build a store from already persisted items, keeping their order
    pub fn from_saved(items: impl IntoIterator<Item = (ItemId, T)>) -> Self {
        Self {
            entries: items
                .into_iter()
                .map(|(id, item)| Entry {
                    key: ItemKey::Saved(id),
                    item,
                })
                .collect(),
            ..Self::new()
        }
    }

    // ============ selectors ============

    pub fn items(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    pub fn get(&self, key: ItemKey) -> Option<&T> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.item)
    }

    pub fn get_saved(&self, id: ItemId) -> Option<&T> {
        self.get(ItemKey::Saved(id))
    }

    pub fn position(&self, key: ItemKey) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self, ticket: Ticket) -> Option<&MutationState> {
        self.mutations.get(&ticket).map(|mutation| &mutation.state)
    }

    /// Number of mutations still waiting for the backend
    pub fn pending_count(&self) -> usize {
        self.mutations
            .values()
            .filter(|mutation| !mutation.state.is_settled())
            .count()
    }

    /// Forget the bookkeeping of settled mutations
    pub fn prune_settled(&mut self) {
        self.mutations
            .retain(|_, mutation| !mutation.state.is_settled());
    }

    // ============ actions ============

    fn record(&mut self, change: Change<T>) -> Ticket {
        let ticket = Ticket::new();
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Change::Update { id, .. } = &change {
            self.last_write.insert(*id, seq);
        }
        self.mutations.insert(
            ticket,
            Mutation {
                change,
                state: MutationState::Pending,
                seq,
            },
        );
        ticket
    }

    fn saved_position(&self, id: ItemId) -> Result<usize, StoreError> {
        self.position(ItemKey::Saved(id))
            .ok_or(StoreError::NotFound { label: T::LABEL, id })
    }

    /// Append a new item under a temporary key
    pub fn begin_create(&mut self, item: T) -> Result<(Ticket, Request<T>), StoreError> {
        let index = self.entries.len();
        self.begin_create_at(item, index)
    }

    /// Insert a new item at `index` (clamped to the end) under a temporary key
    pub fn begin_create_at(
        &mut self,
        item: T,
        index: usize,
    ) -> Result<(Ticket, Request<T>), StoreError> {
        item.validate()?;

        let key = Uuid::new_v4();
        let index = index.min(self.entries.len());
        self.entries.insert(
            index,
            Entry {
                key: ItemKey::Pending(key),
                item: item.clone(),
            },
        );
        let ticket = self.record(Change::Create { key });
        debug!("{} create {ticket} pending at {index}", T::LABEL);
        Ok((ticket, Request::Create { item }))
    }

    pub fn begin_update(&mut self, id: ItemId, item: T) -> Result<(Ticket, Request<T>), StoreError> {
        item.validate()?;

        let index = self.saved_position(id)?;
        let previous = std::mem::replace(&mut self.entries[index].item, item.clone());
        let ticket = self.record(Change::Update { id, previous });
        debug!("{} {id} update {ticket} pending", T::LABEL);
        Ok((ticket, Request::Update { id, item }))
    }

    pub fn begin_delete(&mut self, id: ItemId) -> Result<(Ticket, Request<T>), StoreError> {
        let index = self.saved_position(id)?;
        let predecessor = index.checked_sub(1).map(|before| self.entries[before].key);
        let successor = self.entries.get(index + 1).map(|entry| entry.key);
        let previous = self.entries.remove(index).item;
        let ticket = self.record(Change::Delete {
            id,
            previous,
            index,
            predecessor,
            successor,
        });
        debug!("{} {id} delete {ticket} pending", T::LABEL);
        Ok((ticket, Request::Delete { id }))
    }

    /// Move the entry at `from` so it ends up at `to`
    pub fn begin_reorder(
        &mut self,
        from: usize,
        to: usize,
    ) -> Result<(Ticket, Request<T>), StoreError> {
        let len = self.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::OutOfRange { index, len });
            }
        }

        let previous = self.entries.iter().map(|entry| entry.key).collect();
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);

        let order = self
            .entries
            .iter()
            .filter_map(|entry| entry.key.saved_id())
            .collect();
        let ticket = self.record(Change::Reorder { from, to, previous });
        debug!("{} reorder {from} -> {to} ({ticket}) pending", T::LABEL);
        Ok((ticket, Request::Reorder { order }))
    }

    /// Begin the inverse of a committed mutation
    pub fn undo(&mut self, undo: Undo<T>) -> Result<(Ticket, Request<T>), StoreError> {
        match undo {
            Undo::Recreate { item, index } => self.begin_create_at(item, index),
            Undo::Restore { id, item } => self.begin_update(id, item),
            Undo::Remove { id } => self.begin_delete(id),
            Undo::Reorder { from, to } => self.begin_reorder(from, to),
        }
    }

    /// Resolve a pending mutation with the backend's answer
    pub fn settle(
        &mut self,
        ticket: Ticket,
        result: Result<Ack, RemoteError>,
    ) -> Result<Outcome<T>, StoreError> {
        let mutation = self
            .mutations
            .get(&ticket)
            .ok_or(StoreError::UnknownTicket(ticket))?;
        if mutation.state.is_settled() {
            return Err(StoreError::AlreadySettled(ticket));
        }
        let change = mutation.change.clone();
        let seq = mutation.seq;

        let (state, outcome) = match result.and_then(|ack| self.commit(&change, ack)) {
            Ok((key, undo)) => (MutationState::Committed, Outcome::Committed { key, undo }),
            Err(error) => {
                warn!("{} mutation {ticket} failed, rolling back: {error}", T::LABEL);
                self.roll_back(change, seq);
                (
                    MutationState::RolledBack(error.clone()),
                    Outcome::RolledBack { error },
                )
            }
        };

        if let Some(mutation) = self.mutations.get_mut(&ticket) {
            mutation.state = state;
        }
        Ok(outcome)
    }

    fn commit(
        &mut self,
        change: &Change<T>,
        ack: Ack,
    ) -> Result<(Option<ItemKey>, Undo<T>), RemoteError> {
        let committed = match change {
            Change::Create { key } => {
                let Ack::Created(id) = ack else {
                    return Err(RemoteError::MissingId);
                };
                let pending = ItemKey::Pending(*key);
                if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == pending) {
                    entry.key = ItemKey::Saved(id);
                }
                for mutation in self.mutations.values_mut() {
                    if let Change::Delete {
                        predecessor,
                        successor,
                        ..
                    } = &mut mutation.change
                    {
                        for neighbour in [predecessor, successor].into_iter().flatten() {
                            if *neighbour == pending {
                                *neighbour = ItemKey::Saved(id);
                            }
                        }
                    }
                }
                (Some(ItemKey::Saved(id)), Undo::Remove { id })
            }
            Change::Update { id, previous } => (
                Some(ItemKey::Saved(*id)),
                Undo::Restore {
                    id: *id,
                    item: previous.clone(),
                },
            ),
            Change::Delete {
                id,
                previous,
                index,
                ..
            } => (
                Some(ItemKey::Saved(*id)),
                Undo::Recreate {
                    item: previous.clone(),
                    index: *index,
                },
            ),
            Change::Reorder { from, to, .. } => (
                None,
                Undo::Reorder {
                    from: *to,
                    to: *from,
                },
            ),
        };
        Ok(committed)
    }

    fn roll_back(&mut self, change: Change<T>, seq: u64) {
        match change {
            Change::Create { key } => {
                self.entries.retain(|entry| entry.key != ItemKey::Pending(key));
            }
            Change::Update { id, previous } => {
                if let Some(later) = self.later_snapshot(id, seq) {
                    debug!(
                        "{} {id}: later pending change now restores the pre-update value",
                        T::LABEL
                    );
                    *later = previous;
                } else if self.last_write.get(&id) == Some(&seq)
                    && let Some(index) = self.position(ItemKey::Saved(id))
                {
                    self.entries[index].item = previous;
                }
            }
            Change::Delete {
                id,
                previous,
                index,
                predecessor,
                successor,
            } => {
                let index = self.reinsert_index(predecessor, successor, index);
                self.entries.insert(
                    index,
                    Entry {
                        key: ItemKey::Saved(id),
                        item: previous,
                    },
                );
            }
            Change::Reorder { previous, .. } => {
                let rank = |key: &ItemKey| {
                    previous
                        .iter()
                        .position(|candidate| candidate == key)
                        .unwrap_or(usize::MAX)
                };
                self.entries.sort_by_key(|entry| rank(&entry.key));
            }
        }
    }

    /// Prior value held by the earliest pending update or delete of `id`
    /// begun after `seq`
    fn later_snapshot(&mut self, id: ItemId, seq: u64) -> Option<&mut T> {
        self.mutations
            .values_mut()
            .filter(|mutation| mutation.seq > seq && !mutation.state.is_settled())
            .filter_map(|mutation| match &mut mutation.change {
                Change::Update {
                    id: other,
                    previous,
                }
                | Change::Delete {
                    id: other,
                    previous,
                    ..
                } if *other == id => Some((mutation.seq, previous)),
                _ => None,
            })
            .min_by_key(|(later, _)| *later)
            .map(|(_, previous)| previous)
    }

    /// Where a rolled back delete goes: after its old predecessor, else
    /// before its old successor, else the recorded index
    fn reinsert_index(
        &self,
        predecessor: Option<ItemKey>,
        successor: Option<ItemKey>,
        index: usize,
    ) -> usize {
        let Some(predecessor) = predecessor else {
            return 0;
        };
        if let Some(position) = self.position(predecessor) {
            return position + 1;
        }
        match successor {
            None => self.entries.len(),
            Some(successor) => self
                .position(successor)
                .unwrap_or_else(|| index.min(self.entries.len())),
        }
    }

    /// Begin a mutation, send it through `remote`, then settle it
    pub fn run<R, F>(&mut self, remote: &mut R, begin: F) -> Result<Outcome<T>, StoreError>
    where
        R: Remote<T>,
        F: FnOnce(&mut Self) -> Result<(Ticket, Request<T>), StoreError>,
    {
        let (ticket, request) = begin(self)?;
        let result = remote.execute(&request);
        self.settle(ticket, result)
    }
}
