use crate::store::ItemId;
use crate::store::mutation::{Ack, Request};

/// Failure reported by the persistence backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("item {0} does not exist on the server")]
    NotFound(ItemId),
    #[error("server rejected the request: {0}")]
    Rejected(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("create acknowledged without an id")]
    MissingId,
}

/// External persistence API for one collection
pub trait Remote<T> {
    /// Store a new item and return the id assigned to it
    fn create(&mut self, item: &T) -> Result<ItemId, RemoteError>;

    fn update(&mut self, id: ItemId, item: &T) -> Result<(), RemoteError>;

    fn delete(&mut self, id: ItemId) -> Result<(), RemoteError>;

    /// Persist a new display order; ids missing from `order` keep their
    /// relative order after the listed ones
    fn reorder(&mut self, order: &[ItemId]) -> Result<(), RemoteError>;

    fn execute(&mut self, request: &Request<T>) -> Result<Ack, RemoteError> {
        match request {
            Request::Create { item } => self.create(item).map(Ack::Created),
            Request::Update { id, item } => self.update(*id, item).map(|()| Ack::Done),
            Request::Delete { id } => self.delete(*id).map(|()| Ack::Done),
            Request::Reorder { order } => self.reorder(order).map(|()| Ack::Done),
        }
    }
}
