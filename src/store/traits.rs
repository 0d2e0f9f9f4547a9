use super::records::{ClientRecord, ProgressPhoto};
use crate::error::StoreError;
use crate::media::ImagePayload;
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Consumer-side contract for the managed document store.
///
/// Create/read/update/delete only; identity, durability, and consistency are
/// the backend's business. Listings come back newest-first, the one ordering
/// rule this side owns.
pub trait RecordStore: Send + Sync {
    fn put_client<'a>(&'a self, record: ClientRecord) -> StoreFuture<'a, ()>;

    fn get_client<'a>(&'a self, id: Uuid) -> StoreFuture<'a, ClientRecord>;

    /// All clients, ordered by creation time descending.
    fn list_clients<'a>(&'a self) -> StoreFuture<'a, Vec<ClientRecord>>;

    fn delete_client<'a>(&'a self, id: Uuid) -> StoreFuture<'a, ()>;

    fn put_photo<'a>(&'a self, photo: ProgressPhoto) -> StoreFuture<'a, ()>;

    /// One client's progress photos, ordered by creation time descending.
    fn list_photos<'a>(&'a self, client_id: Uuid) -> StoreFuture<'a, Vec<ProgressPhoto>>;
}

/// Consumer-side contract for the managed object store: hand over an image,
/// get back a retrievable URL.
pub trait MediaStore: Send + Sync {
    fn upload<'a>(&'a self, path: &'a str, image: &'a ImagePayload) -> StoreFuture<'a, String>;
}
