//! In-process store backing tests and local development.

use super::records::{ClientRecord, ProgressPhoto};
use super::traits::{MediaStore, RecordStore};
use crate::error::StoreError;
use crate::media::ImagePayload;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    clients: Mutex<HashMap<Uuid, ClientRecord>>,
    photos: Mutex<Vec<ProgressPhoto>>,
    objects: Mutex<HashMap<String, ImagePayload>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

impl RecordStore for MemoryStore {
    fn put_client<'a>(&'a self, record: ClientRecord) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.clients
                .lock()
                .expect("client map lock poisoned")
                .insert(record.id, record);
            Ok(())
        })
    }

    fn get_client<'a>(&'a self, id: Uuid) -> StoreFuture<'a, ClientRecord> {
        Box::pin(async move {
            self.clients
                .lock()
                .expect("client map lock poisoned")
                .get(&id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
    }

    fn list_clients<'a>(&'a self) -> StoreFuture<'a, Vec<ClientRecord>> {
        Box::pin(async move {
            let mut clients: Vec<ClientRecord> = self
                .clients
                .lock()
                .expect("client map lock poisoned")
                .values()
                .cloned()
                .collect();
            clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(clients)
        })
    }

    fn delete_client<'a>(&'a self, id: Uuid) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.clients
                .lock()
                .expect("client map lock poisoned")
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
    }

    fn put_photo<'a>(&'a self, photo: ProgressPhoto) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.photos
                .lock()
                .expect("photo list lock poisoned")
                .push(photo);
            Ok(())
        })
    }

    fn list_photos<'a>(&'a self, client_id: Uuid) -> StoreFuture<'a, Vec<ProgressPhoto>> {
        Box::pin(async move {
            let mut photos: Vec<ProgressPhoto> = self
                .photos
                .lock()
                .expect("photo list lock poisoned")
                .iter()
                .filter(|photo| photo.client_id == client_id)
                .cloned()
                .collect();
            photos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(photos)
        })
    }
}

impl MediaStore for MemoryStore {
    fn upload<'a>(&'a self, path: &'a str, image: &'a ImagePayload) -> StoreFuture<'a, String> {
        Box::pin(async move {
            self.objects
                .lock()
                .expect("object map lock poisoned")
                .insert(path.to_string(), image.clone());
            Ok(format!("memory://{path}"))
        })
    }
}
