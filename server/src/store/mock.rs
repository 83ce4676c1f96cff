use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use crate::errors::BackendError;
use crate::store::Store;

/// An in-memory store for tests.
#[derive(Default)]
pub struct MockStore {
    pub map: RwLock<HashMap<Uuid, Vec<u8>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Store for MockStore {
    fn save(&self, key: &Uuid, _file_name: String, raw: Vec<u8>) -> BoxFuture<Result<(), BackendError>> {
        let key = *key;

        async move {
            self.map.write().unwrap().insert(key, raw);

            Ok(())
        }
        .boxed()
    }
}
