use std::path::PathBuf;

use futures::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use crate::errors::BackendError;

pub mod mock;

/// Persists synthesized waveforms so they can be served back to the client.
pub trait Store: Send + Sync {
    /// Saves the given waveform under the given file name.
    fn save(&self, key: &Uuid, file_name: String, raw: Vec<u8>) -> BoxFuture<Result<(), BackendError>>;
}

/// A store that writes waveforms into the directory served at the audio
/// path.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }
}

impl Store for FsStore {
    fn save(&self, _key: &Uuid, file_name: String, raw: Vec<u8>) -> BoxFuture<Result<(), BackendError>> {
        let directory = self.root.clone();
        let path = self.root.join(file_name);

        async move {
            tokio::fs::create_dir_all(&directory)
                .await
                .map_err(|source| BackendError::AudioPersistenceFailed { source })?;
            tokio::fs::write(&path, &raw)
                .await
                .map_err(|source| BackendError::AudioPersistenceFailed { source })?;

            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use uuid::Uuid;

    use super::{FsStore, Store};

    #[tokio::test]
    async fn writes_waveforms_under_the_audio_directory() {
        let dir = tempdir().expect("create temporary directory");
        let root = dir.path().join("audio");
        let store = FsStore::new(&root);
        let id = Uuid::new_v4();

        store
            .save(&id, format!("{}.wav", id), vec![1, 2, 3])
            .await
            .expect("save waveform");

        let written = std::fs::read(root.join(format!("{}.wav", id))).expect("read waveform back");
        assert_eq!(written, vec![1, 2, 3]);
    }
}
