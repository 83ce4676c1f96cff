use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use url::Url;
use uuid::Uuid;

use crate::db::Db;
use crate::errors::BackendError;
use crate::song::{NewSong, Song};
use crate::times::Times;
use crate::user::{NewUser, Registration, SongDetails, User, UserSummary};

/// An in-memory [`Db`] for tests. Uniqueness and ordering behave like the
/// real schema; timestamps come from the wall clock.
#[derive(Default)]
pub struct MockDb {
    pub users: RwLock<Vec<User>>,
    pub songs: RwLock<Vec<Song>>,

    /// Number of `update_audio_url` writes, for the exactly-once assertions.
    pub audio_url_writes: AtomicUsize,
}

impl MockDb {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Db for MockDb {
    fn insert_user(&self, registration: Registration) -> BoxFuture<Result<NewUser, BackendError>> {
        async move {
            let mut users = self.users.write().unwrap();

            if users
                .iter()
                .any(|u| u.email == registration.email || u.phone == registration.phone)
            {
                return Err(BackendError::UserAlreadyExists);
            }

            let times = Times::now();
            let user = User {
                id: Uuid::new_v4(),
                name: registration.name,
                email: registration.email,
                phone: registration.phone,
                verified: false,
                details: None,
                times,
            };
            let new = NewUser::new(user.id, times);

            users.push(user);

            Ok(new)
        }
        .boxed()
    }

    fn mark_verified(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let id = *id;

        async move {
            let mut users = self.users.write().unwrap();

            match users.iter_mut().find(|u| u.id == id) {
                Some(user) => {
                    user.verified = true;

                    Ok(())
                }
                None => Err(BackendError::NonExistentUser(id)),
            }
        }
        .boxed()
    }

    fn update_details(
        &self,
        id: &Uuid,
        details: SongDetails,
    ) -> BoxFuture<Result<Option<User>, BackendError>> {
        let id = *id;

        async move {
            let mut users = self.users.write().unwrap();

            Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
                user.details = Some(details);

                user.clone()
            }))
        }
        .boxed()
    }

    fn retrieve_user(&self, id: &Uuid) -> BoxFuture<Result<Option<User>, BackendError>> {
        let id = *id;

        async move {
            let users = self.users.read().unwrap();

            Ok(users.iter().find(|u| u.id == id).cloned())
        }
        .boxed()
    }

    fn count_users(&self) -> BoxFuture<Result<i64, BackendError>> {
        async move { Ok(self.users.read().unwrap().len() as i64) }.boxed()
    }

    fn list_users(
        &self,
        limit: i64,
        offset: i64,
    ) -> BoxFuture<Result<Vec<UserSummary>, BackendError>> {
        async move {
            let users = self.users.read().unwrap();

            // newest first, like the SQL ordering
            Ok(users
                .iter()
                .rev()
                .skip(offset as usize)
                .take(limit as usize)
                .map(|user| UserSummary {
                    id: user.id,
                    details: user.details.clone(),
                    times: user.times,
                })
                .collect())
        }
        .boxed()
    }

    fn insert_song(
        &self,
        user_id: &Uuid,
        details: SongDetails,
        lyrics: String,
    ) -> BoxFuture<Result<NewSong, BackendError>> {
        let user_id = *user_id;

        async move {
            let times = Times::now();
            let song = Song {
                id: Uuid::new_v4(),
                user_id,
                details,
                lyrics,
                audio_url: None,
                generated: true,
                times,
            };
            let new = NewSong::new(song.id, times);

            self.songs.write().unwrap().push(song);

            Ok(new)
        }
        .boxed()
    }

    fn retrieve_song(&self, id: &Uuid) -> BoxFuture<Result<Option<Song>, BackendError>> {
        let id = *id;

        async move {
            let songs = self.songs.read().unwrap();

            Ok(songs.iter().find(|s| s.id == id).cloned())
        }
        .boxed()
    }

    fn update_audio_url(
        &self,
        id: &Uuid,
        url: Option<&Url>,
    ) -> BoxFuture<Result<(), BackendError>> {
        let id = *id;
        let url = url.cloned();

        async move {
            let mut songs = self.songs.write().unwrap();

            match songs.iter_mut().find(|s| s.id == id) {
                Some(song) => {
                    song.audio_url = url;
                    self.audio_url_writes.fetch_add(1, Ordering::SeqCst);

                    Ok(())
                }
                None => Err(BackendError::NonExistentSong(id)),
            }
        }
        .boxed()
    }
}
