use futures::future::BoxFuture;
use url::Url;
use uuid::Uuid;

use crate::errors::BackendError;
use crate::song::{NewSong, Song};
use crate::user::{NewUser, Registration, SongDetails, User, UserSummary};

pub mod mock;

pub trait Db {
    fn insert_user(&self, registration: Registration) -> BoxFuture<Result<NewUser, BackendError>>;

    fn mark_verified(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>>;

    fn update_details(
        &self,
        id: &Uuid,
        details: SongDetails,
    ) -> BoxFuture<Result<Option<User>, BackendError>>;

    fn retrieve_user(&self, id: &Uuid) -> BoxFuture<Result<Option<User>, BackendError>>;

    fn count_users(&self) -> BoxFuture<Result<i64, BackendError>>;

    fn list_users(
        &self,
        limit: i64,
        offset: i64,
    ) -> BoxFuture<Result<Vec<UserSummary>, BackendError>>;

    fn insert_song(
        &self,
        user_id: &Uuid,
        details: SongDetails,
        lyrics: String,
    ) -> BoxFuture<Result<NewSong, BackendError>>;

    fn retrieve_song(&self, id: &Uuid) -> BoxFuture<Result<Option<Song>, BackendError>>;

    fn update_audio_url(
        &self,
        id: &Uuid,
        url: Option<&Url>,
    ) -> BoxFuture<Result<(), BackendError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgPool, PgRow},
    };
    use time::OffsetDateTime;
    use url::Url;
    use uuid::Uuid;

    use crate::errors::BackendError;
    use crate::song::{NewSong, Song};
    use crate::times::Times;
    use crate::user::{NewUser, Registration, SongDetails, User, UserSummary};

    const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";
    const USERS_PHONE_CONSTRAINT: &str = "users_phone_key";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn insert_user(
            &self,
            registration: Registration,
        ) -> BoxFuture<Result<NewUser, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/create_user.sql"));

                let (id, created_at, updated_at): (Uuid, OffsetDateTime, OffsetDateTime) = query
                    .bind(&registration.name)
                    .bind(&registration.email)
                    .bind(&registration.phone)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(NewUser::new(id, Times::new(created_at, updated_at)))
            }
            .boxed()
        }

        fn mark_verified(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query(include_str!("queries/mark_verified.sql"));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentUser(id))
                } else {
                    Ok(())
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
                let query = sqlx::query(include_str!("queries/update_details.sql"));

                let user: Option<User> = query
                    .bind(id)
                    .bind(&details.birthday_person_name)
                    .bind(details.age)
                    .bind(details.gender.as_str())
                    .bind(details.mood.as_str())
                    .bind(details.genre.as_str())
                    .bind(details.singer_voice.as_str())
                    .try_map(|row: PgRow| user_from_row(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(user)
            }
            .boxed()
        }

        fn retrieve_user(&self, id: &Uuid) -> BoxFuture<Result<Option<User>, BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query(include_str!("queries/retrieve_user.sql"));

                let user: Option<User> = query
                    .bind(id)
                    .try_map(|row: PgRow| user_from_row(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(user)
            }
            .boxed()
        }

        fn count_users(&self) -> BoxFuture<Result<i64, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, (i64,)>(include_str!("queries/count_users.sql"));

                let (count,) = query.fetch_one(&self.pool).await.map_err(map_sqlx_error)?;

                Ok(count)
            }
            .boxed()
        }

        fn list_users(
            &self,
            limit: i64,
            offset: i64,
        ) -> BoxFuture<Result<Vec<UserSummary>, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/list_users.sql"));

                let users: Vec<UserSummary> = query
                    .bind(limit)
                    .bind(offset)
                    .try_map(|row: PgRow| {
                        Ok(UserSummary {
                            id: try_get(&row, "id")?,
                            details: details_from_row(&row)?,
                            times: times_from_row(&row)?,
                        })
                    })
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(users)
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
                let query = sqlx::query_as(include_str!("queries/create_song.sql"));

                let (id, created_at, updated_at): (Uuid, OffsetDateTime, OffsetDateTime) = query
                    .bind(user_id)
                    .bind(&details.birthday_person_name)
                    .bind(details.age)
                    .bind(details.gender.as_str())
                    .bind(details.mood.as_str())
                    .bind(details.genre.as_str())
                    .bind(details.singer_voice.as_str())
                    .bind(&lyrics)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(NewSong::new(id, Times::new(created_at, updated_at)))
            }
            .boxed()
        }

        fn retrieve_song(&self, id: &Uuid) -> BoxFuture<Result<Option<Song>, BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query(include_str!("queries/retrieve_song.sql"));

                let song: Option<Song> = query
                    .bind(id)
                    .try_map(|row: PgRow| song_from_row(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(song)
            }
            .boxed()
        }

        fn update_audio_url(
            &self,
            id: &Uuid,
            url: Option<&Url>,
        ) -> BoxFuture<Result<(), BackendError>> {
            let id = *id;
            let url = url.map(|url| url.as_str().to_owned());

            async move {
                let query = sqlx::query(include_str!("queries/update_audio_url.sql"));

                let count = query
                    .bind(id)
                    .bind(url)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentSong(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    }

    fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
        Ok(User {
            id: try_get(row, "id")?,
            name: try_get(row, "name")?,
            email: try_get(row, "email")?,
            phone: try_get(row, "phone")?,
            verified: try_get(row, "verified")?,
            details: details_from_row(row)?,
            times: times_from_row(row)?,
        })
    }

    fn song_from_row(row: &PgRow) -> Result<Song, sqlx::Error> {
        let audio_url: Option<String> = try_get(row, "audio_url")?;
        let audio_url = match audio_url {
            Some(url) => Some(Url::parse(&url).map_err(decode_error)?),
            None => None,
        };

        // songs snapshot every attribute as NOT NULL
        let gender: String = try_get(row, "gender")?;
        let mood: String = try_get(row, "mood")?;
        let genre: String = try_get(row, "genre")?;
        let singer_voice: String = try_get(row, "singer_voice")?;

        let details = SongDetails {
            birthday_person_name: try_get(row, "birthday_person_name")?,
            age: try_get(row, "age")?,
            gender: gender.parse().map_err(decode_error)?,
            mood: mood.parse().map_err(decode_error)?,
            genre: genre.parse().map_err(decode_error)?,
            singer_voice: singer_voice.parse().map_err(decode_error)?,
        };

        Ok(Song {
            id: try_get(row, "id")?,
            user_id: try_get(row, "user_id")?,
            details,
            lyrics: try_get(row, "lyrics")?,
            audio_url,
            generated: try_get(row, "generated")?,
            times: times_from_row(row)?,
        })
    }

    /// Assembles the song attributes from a row. They are set as a group, so
    /// a row with any of them missing has no details yet.
    fn details_from_row(row: &PgRow) -> Result<Option<SongDetails>, sqlx::Error> {
        let birthday_person_name: Option<String> = try_get(row, "birthday_person_name")?;
        let age: Option<i16> = try_get(row, "age")?;
        let gender: Option<String> = try_get(row, "gender")?;
        let mood: Option<String> = try_get(row, "mood")?;
        let genre: Option<String> = try_get(row, "genre")?;
        let singer_voice: Option<String> = try_get(row, "singer_voice")?;

        match (birthday_person_name, age, gender, mood, genre, singer_voice) {
            (Some(name), Some(age), Some(gender), Some(mood), Some(genre), Some(voice)) => {
                Ok(Some(SongDetails {
                    birthday_person_name: name,
                    age,
                    gender: gender.parse().map_err(decode_error)?,
                    mood: mood.parse().map_err(decode_error)?,
                    genre: genre.parse().map_err(decode_error)?,
                    singer_voice: voice.parse().map_err(decode_error)?,
                }))
            }
            _ => Ok(None),
        }
    }

    fn times_from_row(row: &PgRow) -> Result<Times, sqlx::Error> {
        let created_at: OffsetDateTime = try_get(row, "created_at")?;
        let updated_at: OffsetDateTime = try_get(row, "updated_at")?;

        Ok(Times::new(created_at, updated_at))
    }

    fn decode_error(
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> sqlx::Error {
        sqlx::Error::Decode(Box::new(error))
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        use sqlx::Error;

        match error {
            Error::Database(ref e) if e.constraint() == Some(USERS_EMAIL_CONSTRAINT) => {
                BackendError::UserAlreadyExists
            }
            Error::Database(ref e) if e.constraint() == Some(USERS_PHONE_CONSTRAINT) => {
                BackendError::UserAlreadyExists
            }
            _ => BackendError::Sqlx { source: error },
        }
    }
}
