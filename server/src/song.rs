use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::times::Times;
use crate::user::SongDetails;

/// A single generated song.
///
/// The `lyrics` field is written once, when the song is created, and never
/// mutated; the audio step only ever adds `audio_url`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// The ID of the song.
    pub id: Uuid,

    /// The user this song belongs to.
    pub user_id: Uuid,

    /// Snapshot of the user's song attributes at generation time.
    #[serde(flatten)]
    pub details: SongDetails,

    pub lyrics: String,

    /// Where the finished audio is served from, once the audio step has run.
    /// `None` afterwards means the client synthesizes speech locally.
    pub audio_url: Option<Url>,

    pub generated: bool,

    #[serde(flatten)]
    pub times: Times,
}

/// A song freshly inserted into the database.
#[derive(Clone, Debug)]
pub struct NewSong {
    id: Uuid,
    times: Times,
}

impl NewSong {
    pub fn new(id: Uuid, times: Times) -> Self {
        NewSong { id, times }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }
}

/// The lyrics-generation request body.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsSubmission {
    pub user_id: String,
}

/// The audio-generation request body.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSubmission {
    pub song_id: String,

    /// The lyrics to voice. Echoed back so the client can drive local
    /// synthesis without another round trip.
    pub lyrics: String,
}
