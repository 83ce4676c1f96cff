use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::times::Times;
use crate::validation;

/// The gender of the birthday person, as collected by the details form.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            _ => Err(UnknownVariant::new("gender", s)),
        }
    }
}

/// The requested mood of the song.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Mood {
    Happy,
    Romantic,
    Funny,
    Motivational,
    Calm,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Romantic => "Romantic",
            Mood::Funny => "Funny",
            Mood::Motivational => "Motivational",
            Mood::Calm => "Calm",
        }
    }
}

impl FromStr for Mood {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Happy" => Ok(Mood::Happy),
            "Romantic" => Ok(Mood::Romantic),
            "Funny" => Ok(Mood::Funny),
            "Motivational" => Ok(Mood::Motivational),
            "Calm" => Ok(Mood::Calm),
            _ => Err(UnknownVariant::new("mood", s)),
        }
    }
}

/// The requested music genre.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Genre {
    Rap,
    Rock,
    Pop,
    Desi,
    #[serde(rename = "EDM")]
    Edm,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Rap => "Rap",
            Genre::Rock => "Rock",
            Genre::Pop => "Pop",
            Genre::Desi => "Desi",
            Genre::Edm => "EDM",
        }
    }
}

impl FromStr for Genre {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Rap" => Ok(Genre::Rap),
            "Rock" => Ok(Genre::Rock),
            "Pop" => Ok(Genre::Pop),
            "Desi" => Ok(Genre::Desi),
            "EDM" => Ok(Genre::Edm),
            _ => Err(UnknownVariant::new("genre", s)),
        }
    }
}

/// The requested singer voice.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Voice {
    Male,
    Female,
}

impl Voice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Male => "Male",
            Voice::Female => "Female",
        }
    }
}

impl FromStr for Voice {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Voice::Male),
            "Female" => Ok(Voice::Female),
            _ => Err(UnknownVariant::new("singer voice", s)),
        }
    }
}

/// A stored string that does not name a known variant. Only reachable if the
/// database holds a value this version does not understand.
#[derive(Debug)]
pub struct UnknownVariant {
    field: &'static str,
    value: String,
}

impl UnknownVariant {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        UnknownVariant {
            field,
            value: value.into(),
        }
    }
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.field, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// The song-request attributes submitted through the details form and
/// snapshotted onto every generated song.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetails {
    /// The name of the birthday person.
    #[serde(deserialize_with = "validation::deserialize_name")]
    pub birthday_person_name: String,

    /// The age they are turning.
    pub age: i16,

    pub gender: Gender,

    pub mood: Mood,

    pub genre: Genre,

    pub singer_voice: Voice,
}

/// A single registered user.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The ID of the user.
    pub id: Uuid,

    /// The name provided at registration, normalized.
    pub name: String,

    pub email: String,

    pub phone: String,

    /// Whether the OTP step has been completed.
    pub verified: bool,

    /// The song-request attributes. Absent until the details form is
    /// submitted; set as a group afterwards.
    #[serde(flatten)]
    pub details: Option<SongDetails>,

    #[serde(flatten)]
    pub times: Times,
}

/// The listing view of a user: song attributes and timestamps only, no
/// contact details.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// The ID of the user.
    pub id: Uuid,

    #[serde(flatten)]
    pub details: Option<SongDetails>,

    #[serde(flatten)]
    pub times: Times,
}

/// A user freshly inserted into the database.
#[derive(Clone, Debug)]
pub struct NewUser {
    id: Uuid,
    times: Times,
}

impl NewUser {
    pub fn new(id: Uuid, times: Times) -> Self {
        NewUser { id, times }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn times(&self) -> &Times {
        &self.times
    }
}

/// The registration form submission.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// The name provided. Normalized on the way in.
    #[serde(deserialize_with = "validation::deserialize_name")]
    pub name: String,

    pub email: String,

    pub phone: String,

    #[serde(default)]
    pub accept_terms: bool,

    /// Marketing consent. Recorded but unused by this service.
    #[serde(default)]
    pub receive_promo: bool,
}

/// The OTP verification submission.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpSubmission {
    pub user_id: String,
    pub otp: String,
}

/// The details form submission.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsSubmission {
    pub user_id: String,

    #[serde(flatten)]
    pub details: SongDetails,
}
