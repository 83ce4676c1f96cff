use thiserror::Error;
use uuid::Uuid;
use warp::reject;

/// Enumerates high-level errors returned by this library.
///
/// The `Display` strings double as the caller-facing messages; raw provider
/// or database error text never leaves the process.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// A required field was absent or blank.
    #[error("All fields are required")]
    FieldsMissing,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid phone number format")]
    InvalidPhone,

    #[error("Please accept terms and conditions")]
    TermsNotAccepted,

    /// The email or phone collides with an existing registration.
    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid OTP")]
    InvalidOtp,

    /// An identifier could not be parsed as a UUID.
    #[error("invalid ID: {0}")]
    InvalidId(String),

    #[error("User not found")]
    NonExistentUser(Uuid),

    /// Lyrics generation was requested before the details form was submitted.
    #[error("User details incomplete")]
    IncompleteDetails(Uuid),

    #[error("Song not found")]
    NonExistentSong(Uuid),

    #[error("Song ID and lyrics are required")]
    MissingAudioInput,

    /// A provider answered 429; the whole request terminates here.
    #[error("Rate limit reached, please try again later")]
    RateLimited { provider: &'static str },

    /// A synthesized waveform could not be written to the audio directory.
    #[error("could not persist generated audio")]
    AudioPersistenceFailed { source: std::io::Error },
}

impl reject::Reject for BackendError {}
