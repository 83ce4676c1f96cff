use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            success: false,
            context: self.context.clone(),
            msg: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

/// The JSON error envelope: `{ success: false, msg, ...context }`.
#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    pub(crate) success: bool,
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) msg: String,
}

/// Which operation failed, with whatever identifiers were at hand.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Register {},
    VerifyOtp { user: String },
    UpdateDetails { user: String },
    GenerateLyrics { user: String },
    GenerateAudio { song: String },
    Users { page: i64 },
}

impl Context {
    pub fn register() -> Context {
        Context::Register {}
    }

    pub fn verify_otp(user: String) -> Context {
        Context::VerifyOtp { user }
    }

    pub fn update_details(user: String) -> Context {
        Context::UpdateDetails { user }
    }

    pub fn generate_lyrics(user: String) -> Context {
        Context::GenerateLyrics { user }
    }

    pub fn generate_audio(song: String) -> Context {
        Context::GenerateAudio { song }
    }

    pub fn users(page: i64) -> Context {
        Context::Users { page }
    }
}
