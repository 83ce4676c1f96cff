use serde::Serialize;
use url::Url;

use crate::user::{User, UserSummary};

use super::query::Pagination;

/// Successful response envelopes. Every user-facing variant carries
/// `success: true` so clients can branch without inspecting status codes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Registered {
        success: bool,
        /// The new user's ID.
        user: String,
        /// The demo verification code the client should prompt for.
        otp: &'a str,
    },
    OtpVerified {
        success: bool,
        msg: &'a str,
    },
    DetailsUpdated {
        success: bool,
        user: User,
    },
    Lyrics {
        success: bool,
        lyrics: &'a str,
        #[serde(rename = "songId")]
        song_id: String,
    },
    Audio {
        success: bool,
        #[serde(rename = "audioUrl", skip_serializing_if = "Option::is_none")]
        audio_url: Option<&'a Url>,
        #[serde(rename = "useBrowserTTS")]
        use_browser_tts: bool,
        lyrics: &'a str,
        message: &'a str,
    },
    Users {
        success: bool,
        users: Vec<UserSummary>,
        pagination: Pagination,
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
}
