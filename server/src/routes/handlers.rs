use std::time::{Duration, Instant};

use log::debug;
use uuid::Uuid;
use warp::{
    reject,
    reply::{json, with_header, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::generation::AudioOutcome;
use crate::routes::{
    query::{Pagination, UsersQuery},
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::song::{AudioSubmission, LyricsSubmission};
use crate::user::{DetailsSubmission, OtpSubmission, Registration, SongDetails};
use crate::validation;

const SERVER_TIMING_HEADER: &str = "server-timing";

/// Demo verification code. Wiring up an SMS gateway is a deployment concern,
/// not part of this service.
const STATIC_OTP: &str = "1234";

const OTP_VERIFIED_MESSAGE: &str = "OTP verified successfully";
const AUDIO_GENERATED_MESSAGE: &str = "Audio generated successfully";
const AUDIO_PLACEHOLDER_MESSAGE: &str = "Audio providers unavailable, serving placeholder track";
const AUDIO_BROWSER_MESSAGE: &str = "Audio providers unavailable, use browser speech synthesis";

type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn register(environment: Environment, submission: Registration) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::register(), e);

        validate_registration(&submission).map_err(error_handler)?;

        debug!(environment.logger, "Registering user...");
        let new_user = environment
            .db
            .insert_user(submission)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Registered {
            success: true,
            user: new_user.id().to_string(),
            otp: STATIC_OTP,
        })
    }
}

pub async fn verify_otp(environment: Environment, submission: OtpSubmission) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::verify_otp(submission.user_id.clone()), e);

        let id = parse_id(&submission.user_id).map_err(error_handler)?;

        check_otp(&submission.otp).map_err(error_handler)?;

        debug!(environment.logger, "Verifying OTP..."; "user_id" => %id);
        environment
            .db
            .mark_verified(&id)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::OtpVerified {
            success: true,
            msg: OTP_VERIFIED_MESSAGE,
        })
    }
}

pub async fn update_details(environment: Environment, submission: DetailsSubmission) -> RouteResult {
    timed! {
        let raw_id = submission.user_id.clone();
        let error_handler = |e: BackendError| Rejection::new(Context::update_details(raw_id.clone()), e);

        let id = parse_id(&submission.user_id).map_err(error_handler)?;

        validate_details(&submission.details).map_err(error_handler)?;

        debug!(environment.logger, "Updating song details..."; "user_id" => %id);
        let user = environment
            .db
            .update_details(&id, submission.details)
            .await
            .map_err(error_handler)?
            .ok_or(BackendError::NonExistentUser(id))
            .map_err(error_handler)?;

        json(&SuccessResponse::DetailsUpdated {
            success: true,
            user,
        })
    }
}

pub async fn generate_lyrics(environment: Environment, submission: LyricsSubmission) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::generate_lyrics(submission.user_id.clone()), e);

        let id = parse_id(&submission.user_id).map_err(error_handler)?;

        // preconditions are checked before any provider is invoked
        let user = environment
            .db
            .retrieve_user(&id)
            .await
            .map_err(error_handler)?
            .ok_or(BackendError::NonExistentUser(id))
            .map_err(error_handler)?;

        let details = user
            .details
            .ok_or(BackendError::IncompleteDetails(id))
            .map_err(error_handler)?;

        debug!(environment.logger, "Generating lyrics..."; "user_id" => %id);
        let generated = environment
            .generator
            .generate_lyrics(&details)
            .await
            .map_err(error_handler)?;
        debug!(environment.logger, "Lyrics ready"; "provider" => generated.provider.unwrap_or("template"));

        let song = environment
            .db
            .insert_song(&id, details, generated.lyrics.clone())
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Lyrics {
            success: true,
            lyrics: &generated.lyrics,
            song_id: song.id().to_string(),
        })
    }
}

pub async fn generate_audio(environment: Environment, submission: AudioSubmission) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::generate_audio(submission.song_id.clone()), e);

        validate_lyrics_input(&submission.lyrics).map_err(error_handler)?;

        let id = parse_id(&submission.song_id).map_err(error_handler)?;

        let song = environment
            .db
            .retrieve_song(&id)
            .await
            .map_err(error_handler)?
            .ok_or(BackendError::NonExistentSong(id))
            .map_err(error_handler)?;

        debug!(environment.logger, "Generating audio..."; "song_id" => %id);
        let outcome = environment
            .generator
            .generate_audio(&id, &song.details, &submission.lyrics)
            .await
            .map_err(error_handler)?;

        // the single write of the whole chain, after it has terminated
        environment
            .db
            .update_audio_url(&id, outcome.url())
            .await
            .map_err(error_handler)?;

        let message = match &outcome {
            AudioOutcome::Generated { .. } => AUDIO_GENERATED_MESSAGE,
            AudioOutcome::Placeholder(_) => AUDIO_PLACEHOLDER_MESSAGE,
            AudioOutcome::BrowserSynthesis => AUDIO_BROWSER_MESSAGE,
        };

        json(&SuccessResponse::Audio {
            success: true,
            audio_url: outcome.url(),
            use_browser_tts: matches!(outcome, AudioOutcome::BrowserSynthesis),
            lyrics: &submission.lyrics,
            message,
        })
    }
}

pub async fn users(environment: Environment, query: UsersQuery) -> RouteResult {
    timed! {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(environment.config.default_page_size)
            .max(1);

        let error_handler = |e: BackendError| Rejection::new(Context::users(page), e);

        let total = environment.db.count_users().await.map_err(error_handler)?;
        let users = environment
            .db
            .list_users(limit, (page - 1) * limit)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Users {
            success: true,
            users,
            pagination: Pagination::new(page, limit, total),
        })
    }
}

fn validate_registration(submission: &Registration) -> Result<(), BackendError> {
    if submission.name.is_empty() || submission.email.is_empty() || submission.phone.is_empty() {
        return Err(BackendError::FieldsMissing);
    }

    validation::validate_email(&submission.email)?;
    validation::validate_phone(&submission.phone)?;

    if !submission.accept_terms {
        return Err(BackendError::TermsNotAccepted);
    }

    Ok(())
}

fn check_otp(otp: &str) -> Result<(), BackendError> {
    if otp == STATIC_OTP {
        Ok(())
    } else {
        Err(BackendError::InvalidOtp)
    }
}

fn validate_details(details: &SongDetails) -> Result<(), BackendError> {
    if details.birthday_person_name.is_empty() {
        Err(BackendError::FieldsMissing)
    } else {
        Ok(())
    }
}

fn validate_lyrics_input(lyrics: &str) -> Result<(), BackendError> {
    if lyrics.trim().is_empty() {
        Err(BackendError::MissingAudioInput)
    } else {
        Ok(())
    }
}

fn parse_id(raw: &str) -> Result<Uuid, BackendError> {
    Uuid::parse_str(raw).map_err(|_| BackendError::InvalidId(raw.to_owned()))
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
