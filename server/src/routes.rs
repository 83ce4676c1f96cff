use std::sync::Arc;

use log::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};

use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;

pub use internal::*;

/// The maximum request body size to accept. Everything this API takes is a
/// small JSON document.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        FieldsMissing | InvalidEmail | InvalidPhone | TermsNotAccepted | UserAlreadyExists
        | InvalidOtp | InvalidId(..) | IncompleteDetails(..) | MissingAudioInput => {
            StatusCode::BAD_REQUEST
        }
        NonExistentUser(..) | NonExistentSong(..) => StatusCode::NOT_FOUND,
        RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use serde::de::DeserializeOwned;
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{get as g, path as p, post, query};

    use super::{handlers, query as q, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;
    use crate::song::{AudioSubmission, LyricsSubmission};
    use crate::user::{DetailsSubmission, OtpSubmission, Registration};

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    fn body<T: DeserializeOwned + Send>(
    ) -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
        warp::body::content_length_limit(MAX_CONTENT_LENGTH).and(warp::body::json())
    }

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let r = environment.urls.api_path.clone();

            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(r));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_register_route => register, rt; p("auth"), p("register"), end(), post(), body::<Registration>());
    route!(make_verify_otp_route => verify_otp, rt; p("auth"), p("verify-otp"), end(), post(), body::<OtpSubmission>());
    route!(make_update_details_route => update_details, rt; p("song"), p("update-details"), end(), post(), body::<DetailsSubmission>());
    route!(make_generate_lyrics_route => generate_lyrics, rt; p("song"), p("generate-lyrics"), end(), post(), body::<LyricsSubmission>());
    route!(make_generate_audio_route => generate_audio, rt; p("song"), p("generate-audio"), end(), post(), body::<AudioSubmission>());
    route!(make_users_route => users, rt; p("users"), end(), g(), query::<q::UsersQuery>());
}
