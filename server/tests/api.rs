use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use backend::db::mock::MockDb;
use backend::db::Db;
use backend::environment::{Config, Environment};
use backend::generation::outcome::ProviderFailure;
use backend::generation::provider::{
    AudioJob, AudioPayload, AudioProvider, LyricsJob, LyricsProvider,
};
use backend::generation::Generator;
use backend::routes;
use backend::store::mock::MockStore;
use backend::store::Store;
use backend::urls::Urls;

const BASE_URL: &str = "http://localhost:3000/";
const PAGE_SIZE: i64 = 10;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistrationResponse {
    success: bool,
    user: String,
    otp: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OtpResponse {
    success: bool,
    msg: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LyricsResponse {
    success: bool,
    lyrics: String,
    #[serde(rename = "songId")]
    song_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AudioResponse {
    success: bool,
    #[serde(default, rename = "audioUrl")]
    audio_url: Option<String>,
    #[serde(rename = "useBrowserTTS")]
    use_browser_tts: bool,
    lyrics: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UsersResponse {
    success: bool,
    users: Vec<serde_json::Value>,
    pagination: PaginationResponse,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct PaginationResponse {
    current_page: i64,
    total_pages: i64,
    total_users: i64,
    has_next_page: bool,
    has_prev_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorResponse {
    success: bool,
    msg: String,
    user: Option<String>,
    song: Option<String>,
    page: Option<i64>,
}

type LyricsScript = Box<dyn Fn(usize) -> Result<String, ProviderFailure> + Send + Sync>;

/// A lyrics provider driven by a call-indexed script, counting invocations.
struct ScriptedLyrics {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    script: LyricsScript,
}

impl LyricsProvider for ScriptedLyrics {
    fn name(&self) -> &'static str {
        self.name
    }

    fn generate(&self, _job: &LyricsJob) -> BoxFuture<Result<String, ProviderFailure>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let result = (self.script)(call);

        async move { result }.boxed()
    }
}

fn lyrics_provider(
    name: &'static str,
    script: impl Fn(usize) -> Result<String, ProviderFailure> + Send + Sync + 'static,
) -> (Box<dyn LyricsProvider>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));

    (
        Box::new(ScriptedLyrics {
            name,
            calls: calls.clone(),
            script: Box::new(script),
        }),
        calls,
    )
}

type AudioScript = Box<dyn Fn(usize) -> Result<AudioPayload, ProviderFailure> + Send + Sync>;

/// An audio provider driven by a call-indexed script, counting invocations.
struct ScriptedAudio {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    script: AudioScript,
}

impl AudioProvider for ScriptedAudio {
    fn name(&self) -> &'static str {
        self.name
    }

    fn synthesize(&self, _job: &AudioJob) -> BoxFuture<Result<AudioPayload, ProviderFailure>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let result = (self.script)(call);

        async move { result }.boxed()
    }
}

fn audio_provider(
    name: &'static str,
    script: impl Fn(usize) -> Result<AudioPayload, ProviderFailure> + Send + Sync + 'static,
) -> (Box<dyn AudioProvider>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));

    (
        Box::new(ScriptedAudio {
            name,
            calls: calls.clone(),
            script: Box::new(script),
        }),
        calls,
    )
}

struct Fixture {
    environment: Environment,
    db: Arc<MockDb>,
    store: Arc<MockStore>,
    urls: Arc<Urls>,
}

fn fixture(
    lyrics_chain: Vec<Box<dyn LyricsProvider>>,
    audio_chain: Vec<Box<dyn AudioProvider>>,
    fallback_audio_url: Option<Url>,
) -> Fixture {
    let logger = Arc::new(log::discard_logger());
    let db = Arc::new(MockDb::new());
    let store = Arc::new(MockStore::new());
    let urls = Arc::new(Urls::new(BASE_URL, "api", "audio", "wav"));

    let generator = Arc::new(Generator::with_chains(
        logger.clone(),
        lyrics_chain,
        audio_chain,
        fallback_audio_url,
        store.clone() as Arc<dyn Store>,
        urls.clone(),
    ));

    let environment = Environment::new(
        logger,
        db.clone() as Arc<dyn Db + Send + Sync>,
        urls.clone(),
        generator,
        Config::new(PAGE_SIZE),
    );

    Fixture {
        environment,
        db,
        store,
        urls,
    }
}

fn api(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let logger = environment.logger.clone();

    routes::make_register_route(environment.clone())
        .or(routes::make_verify_otp_route(environment.clone()))
        .or(routes::make_update_details_route(environment.clone()))
        .or(routes::make_generate_lyrics_route(environment.clone()))
        .or(routes::make_generate_audio_route(environment.clone()))
        .or(routes::make_users_route(environment))
        .recover(move |r| routes::format_rejection(logger.clone(), r))
}

fn parse<'a, T: Deserialize<'a>>(body: &'a [u8]) -> T {
    serde_json::from_slice(body).expect("parse response body")
}

async fn register_user(environment: &Environment, index: usize) -> String {
    let filter = api(environment.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/auth/register")
        .json(&serde_json::json!({
            "name": format!("User {}", index),
            "email": format!("user{}@example.com", index),
            "phone": format!("98765432{:02}", index),
            "acceptTerms": true,
        }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let parsed: RegistrationResponse = parse(response.body());
    assert!(parsed.success);
    assert_eq!(parsed.otp, "1234");

    parsed.user
}

/// Registers a user, verifies the OTP, and submits the details form.
async fn onboard_user(environment: &Environment, index: usize) -> String {
    let filter = api(environment.clone());
    let user_id = register_user(environment, index).await;

    let response = warp::test::request()
        .method("POST")
        .path("/api/auth/verify-otp")
        .json(&serde_json::json!({ "userId": user_id, "otp": "1234" }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = warp::test::request()
        .method("POST")
        .path("/api/song/update-details")
        .json(&serde_json::json!({
            "userId": user_id,
            "birthdayPersonName": "Asha",
            "age": 30,
            "gender": "Female",
            "mood": "Happy",
            "genre": "Pop",
            "singerVoice": "Female",
        }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    user_id
}

/// Onboards a user and generates lyrics, returning `(song_id, lyrics)`.
async fn prepare_song(environment: &Environment) -> (String, String) {
    let filter = api(environment.clone());
    let user_id = onboard_user(environment, 0).await;

    let response = warp::test::request()
        .method("POST")
        .path("/api/song/generate-lyrics")
        .json(&serde_json::json!({ "userId": user_id }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let parsed: LyricsResponse = parse(response.body());

    (parsed.song_id, parsed.lyrics)
}

async fn request_audio(
    environment: &Environment,
    song_id: &str,
    lyrics: &str,
) -> (StatusCode, Vec<u8>) {
    let filter = api(environment.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/song/generate-audio")
        .json(&serde_json::json!({ "songId": song_id, "lyrics": lyrics }))
        .reply(&filter)
        .await;

    (response.status(), response.body().to_vec())
}

#[tokio::test]
async fn registration_flow_works() {
    let f = fixture(vec![], vec![], None);
    let filter = api(f.environment.clone());

    let user_id = register_user(&f.environment, 1).await;

    // wrong code
    let response = warp::test::request()
        .method("POST")
        .path("/api/auth/verify-otp")
        .json(&serde_json::json!({ "userId": user_id, "otp": "9999" }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(response.body());
    assert!(!error.success);
    assert_eq!(error.msg, "Invalid OTP");

    // right code
    let response = warp::test::request()
        .method("POST")
        .path("/api/auth/verify-otp")
        .json(&serde_json::json!({ "userId": user_id, "otp": "1234" }))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let parsed: OtpResponse = parse(response.body());
    assert!(parsed.success);
    assert_eq!(parsed.msg, "OTP verified successfully");

    let users = f.db.users.read().unwrap();
    assert!(users[0].verified);
}

#[tokio::test]
async fn duplicate_registrations_are_rejected() {
    let f = fixture(vec![], vec![], None);
    let filter = api(f.environment.clone());

    register_user(&f.environment, 1).await;

    // same email, different phone
    let response = warp::test::request()
        .method("POST")
        .path("/api/auth/register")
        .json(&serde_json::json!({
            "name": "Someone Else",
            "email": "user1@example.com",
            "phone": "9876543299",
            "acceptTerms": true,
        }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.msg, "User already exists");
    assert_eq!(f.db.users.read().unwrap().len(), 1);
}

#[tokio::test]
async fn registration_validates_submissions() {
    let f = fixture(vec![], vec![], None);
    let filter = api(f.environment.clone());

    let cases = vec![
        (
            serde_json::json!({
                "name": "A", "email": "not-an-email", "phone": "9876543210", "acceptTerms": true
            }),
            "Invalid email format",
        ),
        (
            serde_json::json!({
                "name": "A", "email": "a@b.co", "phone": "12345", "acceptTerms": true
            }),
            "Invalid phone number format",
        ),
        (
            serde_json::json!({
                "name": "A", "email": "a@b.co", "phone": "9876543210", "acceptTerms": false
            }),
            "Please accept terms and conditions",
        ),
        (
            serde_json::json!({
                "name": "  ", "email": "a@b.co", "phone": "9876543210", "acceptTerms": true
            }),
            "All fields are required",
        ),
    ];

    for (body, expected) in cases {
        let response = warp::test::request()
            .method("POST")
            .path("/api/auth/register")
            .json(&body)
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", expected);
        let error: ErrorResponse = parse(response.body());
        assert_eq!(error.msg, expected);
    }

    assert!(f.db.users.read().unwrap().is_empty());
}

#[tokio::test]
async fn lyrics_fall_back_to_template_without_providers() {
    let f = fixture(vec![], vec![], None);

    let (song_id, lyrics) = prepare_song(&f.environment).await;

    // the template honors the soft constraints by construction
    let mentions = lyrics.matches("Happy birthday").count();
    assert!(mentions >= 2, "only {} mentions", mentions);
    let lines = lyrics.lines().filter(|l| !l.is_empty()).count();
    assert!(lines <= 16, "{} lines", lines);
    assert!(lyrics.contains("Asha"));

    // round-trip: the stored song carries exactly the returned lyrics
    let songs = f.db.songs.read().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].id.to_string(), song_id);
    assert_eq!(songs[0].lyrics, lyrics);
    assert!(songs[0].audio_url.is_none());
    assert!(songs[0].generated);
}

#[tokio::test]
async fn lyrics_generation_for_unknown_user_creates_nothing() {
    let f = fixture(vec![], vec![], None);
    let filter = api(f.environment.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/api/song/generate-lyrics")
        .json(&serde_json::json!({ "userId": Uuid::new_v4().to_string() }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.msg, "User not found");
    assert!(f.db.songs.read().unwrap().is_empty());
}

#[tokio::test]
async fn lyrics_generation_requires_complete_details() {
    let f = fixture(vec![], vec![], None);
    let filter = api(f.environment.clone());

    let user_id = register_user(&f.environment, 1).await;

    let response = warp::test::request()
        .method("POST")
        .path("/api/song/generate-lyrics")
        .json(&serde_json::json!({ "userId": user_id }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.msg, "User details incomplete");
    assert!(f.db.songs.read().unwrap().is_empty());
}

#[tokio::test]
async fn lyrics_provider_success_wins_over_template() {
    let (provider, calls) =
        lyrics_provider("scripted-llm", |_| Ok("Happy birthday dear friend\nHappy birthday again".to_owned()));
    let f = fixture(vec![provider], vec![], None);

    let (_, lyrics) = prepare_song(&f.environment).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(lyrics, "Happy birthday dear friend\nHappy birthday again");
}

#[tokio::test]
async fn lyrics_provider_failures_advance_to_template() {
    let (provider, calls) = lyrics_provider("scripted-llm", |_| {
        Err(ProviderFailure::from_status(
            400,
            "PlayAI terms not accepted for this organization",
        ))
    });
    let f = fixture(vec![provider], vec![], None);

    let (_, lyrics) = prepare_song(&f.environment).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(lyrics.contains("Happy birthday to you, Asha!"));
}

#[tokio::test]
async fn lyrics_rate_limit_is_terminal() {
    let (provider, calls) =
        lyrics_provider("scripted-llm", |_| Err(ProviderFailure::from_status(429, "Too Many Requests")));
    let f = fixture(vec![provider], vec![], None);
    let filter = api(f.environment.clone());

    let user_id = onboard_user(&f.environment, 0).await;

    let response = warp::test::request()
        .method("POST")
        .path("/api/song/generate-lyrics")
        .json(&serde_json::json!({ "userId": user_id }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.msg, "Rate limit reached, please try again later");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // no song is created for a rate-limited request
    assert!(f.db.songs.read().unwrap().is_empty());
}

#[tokio::test]
async fn audio_rate_limit_stops_the_chain() {
    let (primary, primary_calls) =
        audio_provider("composer", |_| Err(ProviderFailure::from_status(429, "Too Many Requests")));
    let (secondary, secondary_calls) = audio_provider("speech", |_| {
        Ok(AudioPayload::Hosted(
            Url::parse("https://cdn.example.com/secondary.mp3").unwrap(),
        ))
    });
    let (tertiary, tertiary_calls) = audio_provider("second-voice", |_| {
        Ok(AudioPayload::Waveform(vec![0, 1, 2, 3]))
    });

    let f = fixture(vec![], vec![primary, secondary, tertiary], None);
    let (song_id, lyrics) = prepare_song(&f.environment).await;

    let (status, body) = request_audio(&f.environment, &song_id, &lyrics).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.msg, "Rate limit reached, please try again later");

    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    assert_eq!(tertiary_calls.load(Ordering::SeqCst), 0);

    // nothing was persisted for a terminated chain
    assert_eq!(f.db.audio_url_writes.load(Ordering::SeqCst), 0);
    assert!(f.db.songs.read().unwrap()[0].audio_url.is_none());
}

#[tokio::test]
async fn audio_falls_back_to_secondary_provider() {
    let secondary_url = Url::parse("https://cdn.example.com/secondary.mp3").unwrap();

    let (primary, primary_calls) =
        audio_provider("composer", |_| Err(ProviderFailure::from_status(503, "Service Unavailable")));
    let (secondary, secondary_calls) = {
        let url = secondary_url.clone();
        audio_provider("speech", move |_| Ok(AudioPayload::Hosted(url.clone())))
    };
    let (tertiary, tertiary_calls) = audio_provider("second-voice", |_| {
        Ok(AudioPayload::Waveform(vec![0, 1, 2, 3]))
    });

    let f = fixture(vec![], vec![primary, secondary, tertiary], None);
    let (song_id, lyrics) = prepare_song(&f.environment).await;

    let (status, body) = request_audio(&f.environment, &song_id, &lyrics).await;

    assert_eq!(status, StatusCode::OK);
    let parsed: AudioResponse = parse(&body);
    assert!(parsed.success);
    assert_eq!(parsed.audio_url.as_deref(), Some(secondary_url.as_str()));
    assert!(!parsed.use_browser_tts);
    assert_eq!(parsed.lyrics, lyrics);
    assert_eq!(parsed.message, "Audio generated successfully");

    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tertiary_calls.load(Ordering::SeqCst), 0);

    // the persisted URL is the secondary provider's, written exactly once
    let songs = f.db.songs.read().unwrap();
    assert_eq!(songs[0].audio_url.as_ref(), Some(&secondary_url));
    assert_eq!(f.db.audio_url_writes.load(Ordering::SeqCst), 1);

    // the audio step never touches the lyrics
    assert_eq!(songs[0].lyrics, lyrics);
}

#[tokio::test]
async fn audio_waveforms_are_stored_and_served() {
    let (provider, _) = audio_provider("speech", |_| {
        Ok(AudioPayload::Waveform(vec![82, 73, 70, 70]))
    });

    let f = fixture(vec![], vec![provider], None);
    let (song_id, lyrics) = prepare_song(&f.environment).await;

    let (status, body) = request_audio(&f.environment, &song_id, &lyrics).await;

    assert_eq!(status, StatusCode::OK);
    let parsed: AudioResponse = parse(&body);

    let id = Uuid::parse_str(&song_id).unwrap();
    assert_eq!(parsed.audio_url.as_deref(), Some(f.urls.audio(&id).as_str()));

    let stored = f.store.map.read().unwrap();
    assert_eq!(stored.get(&id).map(Vec::as_slice), Some(&[82, 73, 70, 70][..]));
}

#[tokio::test]
async fn audio_exhaustion_signals_browser_synthesis() {
    let (primary, _) =
        audio_provider("composer", |_| Err(ProviderFailure::from_status(503, "Service Unavailable")));
    let (secondary, _) =
        audio_provider("speech", |_| Err(ProviderFailure::from_status(500, "Internal Server Error")));
    let (tertiary, tertiary_calls) =
        audio_provider("second-voice", |_| Err(ProviderFailure::unreachable("connection refused")));

    let f = fixture(vec![], vec![primary, secondary, tertiary], None);
    let (song_id, lyrics) = prepare_song(&f.environment).await;

    let (status, body) = request_audio(&f.environment, &song_id, &lyrics).await;

    assert_eq!(status, StatusCode::OK);
    let parsed: AudioResponse = parse(&body);
    assert!(parsed.success);
    assert!(parsed.use_browser_tts);
    assert_eq!(parsed.audio_url, None);
    assert_eq!(parsed.lyrics, lyrics);
    assert_eq!(tertiary_calls.load(Ordering::SeqCst), 1);

    // the absence of audio is still persisted, exactly once
    assert_eq!(f.db.audio_url_writes.load(Ordering::SeqCst), 1);
    assert!(f.db.songs.read().unwrap()[0].audio_url.is_none());
}

#[tokio::test]
async fn audio_exhaustion_serves_placeholder_when_configured() {
    let placeholder = Url::parse("https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3").unwrap();

    let (provider, _) =
        audio_provider("speech", |_| Err(ProviderFailure::from_status(503, "Service Unavailable")));

    let f = fixture(vec![], vec![provider], Some(placeholder.clone()));
    let (song_id, lyrics) = prepare_song(&f.environment).await;

    let (status, body) = request_audio(&f.environment, &song_id, &lyrics).await;

    assert_eq!(status, StatusCode::OK);
    let parsed: AudioResponse = parse(&body);
    assert_eq!(parsed.audio_url.as_deref(), Some(placeholder.as_str()));
    assert!(!parsed.use_browser_tts);

    let songs = f.db.songs.read().unwrap();
    assert_eq!(songs[0].audio_url.as_ref(), Some(&placeholder));
}

#[tokio::test]
async fn audio_last_write_wins_without_dedup() {
    // distinct URL per call so the second write is observable
    let (provider, calls) = audio_provider("composer", |call| {
        Ok(AudioPayload::Hosted(
            Url::parse(&format!("https://cdn.example.com/take-{}.mp3", call)).unwrap(),
        ))
    });

    let f = fixture(vec![], vec![provider], None);
    let (song_id, lyrics) = prepare_song(&f.environment).await;

    let (first, _) = request_audio(&f.environment, &song_id, &lyrics).await;
    let (second, _) = request_audio(&f.environment, &song_id, &lyrics).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // two writes, and the record reflects the second call
    assert_eq!(f.db.audio_url_writes.load(Ordering::SeqCst), 2);
    let songs = f.db.songs.read().unwrap();
    assert_eq!(
        songs[0].audio_url.as_ref().map(Url::as_str),
        Some("https://cdn.example.com/take-1.mp3")
    );
}

#[tokio::test]
async fn audio_generation_validates_its_input() {
    let f = fixture(vec![], vec![], None);
    let (song_id, _) = prepare_song(&f.environment).await;

    // blank lyrics are rejected before any lookup
    let (status, body) = request_audio(&f.environment, &song_id, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.msg, "Song ID and lyrics are required");

    // unknown song
    let (status, body) =
        request_audio(&f.environment, &Uuid::new_v4().to_string(), "some lyrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.msg, "Song not found");
}

#[tokio::test]
async fn user_listing_paginates_newest_first() {
    let f = fixture(vec![], vec![], None);
    let filter = api(f.environment.clone());

    let first = register_user(&f.environment, 1).await;
    let second = register_user(&f.environment, 2).await;
    let third = register_user(&f.environment, 3).await;

    let response = warp::test::request()
        .method("GET")
        .path("/api/users?page=1&limit=2")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let parsed: UsersResponse = parse(response.body());

    assert!(parsed.success);
    assert_eq!(parsed.users.len(), 2);
    assert_eq!(parsed.users[0]["id"], third);
    assert_eq!(parsed.users[1]["id"], second);
    assert_eq!(parsed.pagination.current_page, 1);
    assert_eq!(parsed.pagination.total_pages, 2);
    assert_eq!(parsed.pagination.total_users, 3);
    assert!(parsed.pagination.has_next_page);
    assert!(!parsed.pagination.has_prev_page);

    let response = warp::test::request()
        .method("GET")
        .path("/api/users?page=2&limit=2")
        .reply(&filter)
        .await;
    let parsed: UsersResponse = parse(response.body());

    assert_eq!(parsed.users.len(), 1);
    assert_eq!(parsed.users[0]["id"], first);
    assert!(!parsed.pagination.has_next_page);
    assert!(parsed.pagination.has_prev_page);

    // the summary view exposes no contact details
    assert!(parsed.users[0].get("email").is_none());
    assert!(parsed.users[0].get("phone").is_none());
}
