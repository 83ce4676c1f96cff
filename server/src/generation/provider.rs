//! Thin typed adapters around the external generation services.
//!
//! Each adapter performs exactly one network call per invocation and
//! reports failures raw; retries and fallback belong to the orchestrator.

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::user::Voice;

use super::outcome::ProviderFailure;

/// A normalized lyrics-generation request.
#[derive(Clone, Debug)]
pub struct LyricsJob {
    pub prompt: String,
}

/// A normalized audio-generation request.
#[derive(Clone, Debug)]
pub struct AudioJob {
    pub song_id: Uuid,

    /// What a speech synthesizer should say: intro plus lyrics.
    pub script: String,

    /// The bare lyrics, for services that compose music around them.
    pub lyrics: String,

    pub voice: Voice,

    /// Free-text style hint ("Happy Pop" etc.).
    pub style: String,
}

pub trait LyricsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Performs one attempt. Must not retry internally.
    fn generate(&self, job: &LyricsJob) -> BoxFuture<Result<String, ProviderFailure>>;
}

/// What an audio provider hands back: a URL it hosts itself, or raw samples
/// this backend must store and serve.
#[derive(Clone, Debug)]
pub enum AudioPayload {
    Hosted(Url),
    Waveform(Vec<u8>),
}

pub trait AudioProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Performs one attempt. Must not retry internally.
    fn synthesize(&self, job: &AudioJob) -> BoxFuture<Result<AudioPayload, ProviderFailure>>;
}

/// Turns a non-2xx response into a [`ProviderFailure`] carrying the body as
/// the message.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderFailure> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();

    Err(ProviderFailure::from_status(status.as_u16(), message))
}

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1/";

const LYRICS_SYSTEM_PROMPT: &str = "You are a creative songwriter specializing in personalized birthday songs. Generate only the lyrics without any additional formatting, explanations, or music notation.";

/// Chat-completion lyrics generation.
pub struct GroqLyrics {
    client: Client,
    key: String,
    endpoint: Url,
    model: String,
}

impl GroqLyrics {
    pub fn new(
        client: Client,
        base: &Url,
        key: String,
        model: String,
    ) -> Result<Self, url::ParseError> {
        Ok(GroqLyrics {
            client,
            key,
            endpoint: base.join("chat/completions")?,
            model,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl LyricsProvider for GroqLyrics {
    fn name(&self) -> &'static str {
        "groq-chat"
    }

    fn generate(&self, job: &LyricsJob) -> BoxFuture<Result<String, ProviderFailure>> {
        let prompt = job.prompt.clone();

        async move {
            let body = ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: LYRICS_SYSTEM_PROMPT,
                    },
                    ChatMessage {
                        role: "user",
                        content: &prompt,
                    },
                ],
                temperature: 0.8,
                max_tokens: 600,
                top_p: 1.0,
            };

            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(&self.key)
                .json(&body)
                .send()
                .await?;
            let response = ensure_success(response).await?;

            let parsed: ChatResponse = response.json().await?;

            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .filter(|content| !content.trim().is_empty())
                .ok_or_else(|| ProviderFailure::empty_payload("completion contained no content"))
        }
        .boxed()
    }
}

/// Speech synthesis on the primary vendor's hosted voices.
pub struct GroqSpeech {
    client: Client,
    key: String,
    endpoint: Url,
    model: String,
}

impl GroqSpeech {
    pub fn new(
        client: Client,
        base: &Url,
        key: String,
        model: String,
    ) -> Result<Self, url::ParseError> {
        Ok(GroqSpeech {
            client,
            key,
            endpoint: base.join("audio/speech")?,
            model,
        })
    }

    fn voice_for(voice: Voice) -> &'static str {
        match voice {
            Voice::Female => "Arista-PlayAI",
            Voice::Male => "Fritz-PlayAI",
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

impl AudioProvider for GroqSpeech {
    fn name(&self) -> &'static str {
        "groq-speech"
    }

    fn synthesize(&self, job: &AudioJob) -> BoxFuture<Result<AudioPayload, ProviderFailure>> {
        let script = job.script.clone();
        let voice = job.voice;

        async move {
            let body = SpeechRequest {
                model: &self.model,
                voice: Self::voice_for(voice),
                input: &script,
                response_format: "wav",
            };

            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(&self.key)
                .json(&body)
                .send()
                .await?;
            let response = ensure_success(response).await?;

            let raw = response.bytes().await?;

            Ok(AudioPayload::Waveform(raw.to_vec()))
        }
        .boxed()
    }
}

pub const MUSIC_API_BASE: &str = "https://api.minimaxi.com/";
pub const MUSIC_MODEL: &str = "music-2.0";

/// Full-track composition: the service sings the lyrics and hosts the
/// result itself.
pub struct MusicComposer {
    client: Client,
    key: String,
    endpoint: Url,
    model: String,
}

impl MusicComposer {
    pub fn new(
        client: Client,
        base: &Url,
        key: String,
        model: String,
    ) -> Result<Self, url::ParseError> {
        Ok(MusicComposer {
            client,
            key,
            endpoint: base.join("v1/music_generation")?,
            model,
        })
    }
}

#[derive(Serialize)]
struct ComposeRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    lyrics: &'a str,
    audio_setting: ComposeAudioSetting,
}

#[derive(Serialize)]
struct ComposeAudioSetting {
    sample_rate: u32,
    bitrate: u32,
    format: &'static str,
}

#[derive(Deserialize)]
struct ComposeResponse {
    data: ComposeData,
}

#[derive(Deserialize)]
struct ComposeData {
    audio_url: Option<String>,
}

impl AudioProvider for MusicComposer {
    fn name(&self) -> &'static str {
        "music-composer"
    }

    fn synthesize(&self, job: &AudioJob) -> BoxFuture<Result<AudioPayload, ProviderFailure>> {
        let lyrics = job.lyrics.clone();
        let style = job.style.clone();

        async move {
            let prompt = format!("A {} birthday song", style);
            let body = ComposeRequest {
                model: &self.model,
                prompt: &prompt,
                lyrics: &lyrics,
                audio_setting: ComposeAudioSetting {
                    sample_rate: 44100,
                    bitrate: 256000,
                    format: "mp3",
                },
            };

            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(&self.key)
                .json(&body)
                .send()
                .await?;
            let response = ensure_success(response).await?;

            let parsed: ComposeResponse = response.json().await?;
            let raw_url = parsed
                .data
                .audio_url
                .ok_or_else(|| ProviderFailure::empty_payload("composition carried no audio URL"))?;

            let url = Url::parse(&raw_url).map_err(|e| {
                ProviderFailure::empty_payload(format!("malformed audio URL {:?}: {}", raw_url, e))
            })?;

            Ok(AudioPayload::Hosted(url))
        }
        .boxed()
    }
}

pub const SECOND_VOICE_API_BASE: &str = "https://api.elevenlabs.io/";

const SECOND_VOICE_MODEL: &str = "eleven_multilingual_v2";
const SECOND_VOICE_MALE: &str = "pNInz6obpgDQGcFmaJgB";
const SECOND_VOICE_FEMALE: &str = "EXAVITQu4vr4xnSDxMaL";

/// Speech synthesis on the second vendor, used when the primary vendor's
/// voices are down or refused.
pub struct SecondVoice {
    client: Client,
    key: String,
    base: Url,
}

impl SecondVoice {
    pub fn new(client: Client, base: &Url, key: String) -> Self {
        SecondVoice {
            client,
            key,
            base: base.clone(),
        }
    }

    fn voice_for(voice: Voice) -> &'static str {
        match voice {
            Voice::Male => SECOND_VOICE_MALE,
            Voice::Female => SECOND_VOICE_FEMALE,
        }
    }
}

#[derive(Serialize)]
struct SecondVoiceRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl AudioProvider for SecondVoice {
    fn name(&self) -> &'static str {
        "second-voice"
    }

    fn synthesize(&self, job: &AudioJob) -> BoxFuture<Result<AudioPayload, ProviderFailure>> {
        let script = job.script.clone();
        let voice = job.voice;

        async move {
            let endpoint = self
                .base
                .join(&format!("v1/text-to-speech/{}", Self::voice_for(voice)))
                .map_err(|e| ProviderFailure::empty_payload(format!("malformed endpoint: {}", e)))?;

            let body = SecondVoiceRequest {
                text: &script,
                model_id: SECOND_VOICE_MODEL,
            };

            let response = self
                .client
                .post(endpoint)
                .header("xi-api-key", &self.key)
                .json(&body)
                .send()
                .await?;
            let response = ensure_success(response).await?;

            let raw = response.bytes().await?;

            Ok(AudioPayload::Waveform(raw.to_vec()))
        }
        .boxed()
    }
}
