//! The generation fallback orchestrator.
//!
//! Providers are held as an ordered list and attempted once each, in
//! priority order. A pure classifier (see [`outcome`]) decides after every
//! failure whether the chain advances or the request terminates. The lyrics
//! chain ends in a deterministic template that cannot fail; the audio chain
//! ends in a placeholder URL or a browser-synthesis instruction, depending
//! on deployment.

use std::sync::Arc;

use log::{debug, warn, Logger};
use reqwest::Client;
use url::Url;
use uuid::Uuid;

use crate::config::get_optional_variable;
use crate::errors::BackendError;
use crate::store::Store;
use crate::urls::Urls;
use crate::user::SongDetails;

pub mod outcome;
pub mod prompt;
pub mod provider;
pub mod template;

use outcome::Outcome;
use provider::{
    AudioJob, AudioPayload, AudioProvider, GroqLyrics, GroqSpeech, LyricsJob, LyricsProvider,
    MusicComposer, SecondVoice,
};

/// Spoken introduction prepended to synthesized speech.
const SPOKEN_INTRO: &str = "Here's your personalized birthday song!";

const DEFAULT_LYRICS_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_SPEECH_MODEL: &str = "playai-tts";

/// Credentials and endpoints for the primary vendor (lyrics LLM + speech).
#[derive(Clone, Debug)]
pub struct GroqSettings {
    pub api_key: String,
    pub base_url: Url,
    pub lyrics_model: String,
    pub speech_model: String,
}

/// Credentials and endpoint for the music-composition service.
#[derive(Clone, Debug)]
pub struct MusicSettings {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
}

/// Credentials and endpoint for the second speech vendor.
#[derive(Clone, Debug)]
pub struct SecondVoiceSettings {
    pub api_key: String,
    pub base_url: Url,
}

/// Deployment-time capability flags for the provider chains. A `None` means
/// the provider is simply not attempted; it is never an error.
#[derive(Clone, Debug, Default)]
pub struct ProviderSettings {
    pub groq: Option<GroqSettings>,
    pub music: Option<MusicSettings>,
    pub second_voice: Option<SecondVoiceSettings>,

    /// Static audio served when every provider fails. Configured in
    /// minimal-provider deployments; richer deployments leave it unset and
    /// let the client synthesize speech instead.
    pub fallback_audio_url: Option<Url>,
}

impl ProviderSettings {
    /// Reads the capability flags from the environment. Empty values count
    /// as absent.
    pub fn from_env() -> Self {
        let groq = get_optional_variable("GROQ_API_KEY").map(|api_key| GroqSettings {
            api_key,
            base_url: parse_base("GROQ_BASE_URL", provider::GROQ_API_BASE),
            lyrics_model: get_optional_variable("GROQ_LYRICS_MODEL")
                .unwrap_or_else(|| DEFAULT_LYRICS_MODEL.to_owned()),
            speech_model: get_optional_variable("GROQ_SPEECH_MODEL")
                .unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_owned()),
        });

        let music = get_optional_variable("MUSIC_API_KEY").map(|api_key| MusicSettings {
            api_key,
            base_url: parse_base("MUSIC_API_URL", provider::MUSIC_API_BASE),
            model: get_optional_variable("MUSIC_MODEL")
                .unwrap_or_else(|| provider::MUSIC_MODEL.to_owned()),
        });

        let second_voice =
            get_optional_variable("ELEVENLABS_API_KEY").map(|api_key| SecondVoiceSettings {
                api_key,
                base_url: parse_base("ELEVENLABS_BASE_URL", provider::SECOND_VOICE_API_BASE),
            });

        let fallback_audio_url = get_optional_variable("BACKEND_FALLBACK_AUDIO_URL")
            .map(|url| Url::parse(&url).expect("parse BACKEND_FALLBACK_AUDIO_URL"));

        ProviderSettings {
            groq,
            music,
            second_voice,
            fallback_audio_url,
        }
    }
}

fn parse_base(variable: &str, default: &str) -> Url {
    let raw = get_optional_variable(variable).unwrap_or_else(|| default.to_owned());

    Url::parse(&raw).unwrap_or_else(|_| panic!("parse {} as URL", variable))
}

/// Lyrics produced by the chain, tagged with the provider that made them.
/// `provider` is `None` for the deterministic template.
#[derive(Clone, Debug)]
pub struct GeneratedLyrics {
    pub lyrics: String,
    pub provider: Option<&'static str>,
}

/// Terminal outcome of the audio chain.
#[derive(Clone, Debug)]
pub enum AudioOutcome {
    /// A provider produced audio; the URL is ready to persist and return.
    Generated { url: Url, provider: &'static str },

    /// Every provider failed and the deployment configured a static
    /// placeholder track.
    Placeholder(Url),

    /// Every provider failed; the client must synthesize speech locally
    /// from the lyrics.
    BrowserSynthesis,
}

impl AudioOutcome {
    /// The URL to persist on the song, if any.
    pub fn url(&self) -> Option<&Url> {
        match self {
            AudioOutcome::Generated { url, .. } => Some(url),
            AudioOutcome::Placeholder(url) => Some(url),
            AudioOutcome::BrowserSynthesis => None,
        }
    }
}

/// Drives the ordered provider chains for lyrics and audio.
pub struct Generator {
    logger: Arc<Logger>,
    lyrics_chain: Vec<Box<dyn LyricsProvider>>,
    audio_chain: Vec<Box<dyn AudioProvider>>,
    fallback_audio_url: Option<Url>,
    store: Arc<dyn Store>,
    urls: Arc<Urls>,
}

impl Generator {
    /// Builds the chains in priority order from the deployment's capability
    /// flags: music composition, then primary-vendor speech, then the
    /// second vendor; lyrics use the primary vendor's LLM.
    pub fn new(
        logger: Arc<Logger>,
        settings: ProviderSettings,
        client: Client,
        store: Arc<dyn Store>,
        urls: Arc<Urls>,
    ) -> Result<Self, url::ParseError> {
        let mut lyrics_chain: Vec<Box<dyn LyricsProvider>> = vec![];
        let mut audio_chain: Vec<Box<dyn AudioProvider>> = vec![];

        if let Some(music) = &settings.music {
            audio_chain.push(Box::new(MusicComposer::new(
                client.clone(),
                &music.base_url,
                music.api_key.clone(),
                music.model.clone(),
            )?));
        }

        if let Some(groq) = &settings.groq {
            lyrics_chain.push(Box::new(GroqLyrics::new(
                client.clone(),
                &groq.base_url,
                groq.api_key.clone(),
                groq.lyrics_model.clone(),
            )?));
            audio_chain.push(Box::new(GroqSpeech::new(
                client.clone(),
                &groq.base_url,
                groq.api_key.clone(),
                groq.speech_model.clone(),
            )?));
        }

        if let Some(second) = &settings.second_voice {
            audio_chain.push(Box::new(SecondVoice::new(
                client,
                &second.base_url,
                second.api_key.clone(),
            )));
        }

        Ok(Generator::with_chains(
            logger,
            lyrics_chain,
            audio_chain,
            settings.fallback_audio_url,
            store,
            urls,
        ))
    }

    /// Assembles a generator from explicit chains. Tests use this to script
    /// providers deterministically.
    pub fn with_chains(
        logger: Arc<Logger>,
        lyrics_chain: Vec<Box<dyn LyricsProvider>>,
        audio_chain: Vec<Box<dyn AudioProvider>>,
        fallback_audio_url: Option<Url>,
        store: Arc<dyn Store>,
        urls: Arc<Urls>,
    ) -> Self {
        Generator {
            logger,
            lyrics_chain,
            audio_chain,
            fallback_audio_url,
            store,
            urls,
        }
    }

    /// Runs the lyrics chain. The only failure it can surface is an
    /// upstream rate limit; everything else degrades to the template.
    pub async fn generate_lyrics(
        &self,
        details: &SongDetails,
    ) -> Result<GeneratedLyrics, BackendError> {
        let job = LyricsJob {
            prompt: prompt::build(details),
        };

        for provider in &self.lyrics_chain {
            debug!(self.logger, "Attempting lyrics provider..."; "provider" => provider.name());

            match Outcome::from_attempt(provider.generate(&job).await) {
                Outcome::Success(lyrics) => {
                    debug!(self.logger, "Lyrics generated"; "provider" => provider.name());

                    return Ok(GeneratedLyrics {
                        lyrics,
                        provider: Some(provider.name()),
                    });
                }
                Outcome::RateLimited => {
                    warn!(self.logger, "Lyrics provider rate-limited"; "provider" => provider.name());

                    return Err(BackendError::RateLimited {
                        provider: provider.name(),
                    });
                }
                outcome => {
                    warn!(self.logger, "Lyrics provider failed"; "provider" => provider.name(), "outcome" => outcome.kind());
                }
            }
        }

        debug!(self.logger, "Falling back to template lyrics...");

        Ok(GeneratedLyrics {
            lyrics: template::render(details),
            provider: None,
        })
    }

    /// Runs the audio chain and publishes whatever it produces. Persistence
    /// of the resulting URL on the song is the caller's single write.
    pub async fn generate_audio(
        &self,
        song_id: &Uuid,
        details: &SongDetails,
        lyrics: &str,
    ) -> Result<AudioOutcome, BackendError> {
        let job = AudioJob {
            song_id: *song_id,
            script: format!("{} {}", SPOKEN_INTRO, lyrics),
            lyrics: lyrics.to_owned(),
            voice: details.singer_voice,
            style: format!("{} {}", details.mood.as_str(), details.genre.as_str()),
        };

        for provider in &self.audio_chain {
            debug!(self.logger, "Attempting audio provider..."; "provider" => provider.name(), "song_id" => %song_id);

            match Outcome::from_attempt(provider.synthesize(&job).await) {
                Outcome::Success(payload) => {
                    let url = self.publish(song_id, payload).await?;

                    debug!(self.logger, "Audio generated"; "provider" => provider.name(), "url" => %url);

                    return Ok(AudioOutcome::Generated {
                        url,
                        provider: provider.name(),
                    });
                }
                Outcome::RateLimited => {
                    warn!(self.logger, "Audio provider rate-limited"; "provider" => provider.name());

                    return Err(BackendError::RateLimited {
                        provider: provider.name(),
                    });
                }
                outcome => {
                    warn!(self.logger, "Audio provider failed"; "provider" => provider.name(), "outcome" => outcome.kind());
                }
            }
        }

        Ok(match &self.fallback_audio_url {
            Some(url) => AudioOutcome::Placeholder(url.clone()),
            None => AudioOutcome::BrowserSynthesis,
        })
    }

    async fn publish(&self, song_id: &Uuid, payload: AudioPayload) -> Result<Url, BackendError> {
        match payload {
            AudioPayload::Hosted(url) => Ok(url),
            AudioPayload::Waveform(raw) => {
                self.store
                    .save(song_id, self.urls.audio_file_name(song_id), raw)
                    .await?;

                Ok(self.urls.audio(song_id))
            }
        }
    }
}
