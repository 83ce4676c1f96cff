use url::Url;
use uuid::Uuid;

/// Convenience wrapper for URL generation functions.
#[derive(Clone, Debug)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,

    /// First path segment of every API route.
    pub(crate) api_path: String,

    /// Path under which synthesized waveforms are served.
    pub(crate) audio_path: String,

    /// File extension of synthesized waveforms.
    extension: String,
}

impl Urls {
    /// Creates a new instance. Neither path should include slashes.
    pub fn new(
        base: impl AsRef<str>,
        api_path: impl Into<String>,
        audio_path: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        let base =
            Url::parse(base.as_ref()).unwrap_or_else(|_| panic!("parse {} as URL", base.as_ref()));

        Urls {
            base,
            api_path: api_path.into(),
            audio_path: audio_path.into(),
            extension: extension.into(),
        }
    }

    /// The file name a stored waveform for the given song is saved under.
    pub fn audio_file_name(&self, id: &Uuid) -> String {
        format!("{}.{}", id, self.extension)
    }

    /// The public URL of the stored waveform for the given song.
    pub fn audio(&self, id: &Uuid) -> Url {
        let prefix = format!("{}/", self.audio_path);

        self.base
            .join(&prefix)
            .and_then(|url| url.join(&self.audio_file_name(id)))
            .unwrap_or_else(|_| panic!("get URL for audio of song {}", id))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::Urls;

    #[test]
    fn audio_urls_live_under_the_audio_path() {
        let urls = Urls::new("http://localhost:3000/", "api", "audio", "wav");
        let id = Uuid::new_v4();

        assert_eq!(
            urls.audio(&id).as_str(),
            format!("http://localhost:3000/audio/{}.wav", id)
        );
    }
}
