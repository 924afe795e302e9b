use crate::core::error::{BotError, FailureKind};
use crate::providers::ImageProvider;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub const NO_IMAGE_REASON: &str = "no URL or inline image data returned";

/// Something the messaging platform can display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Remote(String),
    LocalFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub kind: FailureKind,
    pub reason: String,
}

impl From<BotError> for GenerationFailure {
    fn from(err: BotError) -> Self {
        Self {
            kind: FailureKind::from(&err),
            reason: err.detail(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success(ImageRef),
    Failure(GenerationFailure),
}

/// Trailing annotation that makes every outbound prompt unique.
pub fn variance_suffix() -> String {
    format!("\n\n# variation:{}", Uuid::new_v4())
}

pub struct ImageGenerator {
    provider: Arc<dyn ImageProvider>,
    size: String,
    temp_dir: PathBuf,
}

impl ImageGenerator {
    pub fn new(provider: Arc<dyn ImageProvider>, size: impl Into<String>) -> Self {
        Self {
            provider,
            size: size.into(),
            temp_dir: std::env::temp_dir(),
        }
    }

    #[cfg(test)]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Never fails past this boundary: every error becomes a `Failure`.
    pub async fn generate(&self, prompt: &str) -> GenerationResult {
        match self.try_generate(prompt).await {
            Ok(image) => GenerationResult::Success(image),
            Err(err) => {
                let failure = GenerationFailure::from(err);
                debug!(kind = ?failure.kind, reason = %failure.reason, "image generation failed");
                GenerationResult::Failure(failure)
            }
        }
    }

    async fn try_generate(&self, prompt: &str) -> Result<ImageRef, BotError> {
        let request = format!("{}{}", prompt, variance_suffix());
        let payload = self
            .provider
            .generate_image(&request, &self.size, 1)
            .await?;

        if let Some(url) = payload.url {
            return Ok(ImageRef::Remote(url));
        }

        if let Some(b64) = payload.b64_json {
            let dir = self.temp_dir.clone();
            let path = tokio::task::spawn_blocking(move || persist_base64(&b64, &dir))
                .await
                .map_err(|e| BotError::Unknown(format!("temp file task: {}", e)))??;
            return Ok(ImageRef::LocalFile(path));
        }

        Err(BotError::Api(NO_IMAGE_REASON.to_string()))
    }
}

/// Decodes inline image bytes into a kept `pixbot-*.png` file.
fn persist_base64(b64: &str, dir: &Path) -> Result<PathBuf, BotError> {
    let bytes = BASE64.decode(b64.trim().as_bytes())?;
    let mut file = tempfile::Builder::new()
        .prefix("pixbot-")
        .suffix(".png")
        .tempfile_in(dir)?;
    file.write_all(&bytes)?;
    file.flush()?;
    let (_, path) = file.keep().map_err(|e| BotError::from(e.error))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ImagePayload;
    use crate::testing::FakeProvider;

    #[tokio::test]
    async fn prefers_url_and_sends_fixed_parameters() {
        let provider = Arc::new(FakeProvider::new(|| {
            Ok(ImagePayload {
                url: Some("https://img.example/1.png".into()),
                b64_json: Some("aGk=".into()),
            })
        }));
        let generator = ImageGenerator::new(provider.clone(), "1024x1024");

        let result = generator.generate("a red bicycle").await;
        assert_eq!(
            result,
            GenerationResult::Success(ImageRef::Remote("https://img.example/1.png".into()))
        );

        let requests = provider.requests.lock().unwrap();
        let (prompt, size, count) = &requests[0];
        assert!(prompt.starts_with("a red bicycle\n\n# variation:"));
        assert_eq!(size, "1024x1024");
        assert_eq!(*count, 1);
    }

    #[tokio::test]
    async fn identical_prompts_produce_distinct_requests() {
        let provider = Arc::new(FakeProvider::url("https://img.example/1.png"));
        let generator = ImageGenerator::new(provider.clone(), "1024x1024");

        generator.generate("same").await;
        generator.generate("same").await;

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert_ne!(prompts[0], prompts[1]);
        assert!(prompts.iter().all(|p| p.starts_with("same\n\n")));
    }

    #[tokio::test]
    async fn base64_fallback_writes_temp_png() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(|| {
            Ok(ImagePayload {
                url: None,
                b64_json: Some(BASE64.encode(b"\x89PNG fake")),
            })
        }));
        let generator = ImageGenerator::new(provider, "1024x1024").with_temp_dir(dir.path());

        let GenerationResult::Success(ImageRef::LocalFile(path)) = generator.generate("x").await
        else {
            panic!("expected a local file");
        };
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn bad_base64_is_a_decode_failure() {
        let provider = Arc::new(FakeProvider::new(|| {
            Ok(ImagePayload {
                url: None,
                b64_json: Some("!!not base64!!".into()),
            })
        }));
        let generator = ImageGenerator::new(provider, "1024x1024");

        let GenerationResult::Failure(failure) = generator.generate("x").await else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, FailureKind::Decode);
    }

    #[tokio::test]
    async fn empty_answer_has_fixed_reason() {
        let provider = Arc::new(FakeProvider::new(|| Ok(ImagePayload::default())));
        let generator = ImageGenerator::new(provider, "1024x1024");

        let GenerationResult::Failure(failure) = generator.generate("x").await else {
            panic!("expected failure");
        };
        assert_eq!(failure.reason, NO_IMAGE_REASON);
    }

    #[tokio::test]
    async fn provider_errors_are_caught_with_raw_message() {
        let provider = Arc::new(FakeProvider::failing("rate limit exceeded"));
        let generator = ImageGenerator::new(provider, "1024x1024");

        assert_eq!(
            generator.generate("x").await,
            GenerationResult::Failure(GenerationFailure {
                kind: FailureKind::Quota,
                reason: "rate limit exceeded".into(),
            })
        );
    }
}
