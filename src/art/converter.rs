use super::GlyphArt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ArtError {
    #[error("artwork download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("artwork could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
}

/// Anything that can turn an artwork URL into glyph art.
/// Implementations swallow their own failures and hand back the placeholder.
#[allow(async_fn_in_trait)]
pub trait ArtSource {
    async fn convert(&self, url: &str) -> GlyphArt;
}

#[derive(Debug, Clone)]
pub struct ArtworkConverter {
    http: reqwest::Client,
    width: u32,
}

impl ArtworkConverter {
    pub fn new(http: reqwest::Client, width: u32) -> Self {
        Self { http, width }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    async fn try_convert(&self, url: &str) -> Result<GlyphArt, ArtError> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let image = image::load_from_memory(&bytes)?;
        debug!("Decoded artwork {}x{} from {}", image.width(), image.height(), url);

        Ok(GlyphArt::from_image(&image, self.width))
    }
}

impl ArtSource for ArtworkConverter {
    async fn convert(&self, url: &str) -> GlyphArt {
        match self.try_convert(url).await {
            Ok(art) => art,
            Err(e) => {
                warn!("Using placeholder art for {}: {}", url, e);
                GlyphArt::placeholder()
            }
        }
    }
}
