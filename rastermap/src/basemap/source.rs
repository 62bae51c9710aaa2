use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::basemap::file_cache::{TileCache, TileFormat};
use crate::basemap::BasemapProvider;
use crate::decoded_image::DecodedImage;
use crate::error::GisError;
use crate::tile_grid::TileIndex;

/// Source of basemap tile images.
pub trait TileSource {
    /// Loads the tile with the given index.
    fn load(&self, provider: &BasemapProvider, index: TileIndex) -> Result<DecodedImage, GisError>;
}

/// Tile source that loads tiles one by one with blocking HTTP GET requests.
///
/// If constructed with a [`TileCache`] it will cache the loaded tiles and only request new tiles
/// from the provider if they are not in the cache.
///
/// If configured to use offline mode, it will only use tiles from the cache without attempting to
/// load them from the provider.
pub struct RestTileSource {
    client: Client,
    cache: Option<TileCache>,
    offline_mode: bool,
}

impl RestTileSource {
    /// `User-Agent` header sent with every request.
    pub const USER_AGENT: &'static str = concat!("rastermap/", env!("CARGO_PKG_VERSION"));

    /// Request timeout used by [`RestTileSource::new`].
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a new instance of the source.
    pub fn new(cache: Option<TileCache>) -> Result<Self, GisError> {
        Self::with_timeout(cache, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a new instance with the given timeout for every request.
    pub fn with_timeout(cache: Option<TileCache>, timeout: Duration) -> Result<Self, GisError> {
        let client = Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            cache,
            offline_mode: false,
        })
    }

    /// If offline mode is enabled, the source will not attempt to download tiles, and will only
    /// use its cache as the source of data.
    pub fn set_offline_mode(&mut self, enabled: bool) {
        if enabled && self.cache.is_none() {
            log::warn!(
                "Offline mode for tile source is enabled, but no cache is configured. \
                No tiles will be available."
            )
        }

        self.offline_mode = enabled;
    }

    /// Cache the source reads from and writes to.
    pub fn cache(&self) -> Option<&TileCache> {
        self.cache.as_ref()
    }

    fn download_tile(
        &self,
        provider: &BasemapProvider,
        index: TileIndex,
    ) -> Result<(Bytes, TileFormat), GisError> {
        let url = provider.tile_url(index)?;
        let failure = |reason: String| GisError::TileFetchFailure { index, reason };

        log::info!("Loading {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| failure(format!("request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("{url} responded with {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let format = TileFormat::from_content_type(&content_type)
            .ok_or_else(|| failure(format!("unsupported tile type {content_type:?}")))?;

        let data = response
            .bytes()
            .map_err(|err| failure(format!("failed to read body of {url}: {err}")))?;

        Ok((data, format))
    }
}

impl TileSource for RestTileSource {
    fn load(&self, provider: &BasemapProvider, index: TileIndex) -> Result<DecodedImage, GisError> {
        if let Some(cache) = &self.cache {
            if let Some(data) = cache.get(provider, index)? {
                return DecodedImage::new(&data).map_err(|err| GisError::TileFetchFailure {
                    index,
                    reason: format!("cached tile is not a valid image: {err}"),
                });
            }
        }

        if self.offline_mode {
            return Err(GisError::TileFetchFailure {
                index,
                reason: format!("tile of {provider} is not cached and offline mode is on"),
            });
        }

        let (data, format) = self.download_tile(provider, index)?;
        let image = DecodedImage::new(&data).map_err(|err| GisError::TileFetchFailure {
            index,
            reason: format!("downloaded tile is not a valid image: {err}"),
        })?;

        if let Some(cache) = &self.cache {
            if let Err(error) = cache.insert(provider, index, format, &data) {
                log::warn!("Failed to write tile cache entry: {error:?}");
            }
        }

        Ok(image)
    }
}
