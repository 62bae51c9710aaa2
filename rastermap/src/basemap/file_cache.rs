use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::debug;

use crate::basemap::BasemapProvider;
use crate::error::GisError;
use crate::tile_grid::TileIndex;

/// Encoding of a tile image, as reported by the server.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TileFormat {
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
}

impl TileFormat {
    const ALL: [TileFormat; 2] = [TileFormat::Png, TileFormat::Jpeg];

    /// File extension used for cache entries.
    pub fn extension(&self) -> &'static str {
        match self {
            TileFormat::Png => "png",
            TileFormat::Jpeg => "jpg",
        }
    }

    /// Format from a `Content-Type` header value.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("png") {
            Some(TileFormat::Png)
        } else if content_type.contains("jpeg") || content_type.contains("jpg") {
            Some(TileFormat::Jpeg)
        } else {
            None
        }
    }
}

/// Stores downloaded tiles as flat files `<provider>_<z>_<x>_<y>.<png|jpg>` in a folder.
///
/// Currently, there is no eviction mechanism. Several processes may share the folder: a tile
/// downloaded twice is simply written twice and the last write wins.
#[derive(Debug, Clone)]
pub struct TileCache {
    folder_path: PathBuf,
}

impl TileCache {
    /// Creates a new instance. The folder is created if it doesn't exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, GisError> {
        std::fs::create_dir_all(path.as_ref())?;
        Ok(Self {
            folder_path: path.as_ref().into(),
        })
    }

    /// Folder the tiles are stored in.
    pub fn folder(&self) -> &Path {
        &self.folder_path
    }

    /// Path of the entry for the given tile and format.
    pub fn entry_path(
        &self,
        provider: &BasemapProvider,
        index: TileIndex,
        format: TileFormat,
    ) -> PathBuf {
        self.folder_path.join(format!(
            "{}_{}_{}_{}.{}",
            provider.cache_key(),
            index.z,
            index.x,
            index.y,
            format.extension()
        ))
    }

    /// Returns the cached bytes of a tile, `None` on a cache miss.
    ///
    /// An entry that exists but cannot be read is an error.
    pub fn get(
        &self,
        provider: &BasemapProvider,
        index: TileIndex,
    ) -> Result<Option<Bytes>, GisError> {
        let Some(path) = TileFormat::ALL
            .iter()
            .map(|format| self.entry_path(provider, index, *format))
            .find(|path| path.exists())
        else {
            return Ok(None);
        };

        debug!("Loading tile {index} from cache file {path:?}");
        std::fs::read(&path)
            .map(|bytes| Some(bytes.into()))
            .map_err(|err| GisError::TileFetchFailure {
                index,
                reason: format!("failed to read cache entry {path:?}: {err}"),
            })
    }

    /// Writes the tile bytes into the cache.
    pub fn insert(
        &self,
        provider: &BasemapProvider,
        index: TileIndex,
        format: TileFormat,
        data: &Bytes,
    ) -> Result<(), GisError> {
        let file_path = self.entry_path(provider, index, format);
        debug!("Saving tile {index} to the cache file {file_path:?}");
        std::fs::create_dir_all(&self.folder_path)?;
        std::fs::write(&file_path, data)?;
        Ok(())
    }
}
