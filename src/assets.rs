//! Image asset collaborator.
//!
//! The `#image` macro never touches the filesystem itself: it asks an
//! [`ImageAssets`] implementation to resolve the author's reference into a
//! public URL and to measure the file. [`FsImageAssets`] copies images into a
//! public directory under content-hash names; [`NoImageAssets`] refuses every
//! image and is the default when a caller gives no collaborator.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no image directory is configured")]
    Unavailable,

    #[error("file not found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to access {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Where an image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub public_url: String,
    pub absolute_path: PathBuf,
}

/// Pixel dimensions, when the format could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

pub trait ImageAssets {
    /// Resolves `reference` (relative to the referring document `caller`) and
    /// makes the image publicly available.
    fn resolve(&self, reference: &str, caller: Option<&Path>) -> Result<ResolvedImage, AssetError>;

    fn read(&self, image: &ResolvedImage) -> Result<Vec<u8>, AssetError> {
        fs::read(&image.absolute_path).map_err(|source| AssetError::Io {
            path: image.absolute_path.clone(),
            source,
        })
    }

    fn measure(&self, bytes: &[u8]) -> ImageDimensions {
        measure_bytes(bytes)
    }
}

/// Reads the dimensions from an image header; unknown formats yield `None`s.
pub fn measure_bytes(bytes: &[u8]) -> ImageDimensions {
    match imagesize::blob_size(bytes) {
        Ok(size) => ImageDimensions {
            width: u32::try_from(size.width).ok(),
            height: u32::try_from(size.height).ok(),
        },
        Err(_) => ImageDimensions::default(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoImageAssets;

impl ImageAssets for NoImageAssets {
    fn resolve(&self, _reference: &str, _caller: Option<&Path>) -> Result<ResolvedImage, AssetError> {
        Err(AssetError::Unavailable)
    }
}

/// Copies referenced images into `public_dir`.
///
/// References starting with `/` are relative to `content_root`; all others are
/// relative to the directory of the referring document. In check mode nothing
/// is copied and the resolved path is the source file itself.
#[derive(Debug, Clone)]
pub struct FsImageAssets {
    content_root: PathBuf,
    public_dir: PathBuf,
    url_prefix: String,
    copy: bool,
}

impl FsImageAssets {
    pub fn new(
        content_root: impl Into<PathBuf>,
        public_dir: impl Into<PathBuf>,
        url_prefix: impl Into<String>,
    ) -> Self {
        Self {
            content_root: content_root.into(),
            public_dir: public_dir.into(),
            url_prefix: url_prefix.into(),
            copy: true,
        }
    }

    /// Resolves and measures without writing to the public directory.
    pub fn check_only(mut self) -> Self {
        self.copy = false;
        self
    }

    fn source_path(&self, reference: &str, caller: Option<&Path>) -> PathBuf {
        if let Some(rooted) = reference.strip_prefix('/') {
            return self.content_root.join(rooted);
        }
        let base = caller
            .and_then(Path::parent)
            .unwrap_or(self.content_root.as_path());
        base.join(reference)
    }
}

impl ImageAssets for FsImageAssets {
    fn resolve(&self, reference: &str, caller: Option<&Path>) -> Result<ResolvedImage, AssetError> {
        let source = self.source_path(reference, caller);
        if !source.is_file() {
            return Err(AssetError::NotFound { path: source });
        }
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| AssetError::Io { path, source }
        };

        let bytes = fs::read(&source).map_err(io_error(&source))?;
        let hash = format!("{:x}", Sha256::digest(&bytes));
        let file_name = match source.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{}.{}", &hash[..16], ext.to_lowercase()),
            None => hash[..16].to_string(),
        };

        let public_url = format!("{}/{}", self.url_prefix.trim_end_matches('/'), file_name);
        if !self.copy {
            return Ok(ResolvedImage {
                public_url,
                absolute_path: source,
            });
        }

        fs::create_dir_all(&self.public_dir).map_err(io_error(&self.public_dir))?;
        let target = self.public_dir.join(&file_name);
        if !target.exists() {
            fs::write(&target, &bytes).map_err(io_error(&target))?;
            debug!("copied {} to {}", source.display(), target.display());
        }

        Ok(ResolvedImage {
            public_url,
            absolute_path: target,
        })
    }
}
