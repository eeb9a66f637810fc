use std::fs;
use std::path::{Component, PathBuf};

use image::ImageFormat;
use rand::distributions::Alphanumeric;
use rand::Rng;
use thiserror::Error;
use url::Url;

use crate::config::AppConfig;

/// Folders an admin upload may land in.
pub const UPLOAD_FOLDERS: [&str; 3] = ["stores", "menu", "gallery"];

#[derive(Debug, Error, PartialEq)]
pub enum StorageError {
    #[error("图片大小不能超过 {}MB", .max_bytes / 1024 / 1024)]
    TooLarge { max_bytes: u64 },
    #[error("只能上传 JPEG、PNG 或 WebP 图片")]
    UnsupportedType,
    #[error("无效的上传目录: {0}")]
    InvalidFolder(String),
    #[error("无效的图片 URL")]
    InvalidUrl,
    #[error("{0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

/// Image files on local disk, served back under `url_prefix`.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
    max_bytes: u64,
}

/// Accepted formats, identified from the file's leading bytes.
pub fn sniff_extension(bytes: &[u8]) -> Result<&'static str, StorageError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok("jpg"),
        Ok(ImageFormat::Png) => Ok("png"),
        Ok(ImageFormat::WebP) => Ok("webp"),
        _ => Err(StorageError::UnsupportedType),
    }
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str, max_bytes: u64) -> Self {
        MediaStore {
            root: root.into(),
            url_prefix: format!("/{}", url_prefix.trim_matches('/')),
            max_bytes,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(&cfg.uploads_dir, &cfg.uploads_url_prefix, cfg.max_upload_bytes)
    }

    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Stores `bytes` as `<folder>/<millis>-<random>.<ext>` and returns its public URL.
    pub fn save(&self, folder: &str, bytes: &[u8]) -> Result<String, StorageError> {
        if !UPLOAD_FOLDERS.contains(&folder) {
            return Err(StorageError::InvalidFolder(folder.to_string()));
        }
        if bytes.len() as u64 > self.max_bytes {
            return Err(StorageError::TooLarge { max_bytes: self.max_bytes });
        }
        let ext = sniff_extension(bytes)?;

        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(|c| (c as char).to_ascii_lowercase())
            .collect();
        let name = format!("{}-{}.{}", chrono::Utc::now().timestamp_millis(), suffix, ext);

        let dir = self.root.join(folder);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(&name), bytes)?;
        log::info!("Stored upload {}/{} ({} bytes)", folder, name, bytes.len());
        Ok(format!("{}/{}/{}", self.url_prefix, folder, name))
    }

    /// Path below the uploads root for a URL produced by `save`. Absolute URLs
    /// are accepted as long as their path carries the uploads prefix.
    pub fn relative_path(&self, url: &str) -> Result<PathBuf, StorageError> {
        let path = match Url::parse(url) {
            Ok(u) => u.path().to_string(),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse("http://localhost/").map_err(|_| StorageError::InvalidUrl)?;
                base.join(url).map_err(|_| StorageError::InvalidUrl)?.path().to_string()
            }
            Err(_) => return Err(StorageError::InvalidUrl),
        };
        let rest = path
            .strip_prefix(&self.url_prefix)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or(StorageError::InvalidUrl)?;
        if rest.is_empty() || rest.contains('%') || rest.contains('\\') {
            return Err(StorageError::InvalidUrl);
        }
        let rel = PathBuf::from(rest);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(StorageError::InvalidUrl);
        }
        Ok(rel)
    }

    pub fn delete_by_url(&self, url: &str) -> Result<(), StorageError> {
        let rel = self.relative_path(url)?;
        fs::remove_file(self.root.join(&rel))?;
        log::info!("Deleted upload {}", rel.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    fn temp_store(max: u64) -> MediaStore {
        let dir = std::env::temp_dir().join(format!("chaolai-media-{}", uuid::Uuid::new_v4()));
        MediaStore::new(dir, "uploads", max)
    }

    #[test]
    fn sniffing_accepts_only_three_formats() {
        assert_eq!(sniff_extension(PNG_HEADER), Ok("png"));
        assert_eq!(sniff_extension(JPEG_HEADER), Ok("jpg"));
        assert_eq!(sniff_extension(b"GIF89a......"), Err(StorageError::UnsupportedType));
        assert_eq!(sniff_extension(b"<svg></svg>"), Err(StorageError::UnsupportedType));
    }

    #[test]
    fn save_then_delete() {
        let store = temp_store(1024);
        let url = store.save("menu", PNG_HEADER).unwrap();
        assert!(url.starts_with("/uploads/menu/"));
        assert!(url.ends_with(".png"));
        let rel = store.relative_path(&url).unwrap();
        assert!(store.root().join(&rel).exists());
        store.delete_by_url(&format!("http://example.com{}", url)).unwrap();
        assert!(!store.root().join(&rel).exists());
        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn limits_are_enforced() {
        let store = temp_store(4);
        assert_eq!(
            store.save("menu", PNG_HEADER),
            Err(StorageError::TooLarge { max_bytes: 4 })
        );
        assert!(matches!(store.save("../etc", PNG_HEADER), Err(StorageError::InvalidFolder(_))));
    }

    #[test]
    fn foreign_and_traversal_urls_are_refused() {
        let store = temp_store(1024);
        for url in [
            "/static/logo.png",
            "/uploads/",
            "/uploads/menu/a%2Fb.png",
            "https://cdn.example.com/other/menu/a.png",
            "/uploads/../db/chaolai.db",
        ] {
            assert_eq!(store.relative_path(url), Err(StorageError::InvalidUrl), "{}", url);
        }
        assert_eq!(
            store.relative_path("/uploads/stores/1700000000000-abc123.jpg").unwrap(),
            PathBuf::from("stores/1700000000000-abc123.jpg")
        );
    }
}
