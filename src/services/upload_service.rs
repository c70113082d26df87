//! Image uploads for menu items and avatars.
//!
//! Every upload is decoded, re-encoded as JPEG and stored under
//! `media_root/uploads/{sha256}.jpg`, so identical images share one file.

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::models::UploadResponse;
use image::codecs::jpeg::JpegEncoder;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::PathBuf;

/// 5MB
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;
const JPEG_QUALITY: u8 = 85;
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];
const UPLOAD_DIR: &str = "uploads";

#[derive(Debug)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub hash: String,
    pub width: u32,
    pub height: u32,
}

impl ProcessedImage {
    pub fn file_name(&self) -> String {
        format!("{}.jpg", self.hash)
    }
}

/// Validate an uploaded file and re-encode it as JPEG.
pub fn process_image(data: &[u8], filename: &str) -> AppResult<ProcessedImage> {
    if data.is_empty() {
        return Err(AppError::field("file", "Empty file"));
    }
    if data.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::field(
            "file",
            format!("File too large: {} bytes (max {MAX_UPLOAD_SIZE})", data.len()),
        ));
    }
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::field(
            "file",
            format!("Unsupported format: {ext}. Supported: png, jpg, jpeg, webp"),
        ));
    }

    let img = image::load_from_memory(data)
        .map_err(|e| AppError::field("file", format!("Invalid image: {e}")))?;
    let (width, height) = (img.width(), img.height());

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| AppError::InternalError(format!("Image compression failed: {e}")))?;

    let hash = hex::encode(Sha256::digest(&bytes));
    Ok(ProcessedImage {
        bytes,
        hash,
        width,
        height,
    })
}

#[derive(Clone)]
pub struct UploadService {
    media_root: PathBuf,
    public_base_url: String,
}

impl UploadService {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            media_root: PathBuf::from(&config.media_root),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/{UPLOAD_DIR}/{file_name}", self.public_base_url)
    }

    pub async fn save_image(&self, data: &[u8], filename: &str) -> AppResult<UploadResponse> {
        let image = process_image(data, filename)?;
        let dir = self.media_root.join(UPLOAD_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::InternalError(format!("Cannot create media directory: {e}")))?;

        let file_name = image.file_name();
        let path = dir.join(&file_name);
        // Same content, same name: an existing file is already the right one.
        if tokio::fs::metadata(&path).await.is_err() {
            tokio::fs::write(&path, &image.bytes).await.map_err(|e| {
                log::error!("Writing upload {} failed: {e}", path.display());
                AppError::InternalError("Image upload failed".into())
            })?;
        }
        log::info!("Image uploaded: {file_name} ({}x{})", image.width, image.height);

        Ok(UploadResponse {
            url: self.public_url(&file_name),
            size: image.bytes.len() as u64,
            file_name,
            width: image.width,
            height: image.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
        out
    }

    #[test]
    fn test_png_is_reencoded_as_jpeg() {
        let processed = process_image(&png_bytes(8, 6), "jollof.PNG").unwrap();
        assert_eq!((processed.width, processed.height), (8, 6));
        assert_eq!(&processed.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(processed.hash.len(), 64);
        assert!(processed.file_name().ends_with(".jpg"));
    }

    #[test]
    fn test_same_content_same_name() {
        let a = process_image(&png_bytes(4, 4), "a.png").unwrap();
        let b = process_image(&png_bytes(4, 4), "b.png").unwrap();
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn test_rejects_bad_uploads() {
        assert!(process_image(&[], "a.png").is_err());
        assert!(process_image(&png_bytes(2, 2), "a.gif").is_err());
        assert!(process_image(b"not an image", "a.jpg").is_err());
        assert!(process_image(&vec![0u8; MAX_UPLOAD_SIZE + 1], "a.png").is_err());
    }

    #[test]
    fn test_public_url() {
        let svc = UploadService {
            media_root: PathBuf::from("media"),
            public_base_url: "https://cdn.example.com/media".into(),
        };
        assert_eq!(
            svc.public_url("abc.jpg"),
            "https://cdn.example.com/media/uploads/abc.jpg"
        );
    }
}
