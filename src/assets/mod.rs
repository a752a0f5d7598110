pub mod upload;

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Handle to an image held by the [`TextureStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureKey(u64);

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read image at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

/// RGBA8 pixels decoded from an uploaded file.
#[derive(Clone)]
pub struct DecodedImage {
    pub name: String,
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
    pub digest: [u8; 32],
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

pub fn decode_image_bytes(name: &str, bytes: &[u8]) -> Result<DecodedImage, AssetError> {
    let digest: [u8; 32] = Sha256::digest(bytes).into();
    let rgba = image::load_from_memory(bytes)
        .map_err(|source| AssetError::Decode {
            name: name.to_string(),
            source,
        })?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        name: name.to_string(),
        size: [width as usize, height as usize],
        rgba: rgba.into_raw(),
        digest,
    })
}

pub fn load_image_file(path: &Path) -> Result<DecodedImage, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("image");
    decode_image_bytes(name, &bytes)
}

struct TextureEntry {
    name: String,
    pixels: Option<Arc<egui::ColorImage>>,
    handle: Option<egui::TextureHandle>,
}

/// Uploaded images, deduplicated by content digest and registered with egui on demand.
#[derive(Default)]
pub struct TextureStore {
    entries: HashMap<TextureKey, TextureEntry>,
    by_digest: HashMap<[u8; 32], TextureKey>,
    next_key: u64,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, image: DecodedImage) -> TextureKey {
        if let Some(key) = self.by_digest.get(&image.digest) {
            log::debug!("Reusing texture for identical image {}", image.name);
            return *key;
        }
        let key = TextureKey(self.next_key);
        self.next_key += 1;
        let pixels = egui::ColorImage::from_rgba_unmultiplied(image.size, &image.rgba);
        self.entries.insert(
            key,
            TextureEntry {
                name: image.name,
                pixels: Some(Arc::new(pixels)),
                handle: None,
            },
        );
        self.by_digest.insert(image.digest, key);
        key
    }

    pub fn name(&self, key: TextureKey) -> Option<&str> {
        self.entries.get(&key).map(|entry| entry.name.as_str())
    }

    /// GPU texture id, available once [`Self::upload_pending`] has run for the key.
    pub fn texture_id(&self, key: TextureKey) -> Option<egui::TextureId> {
        self.entries
            .get(&key)
            .and_then(|entry| entry.handle.as_ref())
            .map(|handle| handle.id())
    }

    pub fn upload_pending(&mut self, ctx: &egui::Context) {
        for (key, entry) in &mut self.entries {
            let Some(pixels) = entry.pixels.take() else {
                continue;
            };
            let handle = ctx.load_texture(
                format!("upload-{}-{}", key.0, entry.name),
                pixels,
                egui::TextureOptions::LINEAR_REPEAT,
            );
            entry.handle = Some(handle);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn png_bytes(color: [u8; 4]) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba(color));
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_to_rgba() {
        let decoded = decode_image_bytes("red.png", &png_bytes([255, 0, 0, 255])).unwrap();
        assert_eq!(decoded.size, [2, 2]);
        assert_eq!(decoded.rgba.len(), 16);
        assert_eq!(&decoded.rgba[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn rejects_malformed_bytes() {
        let err = decode_image_bytes("junk.png", b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn identical_images_share_a_key() {
        let mut store = TextureStore::new();
        let red = decode_image_bytes("a.png", &png_bytes([255, 0, 0, 255])).unwrap();
        let red_again = decode_image_bytes("b.png", &png_bytes([255, 0, 0, 255])).unwrap();
        let blue = decode_image_bytes("c.png", &png_bytes([0, 0, 255, 255])).unwrap();

        let first = store.insert(red);
        assert_eq!(store.insert(red_again), first);
        assert_ne!(store.insert(blue), first);
        assert_eq!(store.len(), 2);
        assert_eq!(store.name(first), Some("a.png"));
        assert!(!store.is_empty());
    }

    #[test]
    fn texture_ids_appear_after_upload() {
        let mut store = TextureStore::new();
        let key = store.insert(decode_image_bytes("a.png", &png_bytes([1, 2, 3, 255])).unwrap());
        assert!(store.texture_id(key).is_none());

        let ctx = egui::Context::default();
        store.upload_pending(&ctx);
        assert!(store.texture_id(key).is_some());
    }
}
