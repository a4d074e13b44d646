use crate::preview::interface::{PreviewHandle, PreviewImage, PreviewStore};
use crate::selected_file::SelectedFile;
use image::GenericImageView;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub struct PreviewStoreMemory {
    max_dimension: u32,
    previews: Mutex<Previews>,
}

/// Handles only grow, so a decode that finishes after its release is at or below
/// `released_up_to` and is dropped.
#[derive(Default)]
struct Previews {
    images: HashMap<PreviewHandle, PreviewImage>,
    released_up_to: Option<PreviewHandle>,
}

impl PreviewStoreMemory {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            previews: Mutex::new(Previews::default()),
        }
    }

    fn decode(&self, file: &SelectedFile) -> Result<PreviewImage, image::ImageError> {
        let decoded = image::load_from_memory(&file.bytes)?;
        let (width, height) = decoded.dimensions();
        let resized = if width.max(height) > self.max_dimension {
            decoded.thumbnail(self.max_dimension, self.max_dimension)
        } else {
            decoded
        };
        let rgba = resized.to_rgba8();

        Ok(PreviewImage {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }
}

impl PreviewStore for PreviewStoreMemory {
    fn create(
        &self,
        handle: PreviewHandle,
        file: &SelectedFile,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let preview = self.decode(file)?;
        let mut previews = self.previews.lock().unwrap_or_else(PoisonError::into_inner);
        if previews.released_up_to >= Some(handle) {
            return Ok(());
        }
        previews.images.insert(handle, preview);
        Ok(())
    }

    fn release(&self, handle: PreviewHandle) {
        let mut previews = self.previews.lock().unwrap_or_else(PoisonError::into_inner);
        previews.images.remove(&handle);
        previews.released_up_to = previews.released_up_to.max(Some(handle));
    }

    fn get(&self, handle: PreviewHandle) -> Option<PreviewImage> {
        self.previews
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .images
            .get(&handle)
            .cloned()
    }

    fn len(&self) -> usize {
        self.previews
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .images
            .len()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::io::Cursor;

    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 60, 90, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_create_and_release() {
        let store = PreviewStoreMemory::new(256);
        let file = SelectedFile::new("photo.png", "image/png", png_bytes(4, 3));

        store.create(PreviewHandle(1), &file).unwrap();

        let preview = store.get(PreviewHandle(1)).unwrap();
        assert_eq!((preview.width, preview.height), (4, 3));
        assert_eq!(preview.rgba.len(), 4 * 3 * 4);

        store.release(PreviewHandle(1));
        assert!(store.get(PreviewHandle(1)).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_large_images_are_downsized() {
        let store = PreviewStoreMemory::new(16);
        let file = SelectedFile::new("wide.png", "image/png", png_bytes(64, 32));

        store.create(PreviewHandle(7), &file).unwrap();

        let preview = store.get(PreviewHandle(7)).unwrap();
        assert_eq!((preview.width, preview.height), (16, 8));
    }

    #[test]
    fn test_create_after_release_is_dropped() {
        let store = PreviewStoreMemory::new(256);
        let file = SelectedFile::new("photo.png", "image/png", png_bytes(4, 3));

        store.release(PreviewHandle(2));
        store.create(PreviewHandle(1), &file).unwrap();
        store.create(PreviewHandle(2), &file).unwrap();
        assert_eq!(store.len(), 0);

        store.create(PreviewHandle(3), &file).unwrap();
        assert!(store.get(PreviewHandle(3)).is_some());
    }

    #[test]
    fn test_undecodable_bytes_are_rejected() {
        let store = PreviewStoreMemory::new(256);
        let file = SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec());

        assert!(store.create(PreviewHandle(2), &file).is_err());
        assert_eq!(store.len(), 0);
    }
}
