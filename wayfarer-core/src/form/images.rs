//! Image staging for entity forms.
//!
//! Newly selected files are held in memory with a generated `blob:` preview
//! URL. Preview URLs are registered in a shared [`PreviewRegistry`] and
//! released when their [`PreviewUrl`] handle is dropped, so removing,
//! resetting or dropping a form never leaks a preview.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::payload::ImageUpload;

/// Maximum number of images (existing plus staged) per entity.
pub const MAX_IMAGES: usize = 5;

/// Tracks live preview URLs.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<String>>>,
}

impl PreviewRegistry {
    /// Allocate a fresh preview URL.
    #[must_use]
    pub fn create(&self) -> PreviewUrl {
        let url = format!("blob:wayfarer/{}", Uuid::new_v4());
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone());
        PreviewUrl {
            url,
            live: Arc::clone(&self.live),
        }
    }

    /// Number of previews not yet released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether `url` is still live.
    #[must_use]
    pub fn is_live(&self, url: &str) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }
}

/// A live preview URL; released on drop.
#[derive(Debug)]
pub struct PreviewUrl {
    url: String,
    live: Arc<Mutex<HashSet<String>>>,
}

impl PreviewUrl {
    /// The `blob:` URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.url);
    }
}

/// A selected file awaiting upload.
#[derive(Debug)]
pub struct StagedImage {
    upload: ImageUpload,
    preview: PreviewUrl,
}

impl StagedImage {
    /// File to upload.
    #[must_use]
    pub const fn upload(&self) -> &ImageUpload {
        &self.upload
    }

    /// Preview URL for display.
    #[must_use]
    pub fn preview_url(&self) -> &str {
        self.preview.as_str()
    }
}

/// Rejected attempt to exceed [`MAX_IMAGES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLimitExceeded {
    /// Images that would have been held after the attempt.
    pub attempted: usize,
}

/// Existing and newly staged images of one form.
#[derive(Debug, Default)]
pub struct ImageStaging {
    registry: PreviewRegistry,
    existing: Vec<String>,
    staged: Vec<StagedImage>,
}

impl ImageStaging {
    /// Empty staging area allocating previews from `registry`.
    #[must_use]
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            existing: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Replace the already persisted image references.
    pub fn set_existing(&mut self, images: Vec<String>) {
        self.existing = images;
    }

    /// Persisted image references.
    #[must_use]
    pub fn existing(&self) -> &[String] {
        &self.existing
    }

    /// Newly staged images.
    #[must_use]
    pub fn staged(&self) -> &[StagedImage] {
        &self.staged
    }

    /// Existing plus staged.
    #[must_use]
    pub fn total(&self) -> usize {
        self.existing.len() + self.staged.len()
    }

    /// Stage `uploads`, all or nothing.
    pub fn attach(&mut self, uploads: Vec<ImageUpload>) -> Result<usize, ImageLimitExceeded> {
        let attempted = self.total() + uploads.len();
        if attempted > MAX_IMAGES {
            return Err(ImageLimitExceeded { attempted });
        }
        let added = uploads.len();
        self.staged.extend(uploads.into_iter().map(|upload| StagedImage {
            upload,
            preview: self.registry.create(),
        }));
        Ok(added)
    }

    /// Drop a staged image and release its preview.
    pub fn discard_staged(&mut self, index: usize) -> Option<ImageUpload> {
        (index < self.staged.len()).then(|| self.staged.remove(index).upload)
    }

    /// Forget a persisted image after the backend removed it.
    pub fn forget_existing(&mut self, index: usize) -> Option<String> {
        (index < self.existing.len()).then(|| self.existing.remove(index))
    }

    /// Copies of the staged files, in order.
    #[must_use]
    pub fn uploads(&self) -> Vec<ImageUpload> {
        self.staged.iter().map(|image| image.upload.clone()).collect()
    }

    /// Release every preview and forget every image.
    pub fn clear(&mut self) {
        self.staged.clear();
        self.existing.clear();
    }
}
