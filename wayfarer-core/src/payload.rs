//! Flat multipart payloads built from nested form state.
//!
//! The backend expects scalar fields under their own name, nested objects
//! under dotted keys (`location.city`), list fields repeated once per
//! element under the same key and image files under `images`. This module
//! only models the payload; the HTTP client turns it into a multipart body.

use crate::form::FormFields;

/// Field name used for uploaded image files.
pub const IMAGES_FIELD: &str = "images";
/// Text part asking the backend to drop stored images on update.
pub const REPLACE_IMAGES_FIELD: &str = "replace_images";

/// An image file selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name.
    pub file_name: String,
    /// MIME type sent with the part.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Wrap file contents, inferring the content type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_owned();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Value of one payload part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadValue {
    /// Text part.
    Text(String),
    /// File part.
    File(ImageUpload),
}

/// One named payload part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadField {
    /// Part name, possibly dotted.
    pub name: String,
    /// Part value.
    pub value: PayloadValue,
}

/// Ordered list of multipart parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<PayloadField>,
}

impl FormPayload {
    /// Empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `form` and append `images`.
    pub fn from_form<F: FormFields>(form: &F, images: &[ImageUpload]) -> Self {
        let mut payload = Self::new();
        form.write_payload(&mut payload);
        for image in images {
            payload.push_file(image.clone());
        }
        payload
    }

    /// Append a text part.
    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(PayloadField {
            name: name.into(),
            value: PayloadValue::Text(value.into()),
        });
    }

    /// Append a text part only when `value` is present.
    pub fn push_optional(&mut self, name: impl Into<String>, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.push_text(name, value.to_string());
        }
    }

    /// Append one part per element, all under `name`.
    pub fn push_list(&mut self, name: &str, values: &[String]) {
        for value in values {
            self.push_text(name, value.clone());
        }
    }

    /// Append an image under [`IMAGES_FIELD`].
    pub fn push_file(&mut self, image: ImageUpload) {
        self.fields.push(PayloadField {
            name: IMAGES_FIELD.to_owned(),
            value: PayloadValue::File(image),
        });
    }

    /// All parts, in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[PayloadField] {
        &self.fields
    }

    /// Consume the payload.
    #[must_use]
    pub fn into_fields(self) -> Vec<PayloadField> {
        self.fields
    }

    /// First text value under `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts(name).into_iter().next()
    }

    /// Every text value under `name`.
    #[must_use]
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.name == name)
            .filter_map(|field| match &field.value {
                PayloadValue::Text(text) => Some(text.as_str()),
                PayloadValue::File(_) => None,
            })
            .collect()
    }

    /// Number of file parts.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| matches!(field.value, PayloadValue::File(_)))
            .count()
    }
}
