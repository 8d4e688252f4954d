//! Conversion of flattened form payloads into multipart bodies.

use reqwest::multipart::{Form, Part};
use wayfarer_core::{FormPayload, PayloadValue};

/// Build a multipart form with one part per payload field, in order.
pub(crate) fn to_form(payload: &FormPayload) -> Result<Form, reqwest::Error> {
    payload
        .fields()
        .iter()
        .try_fold(Form::new(), |form, field| match &field.value {
            PayloadValue::Text(text) => Ok(form.text(field.name.clone(), text.clone())),
            PayloadValue::File(image) => {
                let part = Part::bytes(image.bytes.clone())
                    .file_name(image.file_name.clone())
                    .mime_str(&image.content_type)?;
                Ok(form.part(field.name.clone(), part))
            }
        })
}
