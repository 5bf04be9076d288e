//! Multipart upload extraction
//!
//! [`UploadForm`] reads the whole multipart body before the handler runs:
//! text parts become fields, and the part named by the form's [`FileField`]
//! becomes the optional uploaded file. Nothing is written to disk here.

use crate::core::error::{Error, Result};
use axum::extract::{FromRequest, Multipart, Request};
use bytes::Bytes;
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::debug;

/// Names the multipart part that carries the file.
pub trait FileField: Send + Sync + 'static {
    const NAME: &'static str;
}

pub struct Thumbnail;

impl FileField for Thumbnail {
    const NAME: &'static str = "thumbnail";
}

pub struct Avatar;

impl FileField for Avatar {
    const NAME: &'static str = "avatar";
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Bytes,
}

pub struct UploadForm<F> {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
    _field: PhantomData<F>,
}

impl<F: FileField> UploadForm<F> {
    pub async fn parse(mut multipart: Multipart) -> Result<Self> {
        let mut fields = HashMap::new();
        let mut file = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();

            if name == F::NAME {
                let has_name = field.file_name().is_some_and(|n| !n.is_empty());
                let data = field.bytes().await?;

                // Browsers send an empty part when no file was picked
                if data.is_empty() && !has_name {
                    continue;
                }

                debug!("Upload part '{}' ({} bytes)", name, data.len());
                file = Some(UploadedFile { data });
            } else if !name.is_empty() {
                let value = field.text().await?;
                fields.insert(name, value);
            }
        }

        Ok(Self {
            fields,
            file,
            _field: PhantomData,
        })
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_text(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn take_file(&mut self) -> Option<UploadedFile> {
        self.file.take()
    }

    /// The file part, or a validation error naming the missing field.
    pub fn require_file(&mut self) -> Result<UploadedFile> {
        self.take_file()
            .ok_or_else(|| Error::Validation(format!("Missing `{}` file", F::NAME)))
    }
}

impl<S, F> FromRequest<S> for UploadForm<F>
where
    S: Send + Sync,
    F: FileField,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| Error::Validation(e.body_text()))?;
        Self::parse(multipart).await
    }
}
