// Media host upload client
//
// Unsigned uploads to a Cloudinary-style host: a multipart POST carrying
// the file, an upload preset, and a target folder. The host answers with
// the public URL of the stored asset.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Asset class requested from the media host.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Raw,
    #[default]
    Auto,
}

impl MediaKind {
    /// Guess the asset class from a file extension.
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "svg" => Self::Image,
            "mp4" | "mov" | "webm" | "mkv" | "avi" => Self::Video,
            "pdf" | "txt" | "doc" | "docx" | "zip" => Self::Raw,
            _ => Self::Auto,
        }
    }
}

/// A stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub secure_url: String,
    #[serde(default)]
    pub public_id: Option<String>,
}

/// Client for the media host's unsigned upload endpoint.
#[derive(Clone)]
pub struct MediaUploader {
    http: reqwest::Client,
    upload_url: Url,
    preset: String,
    folder: Option<String>,
}

impl MediaUploader {
    pub fn new(
        upload_url: Url,
        preset: impl Into<String>,
        folder: Option<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self::with_client(
            transport.build_client()?,
            upload_url,
            preset,
            folder,
        ))
    }

    pub fn with_client(
        http: reqwest::Client,
        upload_url: Url,
        preset: impl Into<String>,
        folder: Option<String>,
    ) -> Self {
        Self {
            http,
            upload_url,
            preset: preset.into(),
            folder,
        }
    }

    /// Upload `bytes` and return the hosted asset.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        kind: MediaKind,
    ) -> Result<UploadedAsset, Error> {
        let size = bytes.len();
        let part = Part::bytes(bytes).file_name(file_name.to_owned());
        let mut form = Form::new()
            .part("file", part)
            .text("upload_preset", self.preset.clone())
            .text("resource_type", kind.to_string());
        if let Some(ref folder) = self.folder {
            form = form.text("folder", folder.clone());
        }

        debug!(file = file_name, size, %kind, "uploading media");
        let resp = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        if !status.is_success() {
            return Err(Error::Upload {
                message: host_error(&body).unwrap_or_else(|| format!("HTTP {status}")),
            });
        }

        let asset: UploadedAsset =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("media host response: {e}"),
                body: body.clone(),
            })?;
        if asset.secure_url.is_empty() {
            return Err(Error::Upload {
                message: "media host returned no asset URL".into(),
            });
        }

        info!(file = file_name, url = %asset.secure_url, "media uploaded");
        Ok(asset)
    }
}

/// Cloudinary error bodies: `{ "error": { "message": "..." } }`.
fn host_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(serde_json::Value::as_str)
        .map(String::from)
}
