// Academic calendar ingestion
//
// The backend extracts activities from an uploaded PDF and stores them.
// Text extraction happens entirely server-side.

use reqwest::multipart::{Form, Part};
use tracing::info;

use super::BackendClient;
use super::models::CalendarImport;
use crate::error::Error;

impl BackendClient {
    /// Upload a calendar PDF.
    ///
    /// `POST /api/upload-calendar` (multipart field `pdf`)
    pub async fn upload_calendar(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<CalendarImport, Error> {
        let url = self.api_url("upload-calendar")?;
        let part = Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str("application/pdf")
            .map_err(Error::Transport)?;
        let form = Form::new().part("pdf", part);

        let import: CalendarImport = self.post_multipart(url, form).await?;
        info!(count = import.count, file = file_name, "calendar imported");
        Ok(import)
    }
}
