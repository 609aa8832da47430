// ── Console services ──
//
// Thin facade over the document backend and media host: listing with the
// console's grouping and filtering, and command routing for writes.

use std::collections::BTreeMap;

use campus_api::backend::{CreateActivityRequest, CreateImageRequest, SendNotificationRequest};
use campus_api::{BackendClient, MediaKind, MediaUploader, TransportConfig};
use tracing::{debug, info};

use crate::command::{Command, CommandResult};
use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::model::{
    AcademicYear, Activity, ActivityQuery, GalleryImage, Notification, YearGroup,
};

/// Entry point for the console's document features.
#[derive(Clone)]
pub struct Console {
    backend: BackendClient,
    media: Option<MediaUploader>,
}

impl Console {
    /// Build clients from configuration. Fails if no backend URL is set.
    pub fn new(config: &ConsoleConfig) -> Result<Self, CoreError> {
        let backend_url = config
            .backend_url
            .clone()
            .ok_or_else(|| CoreError::config("no backend URL configured"))?;
        let transport = TransportConfig::with_timeout(config.timeout);

        let backend = BackendClient::new(backend_url, &transport)?;
        let media = config
            .media
            .as_ref()
            .map(|m| {
                MediaUploader::new(
                    m.upload_url.clone(),
                    m.preset.clone(),
                    m.folder.clone(),
                    &transport,
                )
            })
            .transpose()?;

        Ok(Self { backend, media })
    }

    /// Build from pre-constructed clients.
    pub fn with_clients(backend: BackendClient, media: Option<MediaUploader>) -> Self {
        Self { backend, media }
    }

    /// Wake the backend and confirm it answers.
    pub async fn ping(&self) -> Result<(), CoreError> {
        self.backend.wakeup().await?;
        Ok(())
    }

    // ── Listings ─────────────────────────────────────────────────────

    /// Activities matching `query`, grouped by academic year in year order.
    /// Activities with an unrecognized year come last.
    pub async fn activities(&self, query: &ActivityQuery) -> Result<Vec<YearGroup>, CoreError> {
        let docs = self.backend.list_activities().await?;

        let mut by_year: BTreeMap<AcademicYear, Vec<Activity>> = BTreeMap::new();
        let mut unassigned = Vec::new();
        for activity in docs.into_iter().map(Activity::from) {
            if !query.accepts(&activity) {
                continue;
            }
            match activity.year {
                Some(year) => by_year.entry(year).or_default().push(activity),
                None => unassigned.push(activity),
            }
        }

        let mut groups: Vec<YearGroup> = by_year
            .into_iter()
            .map(|(year, activities)| YearGroup {
                year: Some(year),
                activities,
            })
            .collect();
        if !unassigned.is_empty() {
            groups.push(YearGroup {
                year: None,
                activities: unassigned,
            });
        }
        debug!(groups = groups.len(), "listed activities");
        Ok(groups)
    }

    /// Gallery images, optionally filtered by name.
    pub async fn images(&self, search: Option<&str>) -> Result<Vec<GalleryImage>, CoreError> {
        let images = self.backend.list_images().await?;
        Ok(images
            .into_iter()
            .map(GalleryImage::from)
            .filter(|img| search.is_none_or(|s| img.matches(s)))
            .collect())
    }

    /// Sent notifications, optionally for one receiver.
    pub async fn notifications(
        &self,
        receiver: Option<&str>,
    ) -> Result<Vec<Notification>, CoreError> {
        let docs = self.backend.list_notifications().await?;
        Ok(docs
            .into_iter()
            .map(Notification::from)
            .filter(|n| receiver.is_none_or(|r| n.receiver.eq_ignore_ascii_case(r)))
            .collect())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Execute a write command.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        info!(command = %cmd.describe(), "executing command");
        match cmd {
            Command::CreateActivity(activity) => {
                activity.validate()?;
                let req = CreateActivityRequest {
                    name: activity.name,
                    year: activity.year.number().to_string(),
                    start_date: activity.start_date.format("%Y-%m-%d").to_string(),
                    end_date: activity.end_date.format("%Y-%m-%d").to_string(),
                    description: activity.description,
                };
                let id = self.backend.create_activity(&req).await?;
                Ok(CommandResult::Created { id })
            }
            Command::DeleteActivity { id } => {
                self.backend.delete_activity(&id).await?;
                Ok(CommandResult::Ok)
            }
            Command::ImportCalendar { file_name, bytes } => {
                if bytes.is_empty() {
                    return Err(CoreError::validation("calendar file is empty"));
                }
                let import = self.backend.upload_calendar(&file_name, bytes).await?;
                Ok(CommandResult::CalendarImported(import))
            }
            Command::UploadImage {
                name,
                file_name,
                bytes,
            } => {
                let name = non_empty(name, "image name")?;
                let url = self.upload(&file_name, bytes, MediaKind::Image).await?;
                let id = self
                    .backend
                    .create_image(&CreateImageRequest {
                        name,
                        image_url: url.clone(),
                    })
                    .await?;
                Ok(CommandResult::Uploaded { id, url })
            }
            Command::AddImageUrl { name, url } => {
                let name = non_empty(name, "image name")?;
                let id = self
                    .backend
                    .create_image(&CreateImageRequest {
                        name,
                        image_url: url,
                    })
                    .await?;
                Ok(CommandResult::Created { id })
            }
            Command::DeleteImage { id } => {
                self.backend.delete_image(&id).await?;
                Ok(CommandResult::Ok)
            }
            Command::SendNotification(notification) => {
                let media_url = match notification.attachment {
                    Some(attachment) => {
                        let kind = MediaKind::from_file_name(&attachment.file_name);
                        Some(
                            self.upload(&attachment.file_name, attachment.bytes, kind)
                                .await?,
                        )
                    }
                    None => None,
                };
                let req = SendNotificationRequest {
                    sender: notification.sender,
                    receiver: notification.receiver.to_string(),
                    message: notification.message,
                    media_url: media_url.clone(),
                };
                let id = self.backend.send_notification(&req).await?;
                Ok(match media_url {
                    Some(url) => CommandResult::Uploaded { id, url },
                    None => CommandResult::Created { id },
                })
            }
            Command::DeleteNotification { id } => {
                self.backend.delete_notification(&id).await?;
                Ok(CommandResult::Ok)
            }
        }
    }

    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        kind: MediaKind,
    ) -> Result<String, CoreError> {
        let uploader = self
            .media
            .as_ref()
            .ok_or_else(|| CoreError::config("no media host configured"))?;
        if bytes.is_empty() {
            return Err(CoreError::validation(format!("{file_name} is empty")));
        }
        let asset = uploader.upload(file_name, bytes, kind).await?;
        Ok(asset.secure_url)
    }
}

fn non_empty(value: String, what: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_owned())
}
