// Room notification endpoints

use super::BackendClient;
use super::models::{Created, NotificationDoc, SendNotificationRequest};
use crate::error::Error;

impl BackendClient {
    /// Post a notification to a class.
    ///
    /// `POST /api/notification`
    pub async fn send_notification(
        &self,
        req: &SendNotificationRequest,
    ) -> Result<Option<String>, Error> {
        let url = self.api_url("notification")?;
        let created: Option<Created> = self.post(url, req).await?;
        Ok(created.and_then(|c| c.id))
    }

    /// `GET /api/notification`
    pub async fn list_notifications(&self) -> Result<Vec<NotificationDoc>, Error> {
        let url = self.api_url("notification")?;
        self.get(url).await
    }

    /// `DELETE /api/notification/{id}`
    pub async fn delete_notification(&self, id: &str) -> Result<(), Error> {
        let url = self.item_url("notification", id)?;
        self.delete(url).await
    }
}
