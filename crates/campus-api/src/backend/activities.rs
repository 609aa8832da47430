// Activity endpoints

use tracing::debug;

use super::BackendClient;
use super::models::{ActivityDoc, CreateActivityRequest, Created};
use crate::error::Error;

impl BackendClient {
    /// List all activities.
    ///
    /// `GET /api/activities`
    pub async fn list_activities(&self) -> Result<Vec<ActivityDoc>, Error> {
        let url = self.api_url("activities")?;
        let activities: Vec<ActivityDoc> = self.get(url).await?;
        debug!(count = activities.len(), "fetched activities");
        Ok(activities)
    }

    /// Create an activity. Returns the new document id when the backend
    /// reports one.
    ///
    /// `POST /api/activities`
    pub async fn create_activity(
        &self,
        req: &CreateActivityRequest,
    ) -> Result<Option<String>, Error> {
        let url = self.api_url("activities")?;
        let created: Option<Created> = self.post(url, req).await?;
        Ok(created.and_then(|c| c.id))
    }

    /// Delete an activity.
    ///
    /// `DELETE /api/activities/{id}`
    pub async fn delete_activity(&self, id: &str) -> Result<(), Error> {
        let url = self.item_url("activities", id)?;
        self.delete(url).await
    }
}
