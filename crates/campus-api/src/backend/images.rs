// Gallery image endpoints

use super::BackendClient;
use super::models::{Created, CreateImageRequest, ImageDoc};
use crate::error::Error;

impl BackendClient {
    /// List gallery images.
    ///
    /// `GET /api/images`
    pub async fn list_images(&self) -> Result<Vec<ImageDoc>, Error> {
        let url = self.api_url("images")?;
        self.get(url).await
    }

    /// Register an already-hosted image in the gallery.
    ///
    /// `POST /api/images`
    pub async fn create_image(&self, req: &CreateImageRequest) -> Result<Option<String>, Error> {
        let url = self.api_url("images")?;
        let created: Option<Created> = self.post(url, req).await?;
        Ok(created.and_then(|c| c.id))
    }

    /// `DELETE /api/images/{id}`
    pub async fn delete_image(&self, id: &str) -> Result<(), Error> {
        let url = self.item_url("images", id)?;
        self.delete(url).await
    }
}
