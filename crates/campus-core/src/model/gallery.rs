use serde::Serialize;

/// A gallery image hosted on the media host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl GalleryImage {
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}
