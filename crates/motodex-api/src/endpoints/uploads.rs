//! Image upload endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::model::{FilePart, UploadedUrl, UploadedUrls};
use crate::request::RequestDescriptor;

/// Folder used when the caller does not pick one.
pub const DEFAULT_UPLOAD_FOLDER: &str = "user-uploads";

/// `/upload` routes.
#[derive(Debug, Clone, Copy)]
pub struct Uploads<'a> {
    client: &'a ApiClient,
}

impl<'a> Uploads<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Uploads one image and returns its URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn image(&self, image: FilePart, folder: Option<&str>) -> Result<String> {
        let request = RequestDescriptor::post("/upload/image").multipart(
            vec![("image".to_string(), image)],
            vec![folder_field(folder)],
        );
        let uploaded: UploadedUrl = self.client.execute(&request).await?;
        Ok(uploaded.url)
    }

    /// Uploads several images and returns their URLs in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn images(&self, images: Vec<FilePart>, folder: Option<&str>) -> Result<Vec<String>> {
        let files = images
            .into_iter()
            .map(|image| ("images".to_string(), image))
            .collect();
        let request =
            RequestDescriptor::post("/upload/images").multipart(files, vec![folder_field(folder)]);
        let uploaded: UploadedUrls = self.client.execute(&request).await?;
        Ok(uploaded.urls)
    }
}

fn folder_field(folder: Option<&str>) -> (String, String) {
    (
        "folder".to_string(),
        folder.unwrap_or(DEFAULT_UPLOAD_FOLDER).to_string(),
    )
}
