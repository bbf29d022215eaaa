use log::info;

use crate::post::post_model::Post;
use crate::post::post_service::PostService;
use crate::uploader::BlobStorage;
use crate::user::model::UserSnapshot;
use crate::utils::error::CustomError;

/// Image bytes pulled out of the creation form.
pub struct ImagePayload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Validated post creation: optional image upload, then one durable write.
///
/// Not idempotent: two identical invocations create two posts. If the
/// database write fails after an image was uploaded, the blob is left in
/// place; nothing references it and nothing cleans it up.
pub async fn create_post(
    user: Option<UserSnapshot>,
    text: &str,
    image: Option<ImagePayload>,
    blob_storage: &BlobStorage,
    post_service: &PostService,
) -> Result<Post, CustomError> {
    let user = user.ok_or_else(|| {
        CustomError::AuthenticationError("User not authenticated".to_string())
    })?;

    if text.trim().is_empty() {
        return Err(CustomError::ValidationError(
            "Post input is required".to_string(),
        ));
    }

    let image_url = match image {
        Some(image) if !image.is_empty() => {
            let url = blob_storage
                .upload_image(image.data, &image.file_name, image.content_type.as_deref())
                .await
                .map_err(|e| {
                    CustomError::CreationError(format!("Failed to upload post image: {e}"))
                })?;
            info!("Post image stored at {url}");
            Some(url)
        }
        _ => None,
    };

    post_service
        .create_post(user, text, image_url)
        .await
        .map_err(|e| CustomError::CreationError(format!("Failed to create post: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use mongodb::Client;
    use mongodb::options::{ClientOptions, ServerAddress};

    fn offline_post_service() -> PostService {
        let options = ClientOptions::builder()
            .hosts(vec![ServerAddress::Tcp {
                host: "localhost".to_string(),
                port: Some(27017),
            }])
            .build();
        PostService::new(&Client::with_options(options).unwrap())
    }

    fn blob_storage() -> BlobStorage {
        BlobStorage::new("testaccount".to_string(), STANDARD.encode(b"key"))
    }

    fn user() -> UserSnapshot {
        UserSnapshot {
            user_id: "u1".to_string(),
            user_image: "img".to_string(),
            first_name: "A".to_string(),
            last_name: None,
        }
    }

    #[actix_web::test]
    async fn fails_without_an_authenticated_identity() {
        let err = create_post(None, "hello", None, &blob_storage(), &offline_post_service())
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::AuthenticationError(_)));
    }

    #[actix_web::test]
    async fn fails_on_blank_text() {
        let err = create_post(
            Some(user()),
            "  \n ",
            None,
            &blob_storage(),
            &offline_post_service(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CustomError::ValidationError(_)));
    }

    #[test]
    fn zero_byte_image_counts_as_no_image() {
        let payload = ImagePayload {
            file_name: "empty.png".to_string(),
            content_type: Some("image/png".to_string()),
            data: Vec::new(),
        };
        assert!(payload.is_empty());
    }
}
