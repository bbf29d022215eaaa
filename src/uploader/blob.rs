use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use log::info;
use sha2::Sha256;
use std::env;
use uuid::Uuid;

use crate::utils::error::CustomError;

type HmacSha256 = Hmac<Sha256>;

/// Container every post image lands in.
pub const CONTAINER_NAME: &str = "posts";

const STORAGE_API_VERSION: &str = "2022-11-02";

/// Azure Blob Storage client built on plain HTTPS. Write access is granted
/// per use through a service SAS token signed with the account key.
pub struct BlobStorage {
    account_name: String,
    account_key: String,
    client: reqwest::Client,
}

impl BlobStorage {
    pub fn new(account_name: String, account_key: String) -> Self {
        Self {
            account_name,
            account_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, CustomError> {
        let account_name = env::var("AZURE_STORAGE_NAME").map_err(|_| {
            CustomError::StorageError("AZURE_STORAGE_NAME is required".to_string())
        })?;
        let account_key = env::var("AZURE_STORAGE_ACCOUNT_KEY").map_err(|_| {
            CustomError::StorageError("AZURE_STORAGE_ACCOUNT_KEY is required".to_string())
        })?;
        Ok(Self::new(account_name, account_key))
    }

    fn base_url(&self) -> String {
        format!("https://{}.blob.core.windows.net", self.account_name)
    }

    /// Service SAS scoped to the posts container: read, create and write
    /// permissions with a distant expiry (100 years, matching the upstream
    /// token policy).
    pub fn generate_sas_token(&self) -> Result<String, CustomError> {
        let permissions = "rcw";
        let start = Utc::now();
        let expiry = start + Duration::days(365 * 100);
        let starts_on = start.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let expires_on = expiry.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let canonicalized_resource = format!("/blob/{}/{}", self.account_name, CONTAINER_NAME);

        // Blob service SAS string-to-sign, signed with the decoded account key
        let string_to_sign = format!(
            "{permissions}\n{starts_on}\n{expires_on}\n{canonicalized_resource}\n\n\nhttps\n{STORAGE_API_VERSION}\nc\n\n\n\n\n\n\n"
        );

        let key = STANDARD.decode(&self.account_key).map_err(|_| {
            CustomError::StorageError("Storage account key is not valid base64".to_string())
        })?;
        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|_| CustomError::StorageError("Storage account key is empty".to_string()))?;
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        Ok(format!(
            "sv={STORAGE_API_VERSION}&st={}&se={}&sr=c&sp={permissions}&spr=https&sig={}",
            urlencoding::encode(&starts_on),
            urlencoding::encode(&expires_on),
            urlencoding::encode(&signature),
        ))
    }

    /// Store one image and return its durable blob URL.
    pub async fn upload_image(
        &self,
        data: Vec<u8>,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<String, CustomError> {
        if data.is_empty() {
            return Err(CustomError::ValidationError(
                "Image payload is empty".to_string(),
            ));
        }

        let blob_name = unique_blob_name(file_name);
        let sas_token = self.generate_sas_token()?;
        let blob_url = format!("{}/{}/{}", self.base_url(), CONTAINER_NAME, blob_name);

        let response = self
            .client
            .put(format!("{blob_url}?{sas_token}"))
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", STORAGE_API_VERSION)
            .header(
                "Content-Type",
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(data)
            .send()
            .await
            .map_err(|e| CustomError::StorageError(format!("Blob upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CustomError::StorageError(format!(
                "Blob upload rejected with status {}",
                response.status()
            )));
        }

        info!("Uploaded image to blob storage: {blob_name}");
        Ok(blob_url)
    }
}

/// Collision-free blob name keeping the original extension.
fn unique_blob_name(file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_else(|| "png".to_string());
    format!("{}_{}.{}", Uuid::new_v4(), Utc::now().timestamp(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> BlobStorage {
        BlobStorage::new(
            "testaccount".to_string(),
            STANDARD.encode(b"test-account-key"),
        )
    }

    #[test]
    fn sas_token_carries_scoped_permissions() {
        let token = storage().generate_sas_token().unwrap();
        assert!(token.contains("sp=rcw"));
        assert!(token.contains("sr=c"));
        assert!(token.contains("spr=https"));
        assert!(token.contains(&format!("sv={STORAGE_API_VERSION}")));
        assert!(token.contains("sig="));
    }

    #[test]
    fn sas_token_has_a_validity_window() {
        let token = storage().generate_sas_token().unwrap();
        assert!(token.contains("st="));
        assert!(token.contains("se="));
    }

    #[test]
    fn rejects_non_base64_account_key() {
        let storage = BlobStorage::new("testaccount".to_string(), "not base64!!!".to_string());
        assert!(matches!(
            storage.generate_sas_token(),
            Err(CustomError::StorageError(_))
        ));
    }

    #[test]
    fn blob_names_keep_extension_and_never_collide() {
        let a = unique_blob_name("selfie.JPG");
        let b = unique_blob_name("selfie.JPG");
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);
    }

    #[test]
    fn blob_names_default_to_png_without_extension() {
        assert!(unique_blob_name("upload").ends_with(".png"));
    }
}
