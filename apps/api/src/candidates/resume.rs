//! Resume documents: PDF validation, text extraction, S3 storage and
//! presigned download links.

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF";
pub const LINK_TTL: Duration = Duration::from_secs(15 * 60);

/// Checks an uploaded file is a PDF within the size cap.
pub fn check_upload(
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
    max_bytes: usize,
) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("resume file is empty".to_string()));
    }
    if data.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "resume exceeds the {max_bytes} byte limit"
        )));
    }
    let declared_pdf = content_type == Some("application/pdf")
        || file_name.is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"));
    if !declared_pdf || !data.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation(
            "only PDF resumes are accepted".to_string(),
        ));
    }
    Ok(())
}

pub fn object_key(candidate_id: Uuid) -> String {
    format!("resumes/{}/{}.pdf", candidate_id, Uuid::new_v4())
}

/// Collapses whitespace runs so stored text stays compact.
pub fn tidy_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts text on the blocking pool. Unreadable PDFs are still accepted,
/// with empty text.
pub async fn extract_text(data: Bytes) -> String {
    let result = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&data).map_err(|e| e.to_string())
    })
    .await;
    match result {
        Ok(Ok(text)) => tidy_text(&text),
        Ok(Err(e)) => {
            warn!("PDF text extraction failed: {e}");
            String::new()
        }
        Err(e) => {
            warn!("PDF text extraction task panicked: {e}");
            String::new()
        }
    }
}

pub async fn store(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    data: Bytes,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;
    info!("Uploaded resume to s3://{}/{}", bucket, key);
    Ok(())
}

/// Best-effort removal of a replaced resume.
pub async fn remove(s3: &aws_sdk_s3::Client, bucket: &str, key: &str) {
    if let Err(e) = s3.delete_object().bucket(bucket).key(key).send().await {
        warn!("Failed to delete old resume s3://{}/{}: {e}", bucket, key);
    }
}

pub async fn presigned_link(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<String, AppError> {
    let config = PresigningConfig::expires_in(LINK_TTL)
        .map_err(|e| AppError::Storage(format!("invalid presigning config: {e}")))?;
    let request = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .presigned(config)
        .await
        .map_err(|e| AppError::Storage(format!("S3 presign failed: {e}")))?;
    Ok(request.uri().to_string())
}
