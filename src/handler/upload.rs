//! Upload handler
//!
//! `POST /upload`: reads the `file` field of a multipart body, stores it under
//! a fresh identifier and answers with its public path. JPEG and PNG uploads
//! are downsampled and re-encoded, everything else is copied verbatim.

use super::public_path;
use crate::config::AppState;
use crate::error::UploadError;
use crate::http::{self, HttpResponse};
use crate::logger;
use crate::media::{self, MediaKind};
use crate::storage::FileId;
use futures::{future, TryStreamExt};
use http_body_util::BodyStream;
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{HeaderMap, Request, StatusCode};
use multer::{Constraints, Field, Multipart, SizeLimit};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Multipart field holding the uploaded file
pub const FILE_FIELD: &str = "file";

/// Handle `POST /upload`
pub async fn handle_upload<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    match store_upload(req, state).await {
        Ok(name) => http::success(StatusCode::CREATED, "File Uploaded", public_path(&name)),
        Err(err) => {
            logger::log_error(&format!("{}: {err}", err.message()));
            http::failure(err.status(state.config.http.strict_status), err.message())
        }
    }
}

/// Store the uploaded file and return its stored name
async fn store_upload<B>(req: Request<B>, state: &AppState) -> Result<String, UploadError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    let limit = state.config.storage.max_upload_size;
    if let Some(size) = content_length(req.headers()) {
        if size > limit {
            logger::log_debug(&format!("Rejecting declared body of {size} bytes"));
            return Err(UploadError::TooLarge { limit });
        }
    }

    let boundary = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or(UploadError::MissingFile)?;
    let boundary = multer::parse_boundary(boundary)?;

    let stream = BodyStream::new(req.into_body())
        .try_filter_map(|frame| future::ready(Ok(frame.into_data().ok())));
    let constraints = Constraints::new().size_limit(SizeLimit::new().whole_stream(limit));
    let mut multipart = Multipart::with_constraints(stream, boundary, constraints);

    let field = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some(FILE_FIELD) => break field,
            Some(_) => {}
            None => return Err(UploadError::MissingFile),
        }
    };

    let original = field.file_name().unwrap_or_default().to_string();
    let extension = media::extension_of(&original);
    let kind = MediaKind::from_extension(extension);
    let name = FileId::generate().file_name(extension);
    logger::log_debug(&format!("Upload {original:?} -> {name} ({kind})"));

    let mut target = state
        .storage
        .create(&name)
        .await
        .map_err(|source| UploadError::CreateTarget {
            name: name.clone(),
            source,
        })?;

    match write_target(field, kind, &mut target, &name, state).await {
        Ok(written) => {
            logger::log_upload_stored(&name, kind, written);
            Ok(name)
        }
        Err(err) => {
            drop(target);
            if !err.keeps_target() {
                state.storage.remove(&name).await;
            }
            Err(err)
        }
    }
}

/// Fill `target` from the field: transformed image or verbatim bytes
async fn write_target(
    mut field: Field<'_>,
    kind: MediaKind,
    target: &mut File,
    name: &str,
    state: &AppState,
) -> Result<u64, UploadError> {
    let written = match kind.image_format() {
        Some(format) => {
            let input = field.bytes().await?;
            let options = state.transform_options();
            let image =
                tokio::task::spawn_blocking(move || media::transform(&input, format, &options))
                    .await??;
            write_all(target, name, &image.bytes).await?;
            logger::log_debug(&format!(
                "{name}: encoded {:?} {}x{}",
                image.format, image.width, image.height
            ));
            image.bytes.len() as u64
        }
        None => copy_field(&mut field, target, name).await?,
    };

    target.flush().await.map_err(|source| UploadError::Copy {
        name: name.to_string(),
        source,
    })?;
    Ok(written)
}

/// Stream a field's chunks into `target`, returning the byte count
async fn copy_field(
    field: &mut Field<'_>,
    target: &mut File,
    name: &str,
) -> Result<u64, UploadError> {
    let mut written = 0u64;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|err| UploadError::stream(name, err))?
    {
        write_all(target, name, &chunk).await?;
        written += chunk.len() as u64;
    }
    Ok(written)
}

async fn write_all(target: &mut File, name: &str, bytes: &[u8]) -> Result<(), UploadError> {
    target
        .write_all(bytes)
        .await
        .map_err(|source| UploadError::Copy {
            name: name.to_string(),
            source,
        })
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_length(&headers), None);
        headers.insert(CONTENT_LENGTH, "1024".parse().unwrap());
        assert_eq!(content_length(&headers), Some(1024));
        headers.insert(CONTENT_LENGTH, "abc".parse().unwrap());
        assert_eq!(content_length(&headers), None);
    }
}
