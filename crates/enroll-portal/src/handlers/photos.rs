//! Handler for `/api/photos` — applicant photo upload.
//!
//! The upload happens before the form submit; the returned URL goes into
//! the form's `photo_url`. Files land in the configured photo directory
//! and are served back under `/photos/`.

use axum::{Json, body::Bytes, extract::{Query, State}, http::StatusCode, response::IntoResponse};
use enroll_core::{identity::IdentityProvider, mailer::Mailer, store::AdmissionStore};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::Error};

/// Hard ceiling on an uploaded photo, enforced before anything is written.
pub const MAX_PHOTO_BYTES: usize = 200 * 1024;

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  pub first_name: String,
  pub dob:        String,
  /// File extension; anything outside the whitelist falls back to `jpg`.
  #[serde(default)]
  pub ext:        Option<String>,
}

/// Build the stored file name, `{First}_{year}.{ext}`. A re-upload for the
/// same name and birth year replaces the previous file.
fn photo_file_name(params: &UploadParams) -> String {
  let name: String = params
    .first_name
    .chars()
    .filter(char::is_ascii_alphanumeric)
    .collect();
  let name = if name.is_empty() { "applicant".to_owned() } else { name };

  let year = birth_year(&params.dob).unwrap_or("0000");

  let ext = params
    .ext
    .as_deref()
    .map(str::to_lowercase)
    .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
    .unwrap_or_else(|| "jpg".to_owned());

  format!("{name}_{year}.{ext}")
}

/// First run of four consecutive ASCII digits in `dob`.
fn birth_year(dob: &str) -> Option<&str> {
  let bytes = dob.as_bytes();
  (0..bytes.len().saturating_sub(3))
    .find(|&i| bytes[i..i + 4].iter().all(u8::is_ascii_digit))
    .map(|i| &dob[i..i + 4])
}

/// `POST /api/photos?first_name=...&dob=...&ext=jpg` — raw image body.
pub async fn upload<S, M>(
  State(state): State<AppState<S, M>>,
  Query(params): Query<UploadParams>,
  body: Bytes,
) -> Result<impl IntoResponse, Error>
where
  S: AdmissionStore + IdentityProvider + Clone + Send + Sync + 'static,
  M: Mailer + Clone + Send + Sync + 'static,
{
  if body.is_empty() {
    return Err(Error::Core(enroll_core::Error::MissingPhoto));
  }
  if body.len() > MAX_PHOTO_BYTES {
    return Err(Error::Core(enroll_core::Error::PhotoTooLarge { size: body.len() }));
  }

  let file_name = photo_file_name(&params);
  let dir = &state.config.photo_dir;

  tokio::fs::create_dir_all(dir).await.map_err(Error::store)?;
  tokio::fs::write(dir.join(&file_name), &body)
    .await
    .map_err(Error::store)?;

  let photo_url = format!("{}/photos/{file_name}", state.config.base_url);
  Ok((StatusCode::CREATED, Json(json!({ "photo_url": photo_url }))))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn params(first_name: &str, dob: &str, ext: Option<&str>) -> UploadParams {
    UploadParams {
      first_name: first_name.into(),
      dob:        dob.into(),
      ext:        ext.map(str::to_owned),
    }
  }

  #[test]
  fn file_name_uses_name_and_birth_year() {
    assert_eq!(
      photo_file_name(&params("Ashish", "2004-05-12", Some("png"))),
      "Ashish_2004.png"
    );
  }

  #[test]
  fn unknown_extension_falls_back_to_jpg() {
    assert_eq!(
      photo_file_name(&params("Ashish", "2004-05-12", Some("exe"))),
      "Ashish_2004.jpg"
    );
  }

  #[test]
  fn hostile_name_is_sanitised() {
    assert_eq!(
      photo_file_name(&params("../../etc/passwd", "no-year", None)),
      "etcpasswd_0000.jpg"
    );
  }
}
