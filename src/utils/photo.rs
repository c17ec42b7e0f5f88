use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use uuid::Uuid;

/// Decodes a data-URL (or bare base64) photo payload and writes it under
/// `photo_dir`. Returns the stored file name, which is what goes into
/// the attendance row.
pub fn save_photo(photo_dir: &str, payload: &str, user_id: u64, tag: &str) -> Result<String> {
    // "data:image/jpeg;base64,<...>" or already-bare base64
    let raw = payload
        .split_once("base64,")
        .map(|(_, body)| body)
        .unwrap_or(payload);

    let bytes = STANDARD
        .decode(raw.trim())
        .context("photo payload is not valid base64")?;

    fs::create_dir_all(photo_dir)
        .with_context(|| format!("failed to create photo dir {photo_dir}"))?;

    let file_name = format!("{}_{}_{}.jpg", user_id, tag, Uuid::new_v4());
    let path = Path::new(photo_dir).join(&file_name);
    fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_payloads() {
        let dir = std::env::temp_dir().join("presensi-photo-test");
        let dir = dir.to_string_lossy();
        assert!(save_photo(&dir, "not base64 at all!!!", 1, "in").is_err());
    }

    #[test]
    fn strips_a_data_url_prefix() {
        let dir = std::env::temp_dir().join("presensi-photo-test");
        let dir = dir.to_string_lossy();
        let payload = format!("data:image/jpeg;base64,{}", STANDARD.encode(b"jpegbytes"));
        let name = save_photo(&dir, &payload, 42, "in").unwrap();
        assert!(name.starts_with("42_in_"));
        assert!(name.ends_with(".jpg"));
    }
}
