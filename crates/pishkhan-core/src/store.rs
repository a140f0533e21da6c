//! Artifact storage: deterministic paths and all-or-nothing writes.
//!
//! The storage path doubles as the filesystem-level idempotency signal
//! ("file exists ⇒ done"), so a failed fetch must never leave a file at the
//! destination. Bodies land in a `.part` sibling first and are renamed into
//! place only after the full write succeeds.

use crate::calendar::SolarDate;
use crate::error::CrawlError;
use crate::http::{self, HttpOptions};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Expected media type of every artifact.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// `root/<publication>/<year>/<month>/<YYYYMMDD>.pdf`, with year and month
/// taken from the Jalali date itself, not its Gregorian equivalent.
pub fn artifact_path(root: &Path, publication: &str, date: &SolarDate) -> PathBuf {
    root.join(publication)
        .join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{}.pdf", date.compact()))
}

/// Media type portion of a `Content-Type` value, parameters stripped.
pub fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or("").trim()
}

/// Sibling `.part` path for a destination.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Write `bytes` to `dest` atomically: parent dirs created, body written to
/// the `.part` sibling, then renamed into place. Any failure removes the
/// temp file and leaves `dest` untouched.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(dest);
    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

/// Download a resolved artifact URL into `dest`.
///
/// The response must be a success AND declare exactly the expected media
/// type; otherwise the destination is not created. Callers check for a
/// pre-existing file before invoking this, so no network call is wasted on
/// work that is already done.
pub fn fetch_artifact(url: &str, dest: &Path, http: &HttpOptions) -> Result<(), CrawlError> {
    let resp = http::get(url, http, true)?;
    if !resp.is_success() {
        return Err(CrawlError::HttpStatus {
            status: resp.status,
            url: url.to_string(),
        });
    }
    let declared = resp.content_type.as_deref().unwrap_or("");
    if !media_type(declared).eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
        return Err(CrawlError::ContentMismatch {
            expected: PDF_MEDIA_TYPE.to_string(),
            actual: declared.to_string(),
        });
    }
    write_atomic(dest, &resp.body)?;
    tracing::info!(url, dest = %dest.display(), bytes = resp.body.len(), "artifact stored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_path_uses_jalali_fields() {
        let date = SolarDate::parse_compact("14040404").unwrap();
        let p = artifact_path(Path::new("newspapers"), "JomhouriEslami", &date);
        assert_eq!(
            p,
            Path::new("newspapers/JomhouriEslami/1404/04/14040404.pdf")
        );
    }

    #[test]
    fn media_type_strips_parameters() {
        assert_eq!(media_type("application/pdf"), "application/pdf");
        assert_eq!(media_type("application/pdf; charset=binary"), "application/pdf");
        assert_eq!(media_type("text/html;charset=utf-8"), "text/html");
        assert_eq!(media_type(""), "");
    }

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("/data/14040404.pdf"));
        assert_eq!(p, Path::new("/data/14040404.pdf.part"));
    }

    #[test]
    fn write_atomic_creates_parents_and_cleans_up_temp() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("kayhan/1404/04/14040404.pdf");
        write_atomic(&dest, b"%PDF-1.4 body").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"%PDF-1.4 body");
        assert!(!temp_path(&dest).exists());
    }

    #[test]
    fn write_atomic_failure_leaves_no_destination() {
        let dir = tempfile::tempdir().unwrap();
        // A destination whose parent is a regular file cannot be created.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let dest = blocker.join("14040404.pdf");
        assert!(write_atomic(&dest, b"body").is_err());
        assert!(!dest.exists());
    }
}
