//! Deterministic download file names.
//!
//! Every export is named from the subject printed on the certificate:
//! `certificate-{subject}.{ext}`, with runs of whitespace collapsed to a
//! single dash. The same subject always yields the same file name, so a
//! re-download replaces the previous file instead of accumulating copies.
//!
//! Subject names arrive already trimmed from the eligibility resolver, but
//! the collapse handles untrimmed input identically (leading/trailing
//! whitespace produces no stray separators).

/// Collapse whitespace runs in a subject name to single dashes.
///
/// - `"Asha Rao"` → `"Asha-Rao"`
/// - `"Asha  \t Rao"` → `"Asha-Rao"`
/// - `"  Asha Rao  "` → `"Asha-Rao"`
pub fn dashed_subject(subject: &str) -> String {
    subject.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Build the download file name for a subject and extension.
///
/// `ext` is given without a leading dot. A subject that collapses to nothing
/// degrades to `certificate.{ext}`.
pub fn download_file_name(subject: &str, ext: &str) -> String {
    let dashed = dashed_subject(subject);
    if dashed.is_empty() {
        format!("certificate.{ext}")
    } else {
        format!("certificate-{dashed}.{ext}")
    }
}
