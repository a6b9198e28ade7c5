//! Bucket-name validation.
//!
//! Bucket names follow S3-style naming constraints: 3-63 characters of
//! lowercase letters, digits, and hyphens, starting and ending with a
//! letter or digit, with no consecutive hyphens.

use crate::error::PresignedUrlError;

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Validate a bucket name against the naming constraints.
///
/// Rules:
/// - 3-63 characters long
/// - Only lowercase letters, digits, and hyphens
/// - Must start and end with a letter or digit
/// - No consecutive hyphens (`--`)
///
/// # Errors
///
/// Returns [`PresignedUrlError::InvalidBucketName`] with a human-readable
/// reason if any rule is violated.
///
/// # Examples
///
/// ```
/// use presigned_core::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("my-bucket-1").is_ok());
/// assert!(validate_bucket_name("My_Bucket").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<(), PresignedUrlError> {
    let len = name.len();

    if len < MIN_BUCKET_NAME_LEN {
        return Err(PresignedUrlError::InvalidBucketName {
            name: name.to_owned(),
            reason: format!("must be at least {MIN_BUCKET_NAME_LEN} characters long"),
        });
    }

    if len > MAX_BUCKET_NAME_LEN {
        return Err(PresignedUrlError::InvalidBucketName {
            name: name.to_owned(),
            reason: format!("must be at most {MAX_BUCKET_NAME_LEN} characters long"),
        });
    }

    let bytes = name.as_bytes();
    let charset_ok = bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-');
    let ends_ok = is_letter_or_digit(bytes[0]) && is_letter_or_digit(bytes[len - 1]);

    if !charset_ok || !ends_ok {
        return Err(PresignedUrlError::InvalidBucketName {
            name: name.to_owned(),
            reason: "must contain only lowercase letters, numbers, and hyphens, \
                     and must start and end with a letter or number"
                .to_owned(),
        });
    }

    if name.contains("--") {
        return Err(PresignedUrlError::InvalidBucketName {
            name: name.to_owned(),
            reason: "must not contain consecutive hyphens".to_owned(),
        });
    }

    Ok(())
}

/// Non-failing wrapper around [`validate_bucket_name`].
///
/// # Examples
///
/// ```
/// use presigned_core::validation::is_valid_bucket_name;
///
/// assert!(is_valid_bucket_name("my-bucket"));
/// assert!(!is_valid_bucket_name("my--bucket"));
/// ```
#[must_use]
pub fn is_valid_bucket_name(name: &str) -> bool {
    validate_bucket_name(name).is_ok()
}

fn is_letter_or_digit(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit()
}
