//! The image store seam and helpers shared by its implementations.

use async_trait::async_trait;

use crate::error::StorageError;

/// A flat collection of recipe images addressed by file name.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// File names of every object in the collection, in no particular order.
    async fn list_images(&self) -> Result<Vec<String>, StorageError>;

    /// Raw bytes of the image called `name`.
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError>;
}

/// Reject names that could escape the collection.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

pub fn is_png(name: &str) -> bool {
    name.ends_with(".png")
}

/// Recipe name for an image file: everything before the first `.`.
pub fn file_stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// MIME type from the file extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Pizza.png").is_ok());
        assert!(validate_name("pasta carbonara.png").is_ok());
        for bad in ["", ".", "..", "../secret.png", "a/b.png", "a\\b.png"] {
            assert!(
                matches!(validate_name(bad), Err(StorageError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Pizza.png"), "Pizza");
        assert_eq!(file_stem("Caesar Salad.v2.png"), "Caesar Salad");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_is_png() {
        assert!(is_png("Lasagna.png"));
        assert!(!is_png("Lasagna.jpg"));
        assert!(!is_png("png"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a.gif"), "image/gif");
        assert_eq!(content_type_for("a.txt"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
