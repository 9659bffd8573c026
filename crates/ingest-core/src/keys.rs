//! Object key helpers.
//!
//! Keys arrive in trigger events form-URL-encoded: spaces as `+`, everything
//! else outside the unreserved set as `%XX`.

use std::borrow::Cow;
use std::path::Path;

/// Reverse the storage service's form-URL encoding of an object key.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_object_key(key: &str) -> String {
    let plus_decoded: Cow<'_, str> = if key.contains('+') {
        Cow::Owned(key.replace('+', " "))
    } else {
        Cow::Borrowed(key)
    };
    let bytes = urlencoding::decode_binary(plus_decoded.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Human-readable name used to search the catalog for an object.
///
/// This is the final path segment of the encoded key with its extension
/// stripped, then decoded. Folder markers (keys ending in `/`) have no file
/// name and yield an empty stem.
pub fn search_stem(key: &str) -> String {
    if key.ends_with('/') {
        return String::new();
    }
    let stem = Path::new(key)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(key);
    decode_object_key(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_percent_and_plus() {
        assert_eq!(decode_object_key("photo%201.jpg"), "photo 1.jpg");
        assert_eq!(decode_object_key("photo+1.jpg"), "photo 1.jpg");
        assert_eq!(decode_object_key("a%2Bb.jpg"), "a+b.jpg");
        assert_eq!(decode_object_key("plain.tif"), "plain.tif");
    }

    #[test]
    fn decodes_multibyte_sequences() {
        assert_eq!(decode_object_key("caf%C3%A9.png"), "café.png");
    }

    #[test]
    fn stem_strips_extension_and_directories() {
        assert_eq!(search_stem("photo%201.jpg"), "photo 1");
        assert_eq!(search_stem("shoots/2024/IMG_0042.CR2"), "IMG_0042");
        assert_eq!(search_stem("archive.tar.gz"), "archive.tar");
        assert_eq!(search_stem("no_extension"), "no_extension");
    }

    #[test]
    fn folder_marker_has_empty_stem() {
        assert_eq!(search_stem("shoots/"), "");
        assert_eq!(search_stem("shoots/2024/"), "");
    }
}
