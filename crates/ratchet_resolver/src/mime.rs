//! Extension-based mime type lookup.

use ratchet_common::split_extension;

/// A content type and whether it is worth gzipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimeType {
    /// The mime type string, e.g. `text/css`.
    pub name: &'static str,
    /// Text types compress well; images and fonts are already compressed.
    pub compressible: bool,
}

impl MimeType {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            compressible: true,
        }
    }

    const fn binary(name: &'static str) -> Self {
        Self {
            name,
            compressible: false,
        }
    }
}

/// Fallback for unknown extensions.
pub const OCTET_STREAM: MimeType = MimeType::binary("application/octet-stream");

/// Looks up the mime type for a logical path by its final extension.
pub fn mime_for(logical_path: &str) -> MimeType {
    match split_extension(logical_path).1 {
        ".js" | ".mjs" => MimeType::text("application/javascript"),
        ".css" => MimeType::text("text/css"),
        ".html" | ".htm" => MimeType::text("text/html"),
        ".json" => MimeType::text("application/json"),
        ".map" => MimeType::text("application/json"),
        ".svg" => MimeType::text("image/svg+xml"),
        ".txt" => MimeType::text("text/plain"),
        ".xml" => MimeType::text("application/xml"),
        ".png" => MimeType::binary("image/png"),
        ".jpg" | ".jpeg" => MimeType::binary("image/jpeg"),
        ".gif" => MimeType::binary("image/gif"),
        ".webp" => MimeType::binary("image/webp"),
        ".ico" => MimeType::binary("image/vnd.microsoft.icon"),
        ".woff" => MimeType::binary("font/woff"),
        ".woff2" => MimeType::binary("font/woff2"),
        ".ttf" => MimeType::binary("font/ttf"),
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_types_are_compressible() {
        for path in ["app.js", "site.css", "index.html", "data.json", "app.js.map", "icon.svg"] {
            assert!(mime_for(path).compressible, "{path}");
        }
    }

    #[test]
    fn binary_types_are_not() {
        for path in ["logo.png", "photo.jpeg", "font.woff2"] {
            assert!(!mime_for(path).compressible, "{path}");
        }
    }

    #[test]
    fn unknown_extension_falls_back() {
        assert_eq!(mime_for("archive.tar.zst"), OCTET_STREAM);
        assert_eq!(mime_for("Makefile"), OCTET_STREAM);
    }

    #[test]
    fn uses_final_extension() {
        assert_eq!(mime_for("admin/app.min.js").name, "application/javascript");
    }
}
