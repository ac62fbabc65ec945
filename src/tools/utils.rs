use std::path::Path;

/// URL schemes passed through untouched
const KNOWN_SCHEMES: [&str; 7] = ["http://", "https://", "file://", "data:", "about:", "chrome://", "chrome-extension://"];

/// Turn user input into something a tab can navigate to.
///
/// Existing local files (saved storybook pages) become absolute `file://` URLs;
/// anything else is treated as a possibly incomplete web address.
pub fn resolve_source(source: &str) -> String {
    let trimmed = source.trim();

    if !KNOWN_SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) {
        let path = Path::new(trimmed);
        if path.is_file() {
            if let Ok(absolute) = std::fs::canonicalize(path) {
                return file_url(&absolute);
            }
        }
    }

    normalize_url(trimmed)
}

/// Build a `file://` URL for an absolute path, percent-encoding each segment
pub fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    // Verbatim prefix from canonicalize on Windows
    let raw = raw.strip_prefix("//?/").unwrap_or(&raw);

    let segments: Vec<String> = raw
        .split('/')
        .enumerate()
        .map(|(i, segment)| {
            if i == 0 && is_drive(segment) {
                segment.to_string()
            } else {
                urlencoding::encode(segment).into_owned()
            }
        })
        .collect();

    let joined = segments.join("/");
    if joined.starts_with('/') {
        format!("file://{}", joined)
    } else {
        format!("file:///{}", joined)
    }
}

/// `C:` and the like
fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Add a missing protocol to an incomplete URL
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    if KNOWN_SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) {
        return trimmed.to_string();
    }

    // Relative path - return as-is
    if trimmed.starts_with('/') || trimmed.starts_with("./") || trimmed.starts_with("../") {
        return trimmed.to_string();
    }

    // Local development servers speak plain http
    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}
