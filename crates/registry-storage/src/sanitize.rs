//! Filesystem-safe filenames.

const FALLBACK_NAME: &str = "file";

/// Reduce an arbitrary client-supplied name to a safe single path component.
///
/// Unicode is transliterated to ASCII, anything outside `[A-Za-z0-9._-]`
/// becomes `_`, runs of `_` and `.` collapse, and leading or trailing
/// separators are trimmed. The result never contains a path separator and
/// is never empty, `.` or `..`.
pub fn sanitize_filename(value: &str) -> String {
    let transliterated = deunicode::deunicode(value);
    let mut out = String::with_capacity(transliterated.len());
    let mut last: Option<char> = None;

    for ch in transliterated.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            ch
        } else {
            '_'
        };

        if matches!(mapped, '_' | '.') && last == Some(mapped) {
            continue;
        }
        out.push(mapped);
        last = Some(mapped);
    }

    while let Some(pos) = out.find("_.") {
        out.remove(pos);
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    let out = trimmed.to_string();
    let (base, ext) = match out.rsplit_once('.') {
        Some((base, ext)) => (base, Some(ext)),
        None => (out.as_str(), None),
    };

    if is_reserved_device_name(base) {
        return match ext {
            Some(ext) => format!("{base}_.{ext}"),
            None => format!("{base}_"),
        };
    }

    out
}

/// Windows device names that cannot be used as a file basename.
fn is_reserved_device_name(base: &str) -> bool {
    let upper = base.to_ascii_uppercase();
    match upper.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            let bytes = upper.as_bytes();
            bytes.len() == 4
                && (upper.starts_with("COM") || upper.starts_with("LPT"))
                && matches!(bytes[3], b'1'..=b'9')
        }
    }
}

/// Lower-cased extension after the last dot, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}
