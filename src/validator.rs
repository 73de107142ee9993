//! Filename checks applied before anything touches a store.

use unicode_normalization::UnicodeNormalization;

/// Extensions accepted for upload and listing, compared lowercased.
const ALLOWED_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Accepts a name iff it has a `.` and the text after the last one is `jpg` or `jpeg`,
/// ignoring case.
pub fn is_allowed_filename(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Turn a client-supplied filename into a single safe path component.
///
/// The name is NFKD-normalised so accented letters keep their base letter, then
/// anything still non-ASCII is dropped. `/` and whitespace runs become `_`, everything
/// outside `[A-Za-z0-9_.-]` is removed and leading/trailing `.`/`_` are trimmed.
/// The result can be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}
