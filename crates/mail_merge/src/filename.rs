//! Output file naming

use regex_lite::Regex;
use std::sync::LazyLock;

/// Extension of generated documents
pub const OUTPUT_EXTENSION: &str = "docx";

// `\s` in regex-lite is ASCII-only, so the Unicode White_Space code points are listed
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[^\w\s.\-\x{85}\x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}]",
    )
    .expect("valid filename pattern")
});

/// Replace every character that is not a word character, whitespace, `.`
/// or `-` with `_`.
pub fn sanitize_component(value: &str) -> String {
    DISALLOWED.replace_all(value, "_").into_owned()
}

/// `<sanitized-name>_<sanitized-rollNo>.docx`
pub fn output_filename(name: &str, roll_no: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize_component(name),
        sanitize_component(roll_no),
        OUTPUT_EXTENSION
    )
}
