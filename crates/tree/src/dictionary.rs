/// Category used when a dictionary key starts with a digit.
pub const FALLBACK_CATEGORY: &str = "Misc";

/// Category of a localization dictionary key: its leading run of non-digit
/// characters, or [`FALLBACK_CATEGORY`] when that run is empty.
///
/// Only ASCII `0`-`9` end the run.
pub fn dictionary_category(key: &str) -> &str {
    let end = key
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit())
        .map_or(key.len(), |(idx, _)| idx);

    if end == 0 {
        FALLBACK_CATEGORY
    } else {
        &key[..end]
    }
}
