/// Consolidates text spread across lines and inline markup into a single line.
///
/// `"\n  Chapter\t 1 \n"` becomes `"Chapter 1"`.
pub(crate) fn collapse_whitespace(value: &str) -> String {
    let mut collapsed = String::with_capacity(value.len());

    for word in value.split_whitespace() {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(word);
    }
    collapsed
}

/// Splits a whitespace-separated attribute value, such as `properties="nav scripted"`.
pub(crate) fn split_tokens(value: &str) -> Vec<String> {
    value.split_ascii_whitespace().map(String::from).collect()
}
