use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

pub(crate) fn parent(href: &str) -> &str {
    href.rfind('/')
        .map_or("", |index| if index == 0 { "/" } else { &href[..index] })
}

pub(crate) fn decode(encoded: &str) -> Cow<'_, str> {
    percent_encoding::percent_decode_str(encoded).decode_utf8_lossy()
}

/// Splits `href` into its path and its `?query`/`#fragment` suffix.
pub(crate) fn split_suffix(href: &str) -> (&str, &str) {
    href.find(['?', '#'])
        .map(|position| (&href[..position], &href[position..]))
        .unwrap_or((href, ""))
}

pub(crate) fn normalize(href: &str) -> String {
    let mut buf = PathBuf::from(href);
    normalize_href_path(&mut buf);

    // 1: `buf` is UTF-8 as its data derives from `href`.
    // 2: Ensure separators are forward slashes.
    buf.to_string_lossy().replace('\\', "/")
}

/// Turns any href into the key used by archives, manifests and the encryption map:
/// - the `?query` and `#fragment` are dropped,
/// - the path is percent-decoded,
/// - `.` and `..` segments are normalized,
/// - the container-root `/` prefix is removed.
///
/// `/OEBPS/text/../ch%201.xhtml#p3` becomes `OEBPS/ch 1.xhtml`.
pub(crate) fn canonicalize(href: &str) -> String {
    let (path, _) = split_suffix(href);

    if has_scheme(path) {
        return path.to_owned();
    }

    let decoded = decode(path);
    let normalized = normalize(&decoded);

    match normalized.strip_prefix('/') {
        Some(relative) => relative.to_owned(),
        None => normalized,
    }
}

/// Resolve a child path against its parent, normalizing if necessary.
pub(crate) fn resolve<'a>(parent_dir: &str, relative: &'a str) -> Cow<'a, str> {
    let (main_href, frag) = split_suffix(relative);

    if main_href.starts_with('/') || has_scheme(main_href) {
        // If the path is absolute or has a scheme,
        // it is most likely resolved already.
        return Cow::Borrowed(relative);
    }

    let mut buf = Path::new(parent_dir).join(main_href);
    normalize_href_path(&mut buf);

    // 1: `buf` is UTF-8 as its data derives from `parent_dir` and `href`.
    // 2: Ensure separators are forward slashes.
    Cow::Owned(buf.to_string_lossy().replace('\\', "/") + frag)
}

/// The lowercase file extension of the path portion of `href`, if any.
pub(crate) fn extension(href: &str) -> Option<String> {
    let (path, _) = split_suffix(href);
    let file = &path[path.rfind('/').map_or(0, |index| index + 1)..];

    file.rfind('.')
        .filter(|&index| index > 0 && index + 1 < file.len())
        .map(|index| file[index + 1..].to_ascii_lowercase())
}

fn normalize_href_path(original: &mut PathBuf) {
    let mut stack = Vec::new();

    for component in original.components() {
        match component {
            Component::ParentDir => {
                if stack
                    .last()
                    // If the component is the root, disallow popping.
                    // No content must come before the root when present.
                    .is_some_and(|component| !matches!(component, Component::RootDir))
                {
                    stack.pop();
                }
            }
            Component::CurDir => {}
            _ => {
                stack.push(component);
            }
        }
    }

    *original = PathBuf::from_iter(stack);
}

/// The provided `href` must not contain a `fragment`
/// and `query` when passed to this method.
fn has_scheme(href: &str) -> bool {
    href.contains(':')
}
