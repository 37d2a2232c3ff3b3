//! Dot-separated item keys.
//!
//! An item key such as `"survey.groupA.q1"` carries the full ancestor chain of the item; the last
//! segment is the item's local name.

/// All prefixes of `key`, shortest first: `"a.b.c"` gives `["a", "a.b", "a.b.c"]`.
///
/// An empty key yields a single empty prefix.
pub fn key_prefixes(key: &str) -> Vec<String> {
    let mut prefixes = Vec::new();
    let mut current = String::new();
    for (index, segment) in key.split('.').enumerate() {
        if index > 0 {
            current.push('.');
        }
        current.push_str(segment);
        prefixes.push(current.clone());
    }
    prefixes
}

/// Key of the parent item, obtained by stripping the last segment.
pub fn parent_key(key: &str) -> Option<&str> {
    key.rfind('.').map(|index| &key[..index])
}

/// Local (last) segment of the key.
pub fn local_key(key: &str) -> &str {
    key.rsplit('.').next().unwrap_or(key)
}

/// Joins a parent key and a local segment.
pub fn child_key(parent: &str, local: &str) -> String {
    if parent.is_empty() {
        local.to_string()
    } else {
        format!("{parent}.{local}")
    }
}

/// True when `key` is `ancestor` itself or lies below it.
pub fn is_within(key: &str, ancestor: &str) -> bool {
    key == ancestor
        || key
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes() {
        assert_eq!(key_prefixes("a.b.c"), vec!["a", "a.b", "a.b.c"]);
        assert_eq!(key_prefixes("survey"), vec!["survey"]);
    }

    #[test]
    fn empty_key_has_one_prefix() {
        assert_eq!(key_prefixes(""), vec![""]);
    }

    #[test]
    fn empty_segments_are_kept() {
        assert_eq!(key_prefixes("a..b"), vec!["a", "a.", "a..b"]);
    }

    #[test]
    fn parent_and_local() {
        assert_eq!(parent_key("s.g.q1"), Some("s.g"));
        assert_eq!(parent_key("s"), None);
        assert_eq!(local_key("s.g.q1"), "q1");
        assert_eq!(local_key("s"), "s");
    }

    #[test]
    fn child() {
        assert_eq!(child_key("s.g", "q1"), "s.g.q1");
        assert_eq!(child_key("", "q1"), "q1");
    }

    #[test]
    fn within() {
        assert!(is_within("s.g.q1", "s.g"));
        assert!(is_within("s.g", "s.g"));
        assert!(!is_within("s.gx", "s.g"));
    }
}
