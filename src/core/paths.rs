use crate::domain::model::{FieldPath, FieldPaths};

/// Splits every dotted field name on `.`. Segments are not validated; an
/// empty segment just never matches a key.
pub fn expand<S: AsRef<str>>(fields: &[S]) -> FieldPaths {
    FieldPaths::new(
        fields
            .iter()
            .map(|field| FieldPath::new(field.as_ref().split('.').map(str::to_string).collect()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(paths: &FieldPaths) -> Vec<Vec<&str>> {
        paths
            .iter()
            .map(|p| p.segments().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_expand_keeps_order() {
        let paths = expand(&["name", "address.city", "a.b.c"]);
        assert_eq!(
            segments(&paths),
            vec![vec!["name"], vec!["address", "city"], vec!["a", "b", "c"]]
        );
    }

    #[test]
    fn test_expand_allows_empty_segments() {
        let paths = expand(&["a..b", "", "x."]);
        assert_eq!(
            segments(&paths),
            vec![vec!["a", "", "b"], vec![""], vec!["x", ""]]
        );
    }

    #[test]
    fn test_expand_empty_list() {
        let fields: Vec<String> = Vec::new();
        assert!(expand(&fields).is_empty());
    }
}
