//! Dotted field paths.
//!
//! `"a.b.c"` addresses the field `c` inside the map under `b` inside
//! the map under `a`. There is no escaping; a field name containing a
//! dot cannot be addressed through a path.

use crate::err::ErrorKind;

/// Splits a dotted path into its segments.
///
/// Leading, trailing or consecutive dots make a segment empty and the
/// whole path invalid, as does an empty path.
pub fn segments(path: &str) -> Result<Vec<&str>, ErrorKind> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(ErrorKind::InvalidPath(path.to_owned()));
    }
    Ok(parts)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn splits_on_dots() {
        assert_eq!(segments("a.b.c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(segments("single").unwrap(), vec!["single"]);
    }

    #[test]
    fn rejects_empty_segments() {
        for bad in ["", ".", "a.", ".a", "a..b"] {
            assert_eq!(segments(bad), Err(ErrorKind::InvalidPath(bad.to_owned())));
        }
    }
}
