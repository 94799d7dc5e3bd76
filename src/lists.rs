//! Grammars for the list-valued constraint attributes.
//!
//! Attributes such as `teams="0;3;5"`, `teams="0..19"` or `meetings="0,1;2,3;"`
//! are parsed into integer lists. Tokens that do not fit the grammar are dropped
//! and counted, never reported as errors.

/// Values parsed from one attribute together with the number of dropped tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parsed<T> {
    pub values: Vec<T>,
    pub skipped: usize,
}

impl<T> Parsed<T> {
    fn empty() -> Self {
        Parsed {
            values: Vec::new(),
            skipped: 0,
        }
    }
}

/// Which grammar applies to an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `2;5;7`
    Plain,
    /// `3..6`, falling back to [`Grammar::Plain`]
    RangeOrList,
    /// `1,2;3,4`
    Pairs,
}

/// Semicolon-separated integers. Empty tokens are ignored, non-integer tokens skipped.
pub fn parse_list(text: &str) -> Parsed<i64> {
    let mut parsed = Parsed::empty();
    for token in text.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        match token.parse::<i64>() {
            Ok(v) => parsed.values.push(v),
            Err(_) => parsed.skipped += 1,
        }
    }
    parsed
}

/// Inclusive range `a..b`, or a plain list when the text is not a well-formed range.
pub fn parse_range(text: &str) -> Parsed<i64> {
    let text = text.trim();
    if text.contains("..") {
        let parts = text.split("..").map(str::trim).collect::<Vec<_>>();
        if let [start, end] = parts.as_slice() {
            if let (Ok(start), Ok(end)) = (start.parse::<i64>(), end.parse::<i64>()) {
                return Parsed {
                    values: (start..=end).collect(),
                    skipped: 0,
                };
            }
        }
    }
    parse_list(text)
}

/// `home,away` pairs separated by semicolons.
pub fn parse_pairs(text: &str) -> Parsed<(i64, i64)> {
    let mut parsed = Parsed::empty();
    for token in text.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_pair(token) {
            Some(pair) => parsed.values.push(pair),
            None => parsed.skipped += 1,
        }
    }
    parsed
}

fn parse_pair(token: &str) -> Option<(i64, i64)> {
    let mut parts = token.split(',');
    let home = parts.next()?.trim().parse().ok()?;
    let away = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((home, away))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_list() {
        assert_eq!(parse_list("2;5;7").values, vec![2, 5, 7]);
        assert_eq!(parse_list(" 2 ; 5;7; ").values, vec![2, 5, 7]);
        assert_eq!(parse_list(""), Parsed::default());
        assert_eq!(parse_list("   "), Parsed::default());
    }

    #[test]
    fn plain_list_skips_garbage() {
        let parsed = parse_list("1;x;3");
        assert_eq!(parsed.values, vec![1, 3]);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn range() {
        assert_eq!(parse_range("3..6").values, vec![3, 4, 5, 6]);
        assert_eq!(parse_range(" 0..0 ").values, vec![0]);
        assert!(parse_range("6..3").values.is_empty());
        assert_eq!(parse_range("6..3").skipped, 0);
    }

    #[test]
    fn range_falls_back_to_list() {
        assert_eq!(parse_range("0;4;9").values, vec![0, 4, 9]);

        let three_parts = parse_range("1..2..3");
        assert!(three_parts.values.is_empty());
        assert_eq!(three_parts.skipped, 1);

        let mixed = parse_range("1;2..3");
        assert_eq!(mixed.values, vec![1]);
        assert_eq!(mixed.skipped, 1);
    }

    #[test]
    fn pairs() {
        assert_eq!(parse_pairs("1,2;3,4").values, vec![(1, 2), (3, 4)]);
        assert_eq!(parse_pairs("0,1;1,2;").values, vec![(0, 1), (1, 2)]);
        assert_eq!(parse_pairs(" 5 , 6 ").values, vec![(5, 6)]);
    }

    #[test]
    fn malformed_pairs_are_counted() {
        let parsed = parse_pairs("1,2;3;4,5,6;7,8");
        assert_eq!(parsed.values, vec![(1, 2), (7, 8)]);
        assert_eq!(parsed.skipped, 2);
    }
}
