use std::fmt;

/// Postal tracking identifier (AWB) in its canonical form: uppercased and
/// without any whitespace.
///
/// No further validation is done on purpose. Malformed identifiers are
/// forwarded to the tracking services as is, and they will just not find
/// anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TrackingQuery(String);

impl TrackingQuery {
    /// Returns [`None`] if there is nothing left after the normalization
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|char| !char.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect();

        if normalized.is_empty() {
            return None;
        }

        Some(Self(normalized))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{expect, Expect};

    #[track_caller]
    fn assert_parse(raw: &str, expected: Expect) {
        let actual = match TrackingQuery::parse(raw) {
            Some(query) => query.to_string(),
            None => "None".to_owned(),
        };
        expected.assert_eq(&actual);
    }

    #[test]
    fn normalization() {
        use assert_parse as test;

        test(" ez123456789in ", expect!["EZ123456789IN"]);
        test("EZ 1234 5678 9IN", expect!["EZ123456789IN"]);
        test("\tez123456789in\n", expect!["EZ123456789IN"]);
        test("not-a-code!", expect!["NOT-A-CODE!"]);
    }

    #[test]
    fn empty_input() {
        use assert_parse as test;

        test("", expect!["None"]);
        test("   \n\t ", expect!["None"]);
    }
}
