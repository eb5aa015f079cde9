use serde::Serialize;

/// Best-effort summary of a shipment state extracted from a tracking page.
/// All the fields are free text exactly as the source presented them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct TrackingResult {
    pub(crate) status: Option<String>,
    pub(crate) location: Option<String>,

    /// Date and time of the last event. It's not parsed, because every
    /// source uses its own format.
    pub(crate) timestamp: Option<String>,

    /// Event log lines, most-recent-first if the source orders them that way.
    /// This is the full list; truncation happens only when it's displayed.
    pub(crate) history: Vec<String>,
}

impl TrackingResult {
    /// Returns [`None`] if there is no data in the result at all.
    /// Empty strings are considered to be missing values.
    pub(crate) fn into_present(self) -> Option<Self> {
        let non_empty = |value: Option<String>| value.filter(|value| !value.is_empty());

        let result = Self {
            status: non_empty(self.status),
            location: non_empty(self.location),
            timestamp: non_empty(self.timestamp),
            history: self.history,
        };

        let is_present = result.status.is_some()
            || result.location.is_some()
            || result.timestamp.is_some()
            || !result.history.is_empty();

        is_present.then_some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence() {
        assert_eq!(TrackingResult::default().into_present(), None);

        let blank = TrackingResult {
            status: Some(String::new()),
            location: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(blank.into_present(), None);

        let history_only = TrackingResult {
            history: vec!["Item Booked".to_owned()],
            ..Default::default()
        };
        assert_eq!(history_only.clone().into_present(), Some(history_only));

        let partial = TrackingResult {
            status: Some("Delivered".to_owned()),
            location: Some(String::new()),
            ..Default::default()
        };
        let expected = TrackingResult {
            status: Some("Delivered".to_owned()),
            ..Default::default()
        };
        assert_eq!(partial.into_present(), Some(expected));
    }
}
