//! Texts of the messages sent by the bot. All of them are in `MarkdownV2`
//! format, so any dynamic text must be escaped.

use crate::tracking::{TrackingQuery, TrackingResult};
use itertools::Itertools;
use std::time::Duration;
use teloxide::utils::markdown;

/// Max number of history entries shown in the reply. The full history is
/// usually too long to fit into a single message.
const HISTORY_PREVIEW_LEN: usize = 6;

const EXAMPLE_QUERY: &str = "EZ123456789IN";

pub(crate) fn greeting() -> String {
    let text = markdown::escape(
        "📦 Send me your India Post tracking number and I'll fetch its live status.",
    );
    format!("{text}\n\n{}", example_usage())
}

/// `max_wait` is the worst case duration of the whole lookup
pub(crate) fn acknowledgement(max_wait: Duration) -> String {
    markdown::escape(&format!(
        "📦 Tracking your SpeedPost parcel...\n\
        ⏳ Please wait up to {} seconds while the live India Post data is fetched.",
        max_wait.as_secs()
    ))
}

pub(crate) fn not_found() -> String {
    let text = markdown::escape("❌ Tracking number not found.");
    format!("{text}\n\n{}", example_usage())
}

pub(crate) fn tracking_result(query: &TrackingQuery, result: &TrackingResult) -> String {
    let field = |value: &Option<String>, placeholder: &str| {
        markdown::escape(value.as_deref().unwrap_or(placeholder))
    };

    let status = field(&result.status, "Status not available");
    let location = field(&result.location, "Location not available");
    let timestamp = field(&result.timestamp, "Date & Time not available");

    let mut text = format!(
        "📦 *SpeedPost / India Post Tracking*\n\n\
        🔹 *Tracking No:* {}\n\n\
        🔸 *Current Status:* {}\n\
        📍 *Location:* {location}\n\
        🕒 *Date & Time:* {timestamp}\n\n",
        markdown::code_inline(query.as_str()),
        markdown::bold(&status),
    );

    if !result.history.is_empty() {
        let history = result
            .history
            .iter()
            .take(HISTORY_PREVIEW_LEN)
            .enumerate()
            .map(|(i, event)| format!("{}\\. {}", i + 1, markdown::escape(event)))
            .join("\n");

        text.push_str(&format!("📜 *Recent Activity:*\n{history}\n\n"));
    }

    text.push_str(&format!(
        "🔎 _{}_",
        markdown::escape(
            "If the details look incomplete, try again after a minute \
            (the tracking service may still be updating)."
        )
    ));

    text
}

fn example_usage() -> String {
    format!(
        "{} {}",
        markdown::escape("Make sure it looks like this:"),
        markdown::code_inline(EXAMPLE_QUERY)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn query() -> TrackingQuery {
        TrackingQuery::parse("EZ123456789IN").unwrap()
    }

    #[test]
    fn full_result() {
        let result = TrackingResult {
            status: Some("Item Delivered (Addressee)".to_owned()),
            location: Some("Mumbai G.P.O.".to_owned()),
            timestamp: Some("17-10-2026 10:15".to_owned()),
            history: (1..=8).map(|i| format!("Event #{i}")).collect(),
        };

        expect![[r#"
            📦 *SpeedPost / India Post Tracking*

            🔹 *Tracking No:* `EZ123456789IN`

            🔸 *Current Status:* *Item Delivered \(Addressee\)*
            📍 *Location:* Mumbai G\.P\.O\.
            🕒 *Date & Time:* 17\-10\-2026 10:15

            📜 *Recent Activity:*
            1\. Event \#1
            2\. Event \#2
            3\. Event \#3
            4\. Event \#4
            5\. Event \#5
            6\. Event \#6

            🔎 _If the details look incomplete, try again after a minute \(the tracking service may still be updating\)\._"#]]
        .assert_eq(&tracking_result(&query(), &result));
    }

    #[test]
    fn placeholders_without_history() {
        let result = TrackingResult {
            status: Some("Booked".to_owned()),
            ..Default::default()
        };

        expect![[r#"
            📦 *SpeedPost / India Post Tracking*

            🔹 *Tracking No:* `EZ123456789IN`

            🔸 *Current Status:* *Booked*
            📍 *Location:* Location not available
            🕒 *Date & Time:* Date & Time not available

            🔎 _If the details look incomplete, try again after a minute \(the tracking service may still be updating\)\._"#]]
        .assert_eq(&tracking_result(&query(), &result));
    }

    #[test]
    fn fixed_messages() {
        expect![[r#"
            ❌ Tracking number not found\.

            Make sure it looks like this: `EZ123456789IN`"#]]
        .assert_eq(&not_found());

        expect![[r#"
            📦 Tracking your SpeedPost parcel\.\.\.
            ⏳ Please wait up to 240 seconds while the live India Post data is fetched\."#]]
        .assert_eq(&acknowledgement(crate::tracking::Config::default().max_wait()));
    }
}
