//! Extraction of the shipment state from the responses of the tracking
//! services. There is no schema that the services follow, and their markup
//! may change any time, so this is a cascade of heuristics that prefers
//! finding at least something over finding exactly the right thing.

mod html;
mod json;

use crate::tracking::TrackingResult;

/// Separator used to flatten the cells of a single event into one line
const HISTORY_SEPARATOR: &str = " • ";

/// Returns [`None`] if nothing useful could be found in the response.
/// This function is pure, so the same input always produces the same output.
///
/// Markup heuristics are applied to every body, because some mirrors label
/// their HTML pages as JSON. Field mapping of JSON is tried only when the
/// markup heuristics found nothing and the content type says it's JSON.
pub(crate) fn normalize(body: &[u8], content_type: &str) -> Option<TrackingResult> {
    html::normalize(&String::from_utf8_lossy(body))
        .or_else(|| is_structured(content_type).then(|| json::normalize(body)).flatten())
}

/// Missing or unknown content type is treated as markup
fn is_structured(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let Some((_, subtype)) = essence.split_once('/') else {
        return false;
    };

    subtype == "json" || subtype.ends_with("+json")
}
