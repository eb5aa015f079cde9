use super::HISTORY_SEPARATOR;
use crate::tracking::TrackingResult;
use itertools::Itertools;
use scraper::{ElementRef, Html, Node, Selector};

/// Text inside of these elements is never rendered by browsers
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Lines that contain any of these are considered to be tracking events when
/// there is no table with the events on the page
const EVENT_KEYWORDS: &[&str] = &[
    "delivered",
    "out for",
    "received",
    "bag",
    "dispatched",
    "booking",
    "arrived",
    "delivery",
    "scan",
];

const STATUS_NEEDLES: &[&str] = &["status"];
const LOCATION_NEEDLES: &[&str] = &["location"];
const TIMESTAMP_NEEDLES: &[&str] = &["date", "time"];

pub(super) fn normalize(html: &str) -> Option<TrackingResult> {
    let document = Html::parse_document(html);
    let lines: Vec<&str> = visible_text(document.root_element()).collect();

    let adjacent = AdjacentFields::scan(&lines);

    let status = adjacent
        .status
        .or_else(|| find_by_attribute(&document, STATUS_NEEDLES));

    let location = adjacent
        .location
        .or_else(|| find_by_attribute(&document, LOCATION_NEEDLES));

    let timestamp = adjacent
        .timestamp
        .or_else(|| find_by_attribute(&document, TIMESTAMP_NEEDLES));

    let history = table_history(&document).unwrap_or_else(|| keyword_history(&lines));

    TrackingResult {
        status,
        location,
        timestamp,
        history,
    }
    .into_present()
}

/// Values found on the line right after the line that mentions the field,
/// e.g. a `Status` label followed by `Delivered`. Only the first mention of
/// every field counts.
#[derive(Default)]
struct AdjacentFields {
    status: Option<String>,
    location: Option<String>,
    timestamp: Option<String>,
}

impl AdjacentFields {
    fn scan(lines: &[&str]) -> Self {
        let mut fields = Self::default();

        for (line, next) in lines.iter().tuple_windows() {
            let line = line.to_lowercase();

            let set_if_absent = |field: &mut Option<String>, needles: &[&str]| {
                if field.is_none() && contains_any(&line, needles) {
                    *field = Some((*next).to_owned());
                }
            };

            set_if_absent(&mut fields.status, STATUS_NEEDLES);
            set_if_absent(&mut fields.location, LOCATION_NEEDLES);
            set_if_absent(&mut fields.timestamp, TIMESTAMP_NEEDLES);
        }

        fields
    }
}

/// Looks for the first element which has any of the needles in its `class`
/// attribute, or if there is no such element, then in its `id` attribute.
/// Elements without any visible text are ignored.
fn find_by_attribute(document: &Html, needles: &[&str]) -> Option<String> {
    let any = selector("[class], [id]");

    let with_attribute = |attr: &'static str| {
        document.select(&any).filter(move |element| {
            element
                .value()
                .attr(attr)
                .is_some_and(|value| contains_any(&value.to_lowercase(), needles))
        })
    };

    with_attribute("class")
        .chain(with_attribute("id"))
        .map(|element| visible_text(element).join(" "))
        .find(|text| !text.is_empty())
}

/// Rows of the first table on the page, if there is any table at all
fn table_history(document: &Html) -> Option<Vec<String>> {
    let table = document.select(&selector("table")).next()?;
    let cell_selector = selector("td, th");

    let history = table
        .select(&selector("tr"))
        .filter_map(|row| {
            let cells: Vec<_> = row
                .select(&cell_selector)
                .map(|cell| visible_text(cell).join(" "))
                .filter(|text| !text.is_empty())
                .collect();

            (!cells.is_empty()).then(|| cells.join(HISTORY_SEPARATOR))
        })
        .collect();

    Some(history)
}

fn keyword_history(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| contains_any(&line.to_lowercase(), EVENT_KEYWORDS))
        .map(|line| (*line).to_owned())
        .collect()
}

/// Non-empty trimmed lines of text visible inside of the element, in the
/// document order
fn visible_text<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element
        .descendants()
        .filter(|node| !node.ancestors().any(|ancestor| is_hidden(ancestor.value())))
        .filter_map(|node| node.value().as_text())
        .flat_map(|text| text.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

fn is_hidden(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("BUG: invalid selector `{css}`: {err:?}"))
}
