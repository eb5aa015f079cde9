use crate::tracking::TrackingQuery;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

const PLACEHOLDER: &str = "{}";

/// Sample identifier used to validate the templates when they are loaded
const SAMPLE_QUERY: &str = "EZ123456789IN";

/// URL pattern with exactly one `{}` placeholder that is substituted with
/// the tracking identifier. The placeholder may be either in the path or in
/// the query string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub(crate) struct UrlTemplate(String);

impl UrlTemplate {
    pub(crate) fn render(&self, query: &TrackingQuery) -> Result<Url, url::ParseError> {
        let encoded: String =
            url::form_urlencoded::byte_serialize(query.as_str().as_bytes()).collect();

        Url::parse(&self.0.replacen(PLACEHOLDER, &encoded, 1))
    }

    fn render_sample(&self) -> Option<Url> {
        Url::parse(&self.0.replacen(PLACEHOLDER, SAMPLE_QUERY, 1)).ok()
    }
}

impl TryFrom<String> for UrlTemplate {
    type Error = InvalidUrlTemplate;

    fn try_from(template: String) -> Result<Self, Self::Error> {
        let placeholders = template.matches(PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(InvalidUrlTemplate::Placeholders {
                template,
                placeholders,
            });
        }

        if let Err(source) = Url::parse(&template.replacen(PLACEHOLDER, SAMPLE_QUERY, 1)) {
            return Err(InvalidUrlTemplate::Url { template, source });
        }

        Ok(Self(template))
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum InvalidUrlTemplate {
    #[error(
        "URL template must contain exactly one `{{}}` placeholder, \
        but found {placeholders} in {template}"
    )]
    Placeholders {
        template: String,
        placeholders: usize,
    },

    #[error("URL template doesn't produce a valid URL: {template}")]
    Url {
        template: String,
        source: url::ParseError,
    },
}

/// A single way to ask an external service about a shipment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Endpoint {
    /// Plain `GET` request to the URL with the identifier substituted
    Get { url: UrlTemplate },

    /// ASP.NET WebForms page. The page is loaded first to collect the hidden
    /// anti-forgery inputs (`__VIEWSTATE`, `__EVENTVALIDATION`, etc.), and
    /// then they are posted back together with the identifier.
    AspNetForm {
        url: Url,

        /// Name of the form input where the identifier should be put
        tracking_field: String,

        /// Additional static inputs, e.g. the name and value of the submit button
        #[serde(default)]
        extra_fields: BTreeMap<String, String>,
    },
}

impl Endpoint {
    pub(crate) fn get(template: &str) -> Result<Self, InvalidUrlTemplate> {
        Ok(Self::Get {
            url: template.to_owned().try_into()?,
        })
    }

    /// Host name used to label the metrics
    pub(crate) fn host(&self) -> String {
        let url = match self {
            Endpoint::Get { url } => url.render_sample(),
            Endpoint::AspNetForm { url, .. } => Some(url.clone()),
        };

        url.as_ref()
            .and_then(Url::host_str)
            .unwrap_or("{unknown}")
            .to_owned()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Get { url } => write!(f, "GET {url}"),
            Endpoint::AspNetForm { url, .. } => write!(f, "GET+POST {url}"),
        }
    }
}

/// Query-parameter and path-parameter variants of myspeedpost.com.
/// None of them is documented, and they come and go, so all of them are tried.
const MYSPEEDPOST_TEMPLATES: &[&str] = &[
    "https://myspeedpost.com/track?num={}",
    "https://myspeedpost.com/track?number={}",
    "https://myspeedpost.com/track/{}",
    "https://myspeedpost.com/?num={}",
    "https://myspeedpost.com/?awb={}",
    "https://myspeedpost.com/?tracking={}",
];

pub(crate) fn default_endpoints() -> Vec<Endpoint> {
    MYSPEEDPOST_TEMPLATES
        .iter()
        .map(|template| {
            Endpoint::get(template)
                .unwrap_or_else(|err| panic!("BUG: invalid builtin URL template: {err}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use expect_test::expect;

    fn query() -> TrackingQuery {
        TrackingQuery::parse(" ez123456789in ").unwrap()
    }

    #[test]
    fn render_normalized_query() {
        let rendered = default_endpoints()
            .iter()
            .map(|endpoint| match endpoint {
                Endpoint::Get { url } => url.render(&query()).unwrap().to_string(),
                Endpoint::AspNetForm { .. } => unreachable!(),
            })
            .collect::<Vec<_>>()
            .join("\n");

        expect![[r#"
            https://myspeedpost.com/track?num=EZ123456789IN
            https://myspeedpost.com/track?number=EZ123456789IN
            https://myspeedpost.com/track/EZ123456789IN
            https://myspeedpost.com/?num=EZ123456789IN
            https://myspeedpost.com/?awb=EZ123456789IN
            https://myspeedpost.com/?tracking=EZ123456789IN"#]]
        .assert_eq(&rendered);
    }

    #[test]
    fn render_escapes_query() {
        let template = UrlTemplate::try_from("https://example.com/track?num={}".to_owned()).unwrap();
        let query = TrackingQuery::parse("a&b=c").unwrap();

        expect!["https://example.com/track?num=A%26B%3DC"]
            .assert_eq(template.render(&query).unwrap().as_str());
    }

    #[test]
    fn invalid_templates() {
        let err = UrlTemplate::try_from("https://example.com/track".to_owned()).unwrap_err();
        expect![[r#"URL template must contain exactly one `{}` placeholder, but found 0 in https://example.com/track"#]]
            .assert_eq(&err.to_string());

        let err = UrlTemplate::try_from("https://example.com/{}/{}".to_owned()).unwrap_err();
        expect![[r#"URL template must contain exactly one `{}` placeholder, but found 2 in https://example.com/{}/{}"#]]
            .assert_eq(&err.to_string());

        let err = UrlTemplate::try_from("not a url {}".to_owned()).unwrap_err();
        expect!["URL template doesn't produce a valid URL: not a url {}"].assert_eq(&err.to_string());
    }

    #[test]
    fn deserialize_endpoints() {
        let json = r#"[
            {"kind": "get", "url": "https://example.com/track/{}"},
            {
                "kind": "asp_net_form",
                "url": "https://www.indiapost.gov.in/track",
                "tracking_field": "txtOrignlPgTranNo",
                "extra_fields": {"btnSearch": "Search"}
            }
        ]"#;

        let endpoints: Vec<Endpoint> = serde_json::from_str(json).unwrap();

        let hosts: Vec<_> = endpoints.iter().map(Endpoint::host).collect();
        assert_eq!(hosts, ["example.com", "www.indiapost.gov.in"]);

        assert_eq!(
            endpoints[0],
            Endpoint::get("https://example.com/track/{}").unwrap()
        );
        assert_matches!(
            &endpoints[1],
            Endpoint::AspNetForm { url, tracking_field, extra_fields }
            if url.as_str() == "https://www.indiapost.gov.in/track"
                && tracking_field == "txtOrignlPgTranNo"
                && extra_fields.get("btnSearch").map(String::as_str) == Some("Search")
        );
    }

    #[test]
    fn deserialize_rejects_bad_template() {
        let json = r#"[{"kind": "get", "url": "https://example.com/track"}]"#;
        assert!(serde_json::from_str::<Vec<Endpoint>>(json).is_err());
    }
}
