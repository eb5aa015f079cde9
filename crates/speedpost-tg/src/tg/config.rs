use serde::Deserialize;
use url::Url;

#[derive(Deserialize, Clone)]
pub(crate) struct Config {
    pub(crate) token: String,

    /// Public base URL of the bot. If it's set, then Telegram delivers the
    /// updates to `{webhook_url}/webhook`, otherwise long polling is used.
    pub(crate) webhook_url: Option<Url>,

    /// Local port where the webhook listener is bound
    #[serde(default = "default_webhook_port")]
    pub(crate) webhook_port: u16,
}

fn default_webhook_port() -> u16 {
    10000
}

impl Config {
    pub(crate) fn webhook_endpoint(&self) -> Option<Result<Url, url::ParseError>> {
        let base = self.webhook_url.as_ref()?;

        // Without the trailing slash the last path segment would be replaced
        let base = if base.path().ends_with('/') {
            base.clone()
        } else {
            let mut base = base.clone();
            base.set_path(&format!("{}/", base.path()));
            base
        };

        Some(base.join("webhook"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()));

        envy::prefixed("TG_").from_iter(vars).unwrap()
    }

    #[test]
    fn polling_by_default() {
        let cfg = config(&[("TG_TOKEN", "123:abc")]);

        assert_eq!(cfg.token, "123:abc");
        assert_eq!(cfg.webhook_port, 10000);
        assert!(cfg.webhook_endpoint().is_none());
    }

    #[test]
    fn webhook_endpoint() {
        let endpoint = |base: &str| {
            config(&[("TG_TOKEN", "123:abc"), ("TG_WEBHOOK_URL", base)])
                .webhook_endpoint()
                .unwrap()
                .unwrap()
                .to_string()
        };

        assert_eq!(
            endpoint("https://bot.example.com"),
            "https://bot.example.com/webhook"
        );
        assert_eq!(
            endpoint("https://example.com/speedpost"),
            "https://example.com/speedpost/webhook"
        );
        assert_eq!(
            endpoint("https://example.com/speedpost/"),
            "https://example.com/speedpost/webhook"
        );
    }

    #[test]
    fn custom_webhook_port() {
        let cfg = config(&[("TG_TOKEN", "123:abc"), ("TG_WEBHOOK_PORT", "8443")]);
        assert_eq!(cfg.webhook_port, 8443);
    }
}
