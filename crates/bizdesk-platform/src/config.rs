use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub http_addr: String,
    /// Rows per page on the customers and receipts listings.
    pub page_size: usize,
    /// Entries shown in the home activity feed.
    pub activity_limit: usize,
    pub default_currency: String,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(default_http_addr, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        default_http_addr: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());
        let page_size = parse_count(&lookup, "BIZDESK_PAGE_SIZE", 10)?;
        let activity_limit = parse_count(&lookup, "BIZDESK_ACTIVITY_LIMIT", 10)?;
        let default_currency = lookup("BIZDESK_CURRENCY")
            .map(|currency| currency.trim().to_ascii_uppercase())
            .filter(|currency| !currency.is_empty())
            .unwrap_or_else(|| "EUR".to_string());

        Ok(Self {
            http_addr,
            page_size,
            activity_limit,
            default_currency,
        })
    }
}

fn parse_count(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => {
            let value: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a positive integer, got '{raw}'"))?;
            anyhow::ensure!(value > 0, "{key} must be greater than zero");
            Ok(value)
        }
    }
}
