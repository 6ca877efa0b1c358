//! Domain suggestions: price estimation and affordability filtering.
//!
//! The lookup API tells us whether a name is registered; it does not quote
//! prices. We estimate from a static per-TLD table and hide anything above
//! the ceiling included in every plan.

use serde::Serialize;

/// Estimated first-year price for a TLD missing from the table.
pub const DEFAULT_PRICE_USD: f64 = 12.99;

/// Most expensive domain we offer as part of a plan.
pub const MAX_PRICE_USD: f64 = 18.0;

/// Estimated first-year registration price by TLD, USD.
const TLD_PRICES: &[(&str, f64)] = &[
    ("com", 12.99),
    ("net", 14.99),
    ("org", 12.99),
    ("co", 24.99),
    ("io", 39.99),
    ("dev", 14.99),
    ("app", 16.99),
    ("biz", 17.99),
    ("info", 11.99),
    ("us", 9.99),
    ("me", 19.99),
    ("shop", 29.99),
    ("store", 49.99),
    ("online", 34.99),
    ("site", 29.99),
    ("xyz", 2.99),
    ("ai", 79.99),
];

/// A domain we can offer to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainOffer {
    pub domain: String,
    pub available: bool,
    pub price_usd: f64,
}

/// The TLD of a domain name (`"shop.example.co"` → `"co"`).
pub fn tld(domain: &str) -> &str {
    domain.trim().trim_end_matches('.').rsplit('.').next().unwrap_or_default()
}

/// Estimated price for a domain, falling back to [`DEFAULT_PRICE_USD`].
pub fn estimate_price(domain: &str) -> f64 {
    let tld = tld(domain).to_ascii_lowercase();
    TLD_PRICES
        .iter()
        .find(|(t, _)| *t == tld)
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_PRICE_USD)
}

pub fn is_affordable(domain: &str) -> bool {
    estimate_price(domain) <= MAX_PRICE_USD
}

/// Interpret a lookup API status summary (space-separated tokens such as
/// `"undelegated inactive"` or `"active"`).
///
/// Only names that are both unregistered and not reserved count as
/// available.
pub fn status_is_available(status: &str) -> bool {
    let tokens: Vec<&str> = status.split_whitespace().collect();
    let unregistered = tokens.iter().any(|t| matches!(*t, "inactive" | "undelegated"));
    let blocked = tokens
        .iter()
        .any(|t| matches!(*t, "active" | "reserved" | "premium" | "marketed" | "claimed" | "priced"));
    unregistered && !blocked
}

/// Build offers from `(domain, status)` pairs, keeping available and
/// affordable names in input order.
pub fn affordable_offers<'a, I>(results: I) -> Vec<DomainOffer>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    results
        .into_iter()
        .filter(|(_, status)| status_is_available(status))
        .map(|(domain, _)| DomainOffer {
            domain: domain.to_ascii_lowercase(),
            available: true,
            price_usd: estimate_price(domain),
        })
        .filter(|offer| offer.price_usd <= MAX_PRICE_USD)
        .collect()
}
