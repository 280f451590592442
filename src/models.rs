use chrono::serde::{ts_seconds, ts_seconds_option};
use chrono::{DateTime, Utc};
use getset::Getters;
use serde::Deserialize;

/// Management attributes shared by secrets and keys.
#[derive(Deserialize, Debug, Clone, Getters)]
#[getset(get = "pub")]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    #[serde(default = "enabled_default")]
    enabled: bool,
    #[serde(default, with = "ts_seconds_option")]
    nbf: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_seconds_option")]
    exp: Option<DateTime<Utc>>,
    #[serde(with = "ts_seconds")]
    created: DateTime<Utc>,
    #[serde(with = "ts_seconds")]
    updated: DateTime<Utc>,
    #[serde(default)]
    recovery_level: Option<String>,
    #[serde(default)]
    recoverable_days: Option<u32>,
    #[serde(default)]
    exportable: Option<bool>,
}

fn enabled_default() -> bool {
    true
}

impl Attributes {
    /// True when the item is enabled and `now` lies inside its `nbf`/`exp` window,
    /// i.e. the vault would serve or use it at that instant.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.enabled
            && self.nbf.map_or(true, |nbf| nbf <= now)
            && self.exp.map_or(true, |exp| exp > now)
    }
}

/// One page of a list operation. `next_link` is absent on the last page.
#[derive(Deserialize, Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(default, rename = "nextLink")]
    next_link: Option<String>,
}

impl<T> Page<T> {
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        (self.value, self.next_link)
    }
}

/// Last path segment of an item identifier, e.g. the name in
/// `https://vault.vault.azure.net/secrets/{name}`.
pub(crate) fn last_segment(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}
