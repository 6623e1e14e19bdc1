//! Search facets.
//!
//! A facet is either constrained or absent. The sentinel values `any` and
//! `all` mean "no constraint" and are never stored, so a filter set built
//! with sentinels is indistinguishable from one built without them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    SortOrder,
    UploadDate,
    Duration,
    ResultType,
}

impl Facet {
    pub const ALL: [Facet; 4] = [
        Facet::SortOrder,
        Facet::UploadDate,
        Facet::Duration,
        Facet::ResultType,
    ];

    /// Query parameter name understood by mirror instances.
    pub fn mirror_param(&self) -> &'static str {
        match self {
            Facet::SortOrder => "sort_by",
            Facet::UploadDate => "date",
            Facet::Duration => "duration",
            Facet::ResultType => "type",
        }
    }

    fn mirror_value<'a>(&self, value: &'a str) -> &'a str {
        match (self, value) {
            (Facet::SortOrder, "date") => "upload_date",
            (Facet::SortOrder, "views") => "view_count",
            (_, other) => other,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Facet::SortOrder => "order",
            Facet::UploadDate => "date",
            Facet::Duration => "duration",
            Facet::ResultType => "type",
        };
        f.write_str(name)
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" | "sort" | "sort_by" => Ok(Facet::SortOrder),
            "date" | "upload_date" => Ok(Facet::UploadDate),
            "duration" => Ok(Facet::Duration),
            "type" => Ok(Facet::ResultType),
            other => Err(format!("unknown search facet `{other}`")),
        }
    }
}

/// Returns true for the "no constraint" sentinels.
pub fn is_unconstrained(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("any") || value.eq_ignore_ascii_case("all")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    facets: BTreeMap<Facet, String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a facet; a sentinel value removes it instead.
    pub fn set(&mut self, facet: Facet, value: impl Into<String>) {
        let value = value.into();
        if is_unconstrained(&value) {
            self.facets.remove(&facet);
        } else {
            self.facets.insert(facet, value.trim().to_string());
        }
    }

    pub fn with(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.set(facet, value);
        self
    }

    pub fn remove(&mut self, facet: Facet) {
        self.facets.remove(&facet);
    }

    pub fn clear(&mut self) {
        self.facets.clear();
    }

    pub fn get(&self, facet: Facet) -> Option<&str> {
        self.facets
            .get(&facet)
            .map(String::as_str)
            .filter(|v| !is_unconstrained(v))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Facet, &str)> {
        self.facets
            .iter()
            .map(|(facet, value)| (*facet, value.as_str()))
            .filter(|(_, value)| !is_unconstrained(value))
    }

    /// Mirror query parameters in a stable order.
    pub fn to_mirror_query(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(facet, value)| {
                (
                    facet.mirror_param().to_string(),
                    facet.mirror_value(value).to_string(),
                )
            })
            .collect()
    }
}
