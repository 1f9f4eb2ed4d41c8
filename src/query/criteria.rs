//! Filter criteria value objects.
//!
//! Criteria are often partial while a user is still editing them, so every
//! field is optional and anything malformed degrades to "no constraint"
//! instead of an error.

use serde::de::{Deserializer, Error as _};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lower and upper bounds offered by a range widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterBounds {
    pub min: f64,
    pub max: f64,
}

pub const RATE_FILTER_META: FilterBounds = FilterBounds {
    min: 0.0,
    max: 2000.0,
};

pub const STAR_FILTER_META: FilterBounds = FilterBounds { min: 0.0, max: 5.0 };

/// Location options as (label, code)
pub const LOCATION_OPTIONS: &[(&str, &str)] = &[
    ("Canada", "CA"),
    ("Costa Rica", "CR"),
    ("United States", "US"),
];

pub const PLACE_TYPE_OPTIONS: &[&str] =
    &["Entire place", "Private room", "Hotel room", "Shared room"];

pub const HOUSE_TYPE_OPTIONS: &[&str] =
    &["House", "Apartment", "Bed and breakfast", "Boutique hotel"];

/// Inclusive numeric range with `min <= max`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    min: f64,
    max: f64,
}

impl RangeFilter {
    /// `None` if either bound is NaN or the range is inverted
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return None;
        }
        Some(Self { min, max })
    }

    pub fn exact(value: f64) -> Option<Self> {
        Self::new(value, value)
    }

    pub fn at_least(min: f64) -> Option<Self> {
        Self::new(min, f64::MAX)
    }

    pub fn at_most(max: f64) -> Option<Self> {
        Self::new(f64::MIN, max)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Serialize for RangeFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.min)?;
        tuple.serialize_element(&self.max)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for RangeFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        range_from_value(&value)
            .ok_or_else(|| D::Error::custom("expected [min, max] with min <= max"))
    }
}

/// The set of independent, ANDed constraints applied to a property list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    #[serde(deserialize_with = "lenient_location")]
    pub location_filter: Option<String>,
    #[serde(deserialize_with = "lenient_range")]
    pub rate_filter: Option<RangeFilter>,
    #[serde(deserialize_with = "lenient_range")]
    pub stars_filter: Option<RangeFilter>,
    #[serde(deserialize_with = "lenient_list")]
    pub house_type_filter: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub place_type_filter: Vec<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub super_host_filter: bool,
}

/// Criteria with every constraint inactive
pub const DEFAULT_FILTERS: FilterCriteria = FilterCriteria {
    location_filter: None,
    rate_filter: None,
    stars_filter: None,
    house_type_filter: Vec::new(),
    place_type_filter: Vec::new(),
    super_host_filter: false,
};

impl FilterCriteria {
    pub fn new() -> Self {
        DEFAULT_FILTERS
    }

    pub fn with_location(mut self, country: impl Into<String>) -> Self {
        let country = country.into();
        self.location_filter = (!country.is_empty()).then_some(country);
        self
    }

    /// Set the rate range; an inverted range clears the constraint
    pub fn with_rate(mut self, min: f64, max: f64) -> Self {
        self.rate_filter = RangeFilter::new(min, max);
        self
    }

    pub fn with_stars(mut self, min: f64, max: f64) -> Self {
        self.stars_filter = RangeFilter::new(min, max);
        self
    }

    pub fn with_house_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.house_type_filter = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_place_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.place_type_filter = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn super_hosts_only(mut self, enabled: bool) -> Self {
        self.super_host_filter = enabled;
        self
    }

    /// Overlay `other` onto `self`: every constraint active in `other` wins
    pub fn merge(mut self, other: FilterCriteria) -> Self {
        if other.location_filter.is_some() {
            self.location_filter = other.location_filter;
        }
        if other.rate_filter.is_some() {
            self.rate_filter = other.rate_filter;
        }
        if other.stars_filter.is_some() {
            self.stars_filter = other.stars_filter;
        }
        if !other.house_type_filter.is_empty() {
            self.house_type_filter = other.house_type_filter;
        }
        if !other.place_type_filter.is_empty() {
            self.place_type_filter = other.place_type_filter;
        }
        self.super_host_filter |= other.super_host_filter;
        self
    }

    /// Check if any constraint is active
    pub fn has_any(&self) -> bool {
        self.location_filter.is_some()
            || self.rate_filter.is_some()
            || self.stars_filter.is_some()
            || !self.house_type_filter.is_empty()
            || !self.place_type_filter.is_empty()
            || self.super_host_filter
    }
}

fn range_from_value(value: &Value) -> Option<RangeFilter> {
    match value.as_array()?.as_slice() {
        [min, max] => RangeFilter::new(min.as_f64()?, max.as_f64()?),
        _ => None,
    }
}

fn lenient_range<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RangeFilter>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(range_from_value(&value))
}

fn lenient_location<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().filter(|s| !s.is_empty()).map(str::to_string))
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}
