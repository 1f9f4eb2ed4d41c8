use serde::{Deserialize, Serialize};

/// Unique identifier for a property listing
pub type PropertyId = u64;

/// Identifier of the host owning one or more listings
pub type HostId = u64;

/// Location code (e.g. "US", "CA")
pub type CountryCode = String;

/// A single rental listing as served by the property API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: PropertyId,
    pub name: String,
    pub host_id: HostId,
    pub country: CountryCode,
    /// Nightly rate in currency units
    pub rate: f64,
    /// Average guest rating, 0.0 to 5.0
    pub stars: f64,
    pub house_type: String,
    pub place_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub territory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt_text: Option<String>,
}

impl PropertyRecord {
    /// "City, Territory" line shown under the listing title, if known
    pub fn location_label(&self) -> Option<String> {
        match (&self.city, &self.territory) {
            (Some(city), Some(territory)) => Some(format!("{}, {}", city, territory)),
            (Some(city), None) => Some(city.clone()),
            (None, Some(territory)) => Some(territory.clone()),
            (None, None) => None,
        }
    }
}

/// Payload stored at a trie node: enough to render a search option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub id: PropertyId,
    pub name: String,
}

impl Match {
    pub fn new(id: PropertyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Anything with an identity and a display name can be put in a prefix index
pub trait Searchable {
    fn search_id(&self) -> PropertyId;
    fn search_name(&self) -> &str;

    fn to_match(&self) -> Match {
        Match::new(self.search_id(), self.search_name())
    }
}

impl Searchable for PropertyRecord {
    fn search_id(&self) -> PropertyId {
        self.id
    }

    fn search_name(&self) -> &str {
        &self.name
    }
}

impl Searchable for Match {
    fn search_id(&self) -> PropertyId {
        self.id
    }

    fn search_name(&self) -> &str {
        &self.name
    }

    fn to_match(&self) -> Match {
        self.clone()
    }
}

impl<T: Searchable + ?Sized> Searchable for &T {
    fn search_id(&self) -> PropertyId {
        (**self).search_id()
    }

    fn search_name(&self) -> &str {
        (**self).search_name()
    }
}

/// What happens when two distinct entities lowercase to the same full name.
///
/// The same id inserted twice always replaces its earlier payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Keep every distinct entity at the node, in insertion order
    #[default]
    KeepAll,
    /// Keep only the entity processed last
    LastWriteWins,
}

/// Configuration for the index builder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    pub collision_policy: CollisionPolicy,
}

/// Counters collected while building an index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Entities whose match payload was stored
    pub indexed: usize,
    /// Entities skipped because their name was empty
    pub skipped_empty: usize,
    /// Payloads dropped or replaced because of a name collision
    pub collisions: usize,
}
