/// Site registry and site helpers.
///
/// The live site list always comes from the backend. The reference registry
/// below is the set of water bodies the simulated backend (`dev_mode`)
/// serves, and what fixtures in tests are drawn from.

use crate::model::MonitoredSite;

// ---------------------------------------------------------------------------
// Reference sites
// ---------------------------------------------------------------------------

/// Metadata for one reference water body.
pub struct ReferenceSite {
    pub name: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Surface area, sq km.
    pub area: f64,
}

/// Water bodies monitored across Delhi, river first, then lakes by size.
///
/// Two pairs share coordinates (Hauz Khas / Neela Hauz and Yamuna /
/// Coronation Park); markers are keyed by site id, never by position.
pub static REFERENCE_SITES: &[ReferenceSite] = &[
    ReferenceSite { name: "Yamuna River", latitude: 28.7041, longitude: 77.1025, area: 1500.0 },
    ReferenceSite { name: "Hauz Khas Lake", latitude: 28.5511, longitude: 77.2000, area: 12.5 },
    ReferenceSite { name: "Sanjay Lake", latitude: 28.5689, longitude: 77.3125, area: 8.2 },
    ReferenceSite { name: "Buddha Jayanti Park Lake", latitude: 28.6041, longitude: 77.2455, area: 6.8 },
    ReferenceSite { name: "Neela Hauz Lake", latitude: 28.5511, longitude: 77.2000, area: 4.5 },
    ReferenceSite { name: "Roshanara Bagh Lake", latitude: 28.6681, longitude: 77.2097, area: 3.2 },
    ReferenceSite { name: "Coronation Park Lake", latitude: 28.7041, longitude: 77.1025, area: 2.8 },
    ReferenceSite { name: "Lodhi Garden Lake", latitude: 28.5896, longitude: 77.2276, area: 1.5 },
];

/// The reference registry as `MonitoredSite`s, numbered from 1 in
/// registry order.
pub fn reference_sites() -> Vec<MonitoredSite> {
    REFERENCE_SITES
        .iter()
        .zip(1u32..)
        .map(|(s, id)| MonitoredSite {
            id,
            name: s.name.to_string(),
            latitude: s.latitude,
            longitude: s.longitude,
            area: s.area,
            status: "active".to_string(),
        })
        .collect()
}

/// Looks up a site by id. Returns `None` if not found.
pub fn find_site(sites: &[MonitoredSite], id: u32) -> Option<&MonitoredSite> {
    sites.iter().find(|s| s.id == id)
}

// ---------------------------------------------------------------------------
// Size classes
// ---------------------------------------------------------------------------

/// Size buckets used by the map's size filter:
///   small  < 1 sq km
///   medium 1 ..= 10 sq km
///   large  > 10 sq km
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn of(area: f64) -> SizeClass {
        if area > 10.0 {
            SizeClass::Large
        } else if area >= 1.0 {
            SizeClass::Medium
        } else {
            SizeClass::Small
        }
    }

    pub fn from_key(key: &str) -> Option<SizeClass> {
        match key {
            "small" => Some(SizeClass::Small),
            "medium" => Some(SizeClass::Medium),
            "large" => Some(SizeClass::Large),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
