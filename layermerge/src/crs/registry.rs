//! EPSG lookups and CRS name aliases.
//!
//! Definitions come from the EPSG database bundled by `crs-definitions`: each
//! entry carries the PROJ string used for transformation and the WKT used for
//! `.prj` sidecars. On top of that sit the legacy code aliases and the
//! spellings ESRI software writes into `.prj` names.

use super::wkt;

/// A registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrsEntry {
    /// EPSG code
    pub code: u32,
    /// Human readable name
    pub name: String,
    /// PROJ string
    pub proj4: String,
    /// WKT definition
    pub wkt: String,
}

/// Legacy codes that are aliases of EPSG entries.
const CODE_ALIASES: &[(u32, u32)] = &[
    (900913, 3857),
    (3785, 3857),
    (102100, 3857),
    (102113, 3857),
];

/// Frequently used systems with the name spellings seen in the wild
/// (normalized, see [`normalize_name`]).
const COMMON: &[(u32, &[&str])] = &[
    (4326, &["wgs84", "wgs1984", "gcswgs1984", "crs84", "ogccrs84"]),
    (4269, &["nad83", "gcsnorthamerican1983"]),
    (4258, &["etrs89", "gcsetrs1989"]),
    (4283, &["gda94", "gcsgda1994"]),
    (
        3857,
        &[
            "wgs84pseudomercator",
            "wgs1984webmercatorauxiliarysphere",
            "webmercator",
            "googlemaps",
        ],
    ),
    (3395, &["wgs84worldmercator", "worldmercator", "wgs1984worldmercator"]),
    (3035, &["etrs89laea", "etrs89extendedlaeaeurope", "etrs1989laea"]),
    (2154, &["rgf93lambert93", "rgf93v1lambert93"]),
    (
        27700,
        &[
            "osgb1936britishnationalgrid",
            "osgb36britishnationalgrid",
            "britishnationalgrid",
        ],
    ),
];

/// Normalize a CRS name for alias matching: lowercase ASCII alphanumerics only.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Map legacy alias codes onto their EPSG equivalent.
pub fn canonical_code(code: u32) -> u32 {
    CODE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == code)
        .map(|(_, target)| *target)
        .unwrap_or(code)
}

/// Look up an EPSG code in the bundled database.
pub fn lookup(code: u32) -> Option<CrsEntry> {
    let code = canonical_code(code);
    let definition = u16::try_from(code).ok().and_then(crs_definitions::from_code)?;

    let name = wkt::parse(definition.wkt)
        .ok()
        .and_then(|root| root.name().map(str::to_string))
        .unwrap_or_else(|| format!("EPSG:{}", code));

    Some(CrsEntry {
        code,
        name,
        proj4: definition.proj4.to_string(),
        wkt: definition.wkt.to_string(),
    })
}

/// Find an EPSG code from a CRS name such as `WGS_1984_UTM_Zone_33N`.
pub fn find_by_name(name: &str) -> Option<u32> {
    let normalized = normalize_name(name);
    if normalized.is_empty() {
        return None;
    }

    if let Some(code) = normalized
        .strip_prefix("epsg")
        .and_then(|digits| digits.parse().ok())
    {
        return Some(canonical_code(code));
    }

    if let Some((code, _)) = COMMON
        .iter()
        .find(|(_, aliases)| aliases.contains(&normalized.as_str()))
    {
        return Some(*code);
    }

    if let Some(code) = find_utm_by_name(&normalized) {
        return Some(code);
    }

    COMMON
        .iter()
        .map(|(code, _)| *code)
        .find(|code| lookup(*code).is_some_and(|entry| normalize_name(&entry.name) == normalized))
}

fn find_utm_by_name(normalized: &str) -> Option<u32> {
    const WGS84_PREFIXES: &[&str] = &["wgs84utmzone", "wgs1984utmzone"];
    const ETRS89_PREFIXES: &[&str] = &["etrs89utmzone", "etrs1989utmzone"];

    let parse_zone = |rest: &str| -> Option<(u32, bool)> {
        let (digits, hemisphere) = rest.split_at(rest.len().checked_sub(1)?);
        let zone: u32 = digits.parse().ok()?;
        match hemisphere {
            "n" => Some((zone, false)),
            "s" => Some((zone, true)),
            _ => None,
        }
    };

    for prefix in WGS84_PREFIXES {
        if let Some(rest) = normalized.strip_prefix(*prefix) {
            let (zone, south) = parse_zone(rest)?;
            if (1..=60).contains(&zone) {
                return Some(if south { 32700 + zone } else { 32600 + zone });
            }
            return None;
        }
    }

    for prefix in ETRS89_PREFIXES {
        if let Some(rest) = normalized.strip_prefix(*prefix) {
            let (zone, south) = parse_zone(rest)?;
            if !south && (28..=38).contains(&zone) {
                return Some(25800 + zone);
            }
            return None;
        }
    }

    None
}

/// Codes of the frequently used systems, in ascending order.
pub fn common_codes() -> Vec<u32> {
    let mut codes: Vec<u32> = COMMON.iter().map(|(code, _)| *code).collect();
    codes.sort_unstable();
    codes
}
