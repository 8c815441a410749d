//! Parsed coordinate reference system definitions.

use proj4rs::Proj;

use super::error::CrsError;
use super::registry;
use super::spec::CrsSpec;
use super::wkt;

/// A CRS that has been recognized and is ready to transform coordinates.
#[derive(Debug, Clone)]
pub struct CrsDefinition {
    code: Option<u32>,
    name: String,
    proj4: String,
    wkt: Option<String>,
    proj: Proj,
}

impl CrsDefinition {
    /// Interpret a CRS spec.
    ///
    /// Accepted forms:
    /// - `EPSG:4326`, `epsg:3857`, `urn:ogc:def:crs:EPSG::2154`, `4326`
    /// - `WGS84`, `CRS84`, and common names such as `WGS 84 / UTM zone 33N`
    /// - PROJ strings starting with `+proj=`
    /// - OGC or ESRI WKT (version 1 or 2), as found in `.prj` files
    ///
    /// # Errors
    ///
    /// Returns [`CrsError::InvalidCrs`] when the text is blank, malformed,
    /// names an EPSG code the database does not hold, or is WKT for a system
    /// PROJ cannot express.
    pub fn parse(spec: &CrsSpec) -> Result<Self, CrsError> {
        let text = spec.as_str().trim();
        if text.is_empty() {
            return Err(CrsError::invalid(text, "empty CRS definition"));
        }

        if text.starts_with('+') {
            return Self::from_proj_string(text);
        }

        if wkt::looks_like_wkt(text) {
            return Self::from_wkt(text);
        }

        let code = parse_code(text)
            .or_else(|| registry::find_by_name(text))
            .ok_or_else(|| CrsError::invalid(text, "not an EPSG code, PROJ string or WKT"))?;
        Self::from_code(code)
    }

    /// Build a definition from an EPSG code.
    pub fn from_code(code: u32) -> Result<Self, CrsError> {
        let entry = registry::lookup(code).ok_or_else(|| {
            CrsError::invalid(&format!("EPSG:{}", code), "unknown EPSG code")
        })?;
        let proj = build_proj(&entry.proj4)?;
        Ok(Self {
            code: Some(entry.code),
            name: entry.name,
            proj4: entry.proj4,
            wkt: Some(entry.wkt),
            proj,
        })
    }

    fn from_proj_string(text: &str) -> Result<Self, CrsError> {
        let proj = build_proj(text)?;
        Ok(Self {
            code: None,
            name: "Custom PROJ definition".to_string(),
            proj4: text.to_string(),
            wkt: None,
            proj,
        })
    }

    /// WKT naming an EPSG system uses the database definition; anything else
    /// is translated parameter by parameter. The original text is kept so
    /// outputs carry the same `.prj` they were given.
    fn from_wkt(text: &str) -> Result<Self, CrsError> {
        let root = wkt::parse(text).map_err(|e| CrsError::invalid(text, e.to_string()))?;

        let identified = wkt::identify(&root).and_then(|code| Self::from_code(code).ok());
        let mut definition = match identified {
            Some(definition) => definition,
            None => {
                let proj4 = wkt::to_proj_string(&root)
                    .map_err(|e| CrsError::invalid(text, e.to_string()))?;
                let proj = build_proj(&proj4)?;
                Self {
                    code: None,
                    name: "Custom WKT definition".to_string(),
                    proj4,
                    wkt: None,
                    proj,
                }
            }
        };
        if let Some(name) = root.name() {
            definition.name = name.to_string();
        }
        definition.wkt = Some(text.to_string());
        Ok(definition)
    }

    /// EPSG code, when the definition maps to one.
    pub fn code(&self) -> Option<u32> {
        self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn proj4(&self) -> &str {
        &self.proj4
    }

    /// WKT suitable for a `.prj` sidecar, if one is known.
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    pub(crate) fn proj(&self) -> &Proj {
        &self.proj
    }

    /// Returns true for longitude/latitude systems.
    pub fn is_geographic(&self) -> bool {
        self.proj.is_latlong()
    }

    /// Returns true if both definitions describe the same coordinate system.
    ///
    /// Definitions with EPSG codes compare by code; otherwise the PROJ
    /// parameters are compared irrespective of order.
    pub fn same_as(&self, other: &CrsDefinition) -> bool {
        match (self.code, other.code) {
            (Some(a), Some(b)) => a == b,
            _ => proj_tokens(&self.proj4) == proj_tokens(&other.proj4),
        }
    }

    /// Short label for logs: `EPSG:n` when known, the name otherwise.
    pub fn label(&self) -> String {
        match self.code {
            Some(code) => format!("EPSG:{}", code),
            None => self.name.clone(),
        }
    }
}

fn build_proj(proj4: &str) -> Result<Proj, CrsError> {
    Proj::from_proj_string(proj4).map_err(|e| CrsError::invalid(proj4, e.to_string()))
}

fn proj_tokens(proj4: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = proj4
        .split_whitespace()
        .filter(|t| *t != "+no_defs" && *t != "+wktext" && !t.starts_with("+type="))
        .collect();
    tokens.sort_unstable();
    tokens
}

/// Extract an EPSG code from the textual forms users and files commonly use.
fn parse_code(text: &str) -> Option<u32> {
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok();
    }

    let lower = text.to_ascii_lowercase();
    if matches!(
        lower.as_str(),
        "wgs84" | "crs84" | "ogc:crs84" | "urn:ogc:def:crs:ogc:1.3:crs84" | "urn:ogc:def:crs:ogc::crs84"
    ) {
        return Some(4326);
    }

    if let Some(rest) = lower.strip_prefix("epsg:") {
        return rest.trim().parse().ok();
    }

    // urn:ogc:def:crs:EPSG:<version>:<code>, version usually empty
    if let Some(rest) = lower.strip_prefix("urn:ogc:def:crs:epsg:") {
        return rest.rsplit(':').next()?.parse().ok();
    }

    // http://www.opengis.net/def/crs/EPSG/0/<code>
    if lower.contains("opengis.net/def/crs/epsg/") {
        return lower.rsplit('/').next()?.parse().ok();
    }

    None
}
