//! Minimal WKT reader for `.prj` sidecars.
//!
//! The node tree is parsed, then the coordinate system is either identified
//! by EPSG code (a top-level `AUTHORITY`/`ID` node, or the CRS and datum
//! names) or translated parameter by parameter into a PROJ string with
//! [`to_proj_string`].

use super::registry;

/// A WKT node: `KEYWORD[arg, arg, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WktNode {
    pub keyword: String,
    pub args: Vec<WktValue>,
}

/// A WKT argument.
#[derive(Debug, Clone, PartialEq)]
pub enum WktValue {
    /// Quoted string
    Text(String),
    /// Number or bare identifier (kept verbatim)
    Literal(String),
    /// Nested node
    Node(WktNode),
}

impl WktNode {
    /// First quoted argument, which WKT uses for names.
    pub fn name(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            WktValue::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Direct child nodes.
    pub fn children(&self) -> impl Iterator<Item = &WktNode> {
        self.args.iter().filter_map(|arg| match arg {
            WktValue::Node(n) => Some(n),
            _ => None,
        })
    }

    /// First direct child with one of the given keywords (case-insensitive).
    pub fn child(&self, keywords: &[&str]) -> Option<&WktNode> {
        self.children()
            .find(|n| keywords.iter().any(|k| n.keyword.eq_ignore_ascii_case(k)))
    }

    /// First numeric argument.
    pub fn number(&self) -> Option<f64> {
        self.args.iter().find_map(|arg| match arg {
            WktValue::Literal(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    fn is_geographic(&self) -> bool {
        self.is_one_of(&["GEOGCS", "GEOGCRS", "GEODCRS", "GEOGRAPHICCRS"])
    }

    fn is_projected(&self) -> bool {
        self.is_one_of(&["PROJCS", "PROJCRS", "PROJECTEDCRS"])
    }

    fn is_one_of(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.keyword.eq_ignore_ascii_case(k))
    }

    /// Conversion factor of a `UNIT` child (metres or radians per unit).
    fn unit_factor(&self, keywords: &[&str]) -> Option<f64> {
        self.child(keywords)
            .and_then(WktNode::number)
            .filter(|f| f.is_finite() && *f > 0.0)
    }
}

/// WKT parse failure with the byte offset where it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct WktParseError {
    pub offset: usize,
    pub message: &'static str,
}

impl std::fmt::Display for WktParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for WktParseError {}

/// Returns true if the text looks like WKT (`KEYWORD[` or `KEYWORD(`).
pub fn looks_like_wkt(text: &str) -> bool {
    let text = text.trim_start();
    let keyword_len = text
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    keyword_len > 0 && matches!(text.as_bytes().get(keyword_len), Some(b'[') | Some(b'('))
}

/// Parse WKT text into its root node.
pub fn parse(text: &str) -> Result<WktNode, WktParseError> {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        text,
        pos: 0,
    };
    parser.skip_whitespace();
    let node = parser.node()?;
    parser.skip_whitespace();
    if parser.pos != parser.bytes.len() {
        return Err(parser.error("trailing characters after WKT"));
    }
    Ok(node)
}

/// Identify the EPSG code of a parsed WKT definition, if possible.
pub fn identify(root: &WktNode) -> Option<u32> {
    if let Some(code) = authority_code(root) {
        return Some(code);
    }

    if let Some(code) = root.name().and_then(registry::find_by_name) {
        return Some(code);
    }

    if root.is_geographic() {
        let datum = root.child(&["DATUM", "TRF", "GEODETICDATUM"])?;
        return match registry::normalize_name(datum.name()?).as_str() {
            "wgs1984" | "dwgs1984" | "wgs84" | "worldgeodeticsystem1984" => Some(4326),
            "northamericandatum1983" | "dnorthamerican1983" | "nad83" => Some(4269),
            "europeanterrestrialreferencesystem1989" | "detrs1989" | "etrs89" => Some(4258),
            _ => None,
        };
    }

    None
}

/// A WKT definition that has no PROJ equivalent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WktConversionError(pub String);

impl std::fmt::Display for WktConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot convert WKT to PROJ parameters: {}", self.0)
    }
}

impl std::error::Error for WktConversionError {}

const DEGREE: f64 = std::f64::consts::PI / 180.0;

#[derive(Clone, Copy)]
enum ParameterKind {
    Linear,
    Angular,
    Scale,
}

/// WKT parameter names (normalized) and their PROJ keys.
const PARAMETERS: &[(&str, &[&str], ParameterKind)] = &[
    (
        "x_0",
        &["falseeasting", "eastingatfalseorigin", "eastingatprojectioncentre"],
        ParameterKind::Linear,
    ),
    (
        "y_0",
        &["falsenorthing", "northingatfalseorigin", "northingatprojectioncentre"],
        ParameterKind::Linear,
    ),
    (
        "lon_0",
        &[
            "centralmeridian",
            "longitudeofnaturalorigin",
            "longitudeoffalseorigin",
            "longitudeoforigin",
            "longitudeofcenter",
            "longitudeofcentre",
            "longitudeofprojectioncentre",
            "longitudeofprojectioncenter",
        ],
        ParameterKind::Angular,
    ),
    (
        "lat_0",
        &[
            "latitudeoforigin",
            "latitudeofnaturalorigin",
            "latitudeoffalseorigin",
            "latitudeofcenter",
            "latitudeofcentre",
            "latitudeofprojectioncentre",
            "latitudeofprojectioncenter",
        ],
        ParameterKind::Angular,
    ),
    (
        "lat_1",
        &["standardparallel1", "latitudeof1ststandardparallel"],
        ParameterKind::Angular,
    ),
    (
        "lat_2",
        &["standardparallel2", "latitudeof2ndstandardparallel"],
        ParameterKind::Angular,
    ),
    (
        "lat_ts",
        &["latitudeofstandardparallel", "latitudeoftruescale"],
        ParameterKind::Angular,
    ),
    (
        "k_0",
        &[
            "scalefactor",
            "scalefactoratnaturalorigin",
            "scalefactoroninitialline",
            "scalefactoratcentre",
        ],
        ParameterKind::Scale,
    ),
];

/// Projection method names (normalized), the PROJ projection, and any fixed
/// parameters the method implies.
const METHODS: &[(&[&str], &str, &str)] = &[
    (
        &["transversemercator", "gausskruger", "gaussschreibertransversemercator"],
        "tmerc",
        "",
    ),
    (
        &[
            "lambertconformalconic",
            "lambertconformalconic1sp",
            "lambertconformalconic2sp",
            "lambertconicconformal1sp",
            "lambertconicconformal2sp",
        ],
        "lcc",
        "",
    ),
    (
        &[
            "mercator",
            "mercator1sp",
            "mercator2sp",
            "mercatorvarianta",
            "mercatorvariantb",
        ],
        "merc",
        "",
    ),
    (
        &["albers", "albersconicequalarea", "albersequalarea"],
        "aea",
        "",
    ),
    (&["lambertazimuthalequalarea"], "laea", ""),
    (&["stereographic"], "stere", ""),
    (
        &["obliquestereographic", "doublestereographic"],
        "sterea",
        "",
    ),
    (
        &[
            "polarstereographic",
            "polarstereographicvarianta",
            "polarstereographicvariantb",
        ],
        "stere",
        "",
    ),
    (&["stereographicnorthpole"], "stere", "+lat_0=90"),
    (&["stereographicsouthpole"], "stere", "+lat_0=-90"),
    (
        &["equirectangular", "equidistantcylindrical", "platecarree"],
        "eqc",
        "",
    ),
    (&["mollweide"], "moll", ""),
];

/// Translate a parsed WKT definition into an equivalent PROJ string.
///
/// Geographic systems become `+proj=longlat` with their datum. Projected
/// systems map the projection method and its parameters; false easting and
/// northing are converted to metres and a non-metre linear unit is kept as
/// `+to_meter`, so coordinates stay in the unit the data was written in.
///
/// # Errors
///
/// Returns [`WktConversionError`] for engineering/vertical systems and for
/// projection methods without a PROJ counterpart.
pub fn to_proj_string(root: &WktNode) -> Result<String, WktConversionError> {
    if root.is_geographic() {
        let mut proj = String::from("+proj=longlat");
        push_datum(&mut proj, root);
        return Ok(proj);
    }

    if !root.is_projected() {
        return Err(WktConversionError(format!(
            "{} is not a geographic or projected system",
            root.keyword
        )));
    }

    let base = root
        .child(&["GEOGCS", "BASEGEOGCRS", "BASEGEODCRS", "GEOGCRS", "GEODCRS"])
        .ok_or_else(|| WktConversionError("projected system without a base CRS".to_string()))?;
    let angular = base.unit_factor(&["UNIT", "ANGLEUNIT"]).unwrap_or(DEGREE);
    let linear = root
        .unit_factor(&["UNIT", "LENGTHUNIT"])
        .or_else(|| {
            root.child(&["AXIS"])
                .and_then(|axis| axis.unit_factor(&["LENGTHUNIT", "UNIT"]))
        })
        .unwrap_or(1.0);

    let conversion = root.child(&["CONVERSION"]);
    let method_name = conversion
        .and_then(|c| c.child(&["METHOD", "PROJECTION"]))
        .or_else(|| root.child(&["PROJECTION"]))
        .and_then(WktNode::name)
        .ok_or_else(|| WktConversionError("projection method missing".to_string()))?;
    let method = registry::normalize_name(method_name);
    let (_, projection, fixed) = METHODS
        .iter()
        .find(|(names, ..)| names.contains(&method.as_str()))
        .ok_or_else(|| WktConversionError(format!("unsupported projection '{}'", method_name)))?;

    let mut values: Vec<(&str, f64)> = Vec::new();
    let parameters = conversion
        .unwrap_or(root)
        .children()
        .filter(|n| n.keyword.eq_ignore_ascii_case("PARAMETER"));
    for parameter in parameters {
        let (Some(name), Some(value)) = (parameter.name(), parameter.number()) else {
            continue;
        };
        let normalized = registry::normalize_name(name);
        let Some((key, _, kind)) = PARAMETERS
            .iter()
            .find(|(_, names, _)| names.contains(&normalized.as_str()))
        else {
            continue;
        };
        let value = match kind {
            ParameterKind::Linear => {
                value * parameter.unit_factor(&["LENGTHUNIT", "UNIT"]).unwrap_or(linear)
            }
            ParameterKind::Angular => {
                value * parameter.unit_factor(&["ANGLEUNIT", "UNIT"]).unwrap_or(angular) / DEGREE
            }
            ParameterKind::Scale => value,
        };
        values.push((*key, value));
    }
    adjust_for_projection(projection, fixed, &mut values);

    let mut proj = format!("+proj={}", projection);
    if !fixed.is_empty() {
        proj.push(' ');
        proj.push_str(fixed);
    }
    for (key, value) in &values {
        proj.push_str(&format!(" +{}={}", key, value));
    }
    push_datum(&mut proj, base);
    if (linear - 1.0).abs() > 1e-12 {
        proj.push_str(&format!(" +to_meter={}", linear));
    } else {
        proj.push_str(" +units=m");
    }
    Ok(proj)
}

fn value_of(values: &[(&str, f64)], key: &str) -> Option<f64> {
    values.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Fill in what PROJ expects but the WKT method leaves implicit.
fn adjust_for_projection(projection: &str, fixed: &str, values: &mut Vec<(&str, f64)>) {
    match projection {
        // 1SP variants only name the latitude of origin
        "lcc" => {
            if value_of(values, "lat_1").is_none() {
                if let Some(lat_0) = value_of(values, "lat_0") {
                    values.push(("lat_1", lat_0));
                }
            }
        }
        // ESRI writes the latitude of true scale as Standard_Parallel_1
        "merc" | "stere" => {
            if value_of(values, "lat_ts").is_none() {
                if let Some(index) = values.iter().position(|(k, _)| *k == "lat_1") {
                    values[index].0 = "lat_ts";
                }
            }
            if projection == "stere" && fixed.is_empty() && value_of(values, "lat_0").is_none() {
                if let Some(lat_ts) = value_of(values, "lat_ts") {
                    values.push(("lat_0", 90f64.copysign(lat_ts)));
                }
            }
        }
        _ => {}
    }
}

/// Append the datum of a geographic node: a named PROJ datum when the WKT
/// names one PROJ knows, the ellipsoid and `TOWGS84` shift otherwise.
fn push_datum(proj: &mut String, geographic: &WktNode) {
    let datum = geographic.child(&["DATUM", "TRF", "GEODETICDATUM"]);

    let named = datum
        .and_then(WktNode::name)
        .map(registry::normalize_name)
        .and_then(|name| match name.as_str() {
            "wgs1984" | "dwgs1984" | "wgs84" | "worldgeodeticsystem1984" => Some("WGS84"),
            "northamericandatum1983" | "dnorthamerican1983" | "nad83" => Some("NAD83"),
            _ => None,
        });

    match named {
        Some(name) => proj.push_str(&format!(" +datum={}", name)),
        None => {
            let ellipsoid = datum.and_then(|d| d.child(&["SPHEROID", "ELLIPSOID"]));
            let numbers: Vec<f64> = ellipsoid
                .map(|e| {
                    e.args
                        .iter()
                        .filter_map(|arg| match arg {
                            WktValue::Literal(s) => s.trim().parse().ok(),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();
            match numbers.as_slice() {
                [a, rf, ..] if *rf > 0.0 => proj.push_str(&format!(" +a={} +rf={}", a, rf)),
                [a, ..] => proj.push_str(&format!(" +a={} +b={}", a, a)),
                [] => proj.push_str(" +ellps=WGS84"),
            }
            let shift = datum.and_then(|d| d.child(&["TOWGS84"])).map(|t| {
                t.args
                    .iter()
                    .filter_map(|arg| match arg {
                        WktValue::Literal(s) => Some(s.trim()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join(",")
            });
            if let Some(shift) = shift.filter(|s| !s.is_empty()) {
                proj.push_str(&format!(" +towgs84={}", shift));
            }
        }
    }

    let meridian = geographic.child(&["PRIMEM", "PRIMEMERIDIAN"]).and_then(|pm| {
        let factor = pm
            .unit_factor(&["ANGLEUNIT", "UNIT"])
            .or_else(|| geographic.unit_factor(&["UNIT", "ANGLEUNIT"]))
            .unwrap_or(DEGREE);
        pm.number().map(|value| value * factor / DEGREE)
    });
    if let Some(meridian) = meridian.filter(|m| m.abs() > 1e-12) {
        proj.push_str(&format!(" +pm={}", meridian));
    }
}

fn authority_code(node: &WktNode) -> Option<u32> {
    let authority = node.child(&["AUTHORITY", "ID"])?;
    let mut args = authority.args.iter();
    let name = match args.next()? {
        WktValue::Text(s) | WktValue::Literal(s) => s,
        WktValue::Node(_) => return None,
    };
    if !name.eq_ignore_ascii_case("EPSG") {
        return None;
    }
    match args.next()? {
        WktValue::Text(s) | WktValue::Literal(s) => s.trim().parse().ok(),
        WktValue::Node(_) => None,
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &'static str) -> WktParseError {
        WktParseError {
            offset: self.pos,
            message,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn node(&mut self) -> Result<WktNode, WktParseError> {
        let keyword = self.word();
        if keyword.is_empty() {
            return Err(self.error("expected keyword"));
        }
        self.skip_whitespace();
        let close = match self.peek() {
            Some(b'[') => b']',
            Some(b'(') => b')',
            _ => return Err(self.error("expected '[' or '('")),
        };
        self.pos += 1;

        let mut args = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b) if b == close && args.is_empty() => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error("unterminated node")),
                _ => {}
            }

            args.push(self.value()?);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == close => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expected ',' or closing bracket")),
            }
        }

        Ok(WktNode { keyword, args })
    }

    fn value(&mut self) -> Result<WktValue, WktParseError> {
        match self.peek() {
            Some(b'"') => self.quoted().map(WktValue::Text),
            Some(b) if b.is_ascii_alphabetic() => {
                let start = self.pos;
                let word = self.word();
                self.skip_whitespace();
                if matches!(self.peek(), Some(b'[') | Some(b'(')) {
                    self.pos = start;
                    self.node().map(WktValue::Node)
                } else {
                    Ok(WktValue::Literal(word))
                }
            }
            Some(_) => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
                {
                    self.pos += 1;
                }
                if start == self.pos {
                    return Err(self.error("unexpected character"));
                }
                Ok(WktValue::Literal(self.text[start..self.pos].to_string()))
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        self.text[start..self.pos].to_string()
    }

    /// Quoted string; `""` inside is an escaped quote.
    fn quoted(&mut self) -> Result<String, WktParseError> {
        self.pos += 1;
        let mut out = String::new();
        let mut start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => {
                    out.push_str(&self.text[start..self.pos]);
                    self.pos += 1;
                    if self.peek() == Some(b'"') {
                        out.push('"');
                        self.pos += 1;
                        start = self.pos;
                    } else {
                        return Ok(out);
                    }
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error("unterminated string")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESRI_WGS84: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

    const ESRI_UTM: &str = r#"PROJCS["WGS_1984_UTM_Zone_33N",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",15.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;

    const WKT2_MERCATOR: &str = r#"PROJCRS["WGS 84 / Pseudo-Mercator",
        BASEGEOGCRS["WGS 84", DATUM["World Geodetic System 1984",
            ELLIPSOID["WGS 84",6378137,298.257223563]]],
        CONVERSION["Popular Visualisation Pseudo-Mercator",
            METHOD["Popular Visualisation Pseudo Mercator"]],
        CS[Cartesian,2],
        ID["EPSG",3857]]"#;

    #[test]
    fn test_parse_tree() {
        let root = parse(ESRI_WGS84).unwrap();
        assert_eq!(root.keyword, "GEOGCS");
        assert_eq!(root.name(), Some("GCS_WGS_1984"));
        let datum = root.child(&["DATUM"]).unwrap();
        assert_eq!(datum.name(), Some("D_WGS_1984"));
    }

    #[test]
    fn test_parse_escaped_quote() {
        let root = parse(r#"LOCAL_CS["a ""quoted"" name"]"#).unwrap();
        assert_eq!(root.name(), Some("a \"quoted\" name"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("GEOGCS[\"x\"").is_err());
        assert!(parse("GEOGCS").is_err());
        assert!(parse("GEOGCS[\"x\"] extra").is_err());
    }

    #[test]
    fn test_identify_esri_names() {
        assert_eq!(identify(&parse(ESRI_WGS84).unwrap()), Some(4326));
        assert_eq!(identify(&parse(ESRI_UTM).unwrap()), Some(32633));
    }

    #[test]
    fn test_identify_wkt2_id() {
        assert_eq!(identify(&parse(WKT2_MERCATOR).unwrap()), Some(3857));
    }

    #[test]
    fn test_identify_registry_wkt() {
        for code in [4326, 3857, 2154, 27700, 32633, 25832, 3035] {
            let wkt = registry::lookup(code).unwrap().wkt;
            assert_eq!(identify(&parse(&wkt).unwrap()), Some(code));
        }
    }

    #[test]
    fn test_identify_by_datum() {
        let wkt = r#"GEOGCS["My Lat Lon",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]]"#;
        assert_eq!(identify(&parse(wkt).unwrap()), Some(4326));
    }

    #[test]
    fn test_identify_unknown() {
        let wkt = r#"LOCAL_CS["Site grid",LOCAL_DATUM["Site",0],UNIT["Meter",1]]"#;
        assert_eq!(identify(&parse(wkt).unwrap()), None);
    }

    const ESRI_LONG_ISLAND_FEET: &str = r#"PROJCS["NAD_1983_StatePlane_New_York_Long_Island_FIPS_3104_Feet",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Lambert_Conformal_Conic"],PARAMETER["False_Easting",984250.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",-74.0],PARAMETER["Standard_Parallel_1",40.66666666666666],PARAMETER["Standard_Parallel_2",41.03333333333333],PARAMETER["Latitude_Of_Origin",40.16666666666666],UNIT["Foot_US",0.3048006096012192]]"#;

    fn proj_value(proj: &str, key: &str) -> f64 {
        let prefix = format!("+{}=", key);
        proj.split_whitespace()
            .find_map(|token| token.strip_prefix(prefix.as_str()))
            .unwrap_or_else(|| panic!("{} missing from {}", key, proj))
            .parse()
            .unwrap()
    }

    #[test]
    fn test_to_proj_string_geographic() {
        let proj = to_proj_string(&parse(ESRI_WGS84).unwrap()).unwrap();
        assert_eq!(proj, "+proj=longlat +datum=WGS84");
    }

    #[test]
    fn test_to_proj_string_state_plane_feet() {
        let proj = to_proj_string(&parse(ESRI_LONG_ISLAND_FEET).unwrap()).unwrap();
        assert!(proj.starts_with("+proj=lcc "), "{}", proj);
        assert!(proj.contains("+datum=NAD83"), "{}", proj);
        assert!((proj_value(&proj, "x_0") - 300_000.0).abs() < 1e-6);
        assert!((proj_value(&proj, "lon_0") + 74.0).abs() < 1e-12);
        assert!((proj_value(&proj, "lat_1") - 40.666_666_666_666_66).abs() < 1e-9);
        assert!((proj_value(&proj, "to_meter") - 0.304_800_609_601_219_2).abs() < 1e-15);
    }

    #[test]
    fn test_to_proj_string_custom_ellipsoid_and_shift() {
        let wkt = r#"PROJCS["Local TM",GEOGCS["Local",DATUM["Local_Datum",SPHEROID["Bessel 1841",6377397.155,299.1528128],TOWGS84[598.1,73.7,418.2,0.202,0.045,-2.455,6.7]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",9],PARAMETER["scale_factor",1],PARAMETER["false_easting",3500000],PARAMETER["false_northing",0],UNIT["metre",1]]"#;
        let proj = to_proj_string(&parse(wkt).unwrap()).unwrap();
        assert!(proj.starts_with("+proj=tmerc "));
        assert!(proj.contains("+a=6377397.155 +rf=299.1528128"));
        assert!(proj.contains("+towgs84=598.1,73.7,418.2,0.202,0.045,-2.455,6.7"));
        assert!(proj.ends_with("+units=m"));
        assert_eq!(proj_value(&proj, "x_0"), 3_500_000.0);
    }

    #[test]
    fn test_to_proj_string_lcc_1sp_repeats_origin() {
        let wkt = r#"PROJCS["x",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]],PROJECTION["Lambert_Conformal_Conic_1SP"],PARAMETER["latitude_of_origin",45],PARAMETER["central_meridian",10],PARAMETER["scale_factor",1],UNIT["metre",1]]"#;
        let proj = to_proj_string(&parse(wkt).unwrap()).unwrap();
        assert_eq!(proj_value(&proj, "lat_1"), 45.0);
    }

    #[test]
    fn test_to_proj_string_rejects_unsupported() {
        let local = r#"LOCAL_CS["Site grid",LOCAL_DATUM["Site",0],UNIT["Meter",1]]"#;
        assert!(to_proj_string(&parse(local).unwrap()).is_err());

        let hotine = r#"PROJCS["x",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]],PROJECTION["Hotine_Oblique_Mercator"],UNIT["metre",1]]"#;
        let err = to_proj_string(&parse(hotine).unwrap()).unwrap_err();
        assert!(err.to_string().contains("Hotine_Oblique_Mercator"));
    }

    #[test]
    fn test_looks_like_wkt() {
        assert!(looks_like_wkt("  GEOGCS[\"x\"]"));
        assert!(looks_like_wkt("PROJCRS(\"x\")"));
        assert!(!looks_like_wkt("EPSG:4326"));
        assert!(!looks_like_wkt("+proj=longlat"));
    }
}
