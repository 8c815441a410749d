//! `layermerge crs`: list or show CRS definitions.

use layermerge::crs::{registry, CrsDefinition, CrsSpec};

use crate::error::CliError;

pub fn run(code: Option<&str>) -> Result<(), CliError> {
    match code {
        None => {
            print!("{}", list());
            Ok(())
        }
        Some(spec) => {
            let definition = CrsDefinition::parse(&CrsSpec::new(spec))?;
            print!("{}", show(&definition));
            Ok(())
        }
    }
}

/// Frequently used systems; any EPSG code is accepted.
fn list() -> String {
    let mut out = String::from("Common CRS definitions:\n");
    for entry in registry::common_codes().into_iter().filter_map(registry::lookup) {
        out.push_str(&format!("  EPSG:{:<6} {}\n", entry.code, entry.name));
    }
    out.push_str("  EPSG:326xx/327xx  WGS 84 / UTM zones (north/south)\n");
    out.push_str("\nAny EPSG code (EPSG:n), PROJ strings (+proj=...) and WKT are accepted.\n");
    out
}

fn show(definition: &CrsDefinition) -> String {
    let mut out = format!("{}\n  Name: {}\n", definition.label(), definition.name());
    out.push_str(&format!(
        "  Type: {}\n",
        if definition.is_geographic() {
            "geographic"
        } else {
            "projected"
        }
    ));
    out.push_str(&format!("  PROJ: {}\n", definition.proj4()));
    if let Some(wkt) = definition.wkt() {
        out.push_str(&format!("  WKT:  {}\n", wkt));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_includes_common_entries() {
        let text = list();
        assert!(text.contains("EPSG:4326"));
        assert!(text.contains("EPSG:3857"));
        assert!(text.contains("EPSG:3035"));
        assert!(!text.contains("EPSG:32633 "));
    }

    #[test]
    fn test_show_utm_zone() {
        let definition = CrsDefinition::parse(&CrsSpec::new("EPSG:32633")).unwrap();
        let text = show(&definition);
        assert!(text.contains("EPSG:32633"));
        assert!(text.contains("projected"));
        assert!(text.contains("+zone=33"));
    }

    #[test]
    fn test_show_code_outside_common_list() {
        let definition = CrsDefinition::parse(&CrsSpec::new("EPSG:28992")).unwrap();
        let text = show(&definition);
        assert!(text.contains("EPSG:28992"));
        assert!(text.contains("+proj=sterea"));
    }

    #[test]
    fn test_unknown_code_errors() {
        assert!(run(Some("EPSG:999999")).is_err());
    }
}
