use crate::core::MapRenderer;
use crate::domain::model::{BoundarySet, CountyBoundary, LocatedBranch};
use crate::utils::error::{MapError, Result};
use askama::Template;
use serde_json::{json, Value};

pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

#[derive(Debug, Clone)]
pub struct MapSettings {
    pub title: String,
    pub zoom_start: u8,
    pub tile_url: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            title: "Fortiline Waterworks - Florida".to_string(),
            zoom_start: 7,
            tile_url: DEFAULT_TILE_URL.to_string(),
        }
    }
}

/// Renders a self-contained Leaflet page: county overlay, one marker per branch,
/// a layer toggle and a fixed banner.
#[derive(Debug, Clone, Default)]
pub struct LeafletRenderer {
    settings: MapSettings,
}

#[derive(Template)]
#[template(path = "map.html")]
struct MapTemplate<'a> {
    title: &'a str,
    generated_at: String,
    center_lat: f64,
    center_lon: f64,
    zoom_start: u8,
    tile_url_json: String,
    attribution_json: String,
    counties_json: String,
    markers: &'a [LocatedBranch],
}

impl LeafletRenderer {
    pub fn new(settings: MapSettings) -> Self {
        Self { settings }
    }

    fn center(boundaries: &BoundarySet, branches: &[LocatedBranch]) -> Result<(f64, f64)> {
        if let Some(bounds) = boundaries.bounds() {
            return Ok(bounds.center());
        }
        if branches.is_empty() {
            return Err(MapError::RenderError {
                message: "nothing to center the map on".to_string(),
            });
        }

        // 沒有邊界時退而使用分店座標的平均值
        let n = branches.len() as f64;
        let lat = branches.iter().map(LocatedBranch::latitude).sum::<f64>() / n;
        let lon = branches.iter().map(LocatedBranch::longitude).sum::<f64>() / n;
        Ok((lat, lon))
    }
}

impl MapRenderer for LeafletRenderer {
    fn render(&self, boundaries: &BoundarySet, branches: &[LocatedBranch]) -> Result<String> {
        let (center_lat, center_lon) = Self::center(boundaries, branches)?;

        let template = MapTemplate {
            title: &self.settings.title,
            generated_at: chrono::Utc::now().to_rfc3339(),
            center_lat,
            center_lon,
            zoom_start: self.settings.zoom_start,
            tile_url_json: script_json(&json!(self.settings.tile_url))?,
            attribution_json: script_json(&json!(OSM_ATTRIBUTION))?,
            counties_json: script_json(&feature_collection(boundaries))?,
            markers: branches,
        };

        Ok(template.render()?)
    }
}

/// GeoJSON FeatureCollection with one feature per county.
pub fn feature_collection(boundaries: &BoundarySet) -> Value {
    let features: Vec<Value> = boundaries.counties.iter().map(county_feature).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn county_feature(county: &CountyBoundary) -> Value {
    let geometry = match county.polygons.as_slice() {
        [single] => json!({ "type": "Polygon", "coordinates": single }),
        many => json!({ "type": "MultiPolygon", "coordinates": many }),
    };

    json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "NAME": county.name,
            "NAMELSAD": county.name_lsad,
            "GEOID": county.geoid,
        },
    })
}

/// JSON safe to inline in a `<script>` block.
fn script_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Branch, Coordinates};

    fn county(name: &str, lon: f64, lat: f64) -> CountyBoundary {
        CountyBoundary {
            name: name.to_string(),
            name_lsad: Some(format!("{} County", name)),
            geoid: "12001".to_string(),
            polygons: vec![vec![vec![
                [lon, lat],
                [lon, lat + 0.5],
                [lon + 0.5, lat + 0.5],
                [lon + 0.5, lat],
                [lon, lat],
            ]]],
        }
    }

    fn branch(name: &str, address: &str, lat: f64, lon: f64) -> LocatedBranch {
        Branch::new(name, address).locate(Coordinates::new(lat, lon).unwrap())
    }

    #[test]
    fn test_render_has_one_feature_per_county_and_one_marker_per_branch() {
        let boundaries = BoundarySet::new(vec![
            county("Alachua", -82.6, 29.4),
            county("Baker", -82.4, 30.1),
            county("Bay", -85.9, 30.0),
        ]);
        let branches = vec![
            branch("Miami", "14202 SW 142nd Ave, Miami, FL 33186", 25.65, -80.43),
            branch("Tampa", "1031 S 86th Street, Tampa, FL 33619", 27.94, -82.36),
        ];

        let html = LeafletRenderer::default().render(&boundaries, &branches).unwrap();

        assert_eq!(html.matches("\"type\":\"Feature\"").count(), 3);
        assert_eq!(html.matches("L.marker(").count(), 2);
        assert_eq!(html.matches("id=\"branch-popup-").count(), 2);
        assert!(html.contains("Fortiline Waterworks - Florida"));
        assert!(html.contains("L.control.layers("));
        assert!(html.contains("dashArray: \"5, 5\""));
        assert!(html.contains("[25.65, -80.43]"));
    }

    #[test]
    fn test_multi_part_county_becomes_multipolygon() {
        let mut keys = county("Monroe", -81.8, 24.5);
        keys.polygons.push(county("Monroe", -80.9, 25.1).polygons.remove(0));

        let collection = feature_collection(&BoundarySet::new(vec![keys]));

        assert_eq!(collection["features"][0]["geometry"]["type"], "MultiPolygon");
        assert_eq!(collection["features"][0]["properties"]["NAME"], "Monroe");
        assert_eq!(
            collection["features"][0]["geometry"]["coordinates"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_branch_text_is_html_escaped() {
        let boundaries = BoundarySet::new(vec![county("Duval", -82.0, 30.1)]);
        let branches = vec![branch("A&B <Yard>", "1 Main St", 30.3, -81.6)];

        let html = LeafletRenderer::default().render(&boundaries, &branches).unwrap();

        assert!(html.contains("A&amp;B &lt;Yard&gt;"));
        assert!(!html.contains("<Yard>"));
    }

    #[test]
    fn test_script_json_cannot_close_script_tag() {
        let escaped = script_json(&json!({ "NAME": "</script><script>alert(1)" })).unwrap();
        assert!(!escaped.contains("</script>"));
    }

    #[test]
    fn test_center_falls_back_to_branches() {
        let branches = vec![
            branch("Miami", "a", 25.0, -80.0),
            branch("Tampa", "b", 28.0, -82.0),
        ];
        let center = LeafletRenderer::center(&BoundarySet::new(vec![]), &branches).unwrap();
        assert_eq!(center, (26.5, -81.0));

        assert!(LeafletRenderer::center(&BoundarySet::new(vec![]), &[]).is_err());
    }
}
