use super::read_crs;
use crate::{DrapeError, LineDescription, LineSource, SpatialReference};
use geo::geometry::{Coord, LineString};
use geojson::{GeoJson, Geometry, PointType, Value};
use log::debug;
use std::{fs, path::Path};

/// Line collection read from a GeoJSON document.
///
/// Each feature (or the bare geometry) is one record. A `crs` member
/// on the document sets the reference system, which otherwise
/// defaults to WGS 84.
#[derive(Debug, Clone)]
pub struct GeoJsonLines {
    base_name: String,
    records: Vec<Option<Geometry>>,
    spatial_reference: SpatialReference,
}

impl GeoJsonLines {
    /// Reads `path`; the collection is named after the file stem.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DrapeError> {
        let path = path.as_ref();
        let base_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "line".to_owned());
        let lines = Self::parse(&base_name, &fs::read_to_string(path)?)?;
        debug!("read {}; records: {}", path.display(), lines.records.len());
        Ok(lines)
    }

    /// Parses GeoJSON text.
    pub fn parse(base_name: &str, text: &str) -> Result<Self, DrapeError> {
        Ok(Self::new(base_name.to_owned(), text.parse()?))
    }

    pub fn new(base_name: String, geojson: GeoJson) -> Self {
        let (records, spatial_reference) = match geojson {
            GeoJson::FeatureCollection(fc) => (
                fc.features.into_iter().map(|f| f.geometry).collect(),
                read_crs(fc.foreign_members.as_ref()),
            ),
            GeoJson::Feature(f) => (vec![f.geometry], read_crs(f.foreign_members.as_ref())),
            GeoJson::Geometry(g) => {
                let crs = read_crs(g.foreign_members.as_ref());
                (vec![Some(g)], crs)
            }
        };
        Self {
            base_name,
            records,
            spatial_reference: spatial_reference.unwrap_or_else(SpatialReference::wgs84),
        }
    }

    fn single_part(&self) -> Result<&[PointType], DrapeError> {
        let geometry = match self.records.as_slice() {
            [Some(geometry)] => geometry,
            [None] => {
                return Err(DrapeError::UnsupportedGeometry(
                    "feature has no geometry".to_owned(),
                ))
            }
            records => return Err(DrapeError::InvalidInputCount(records.len())),
        };
        match &geometry.value {
            Value::LineString(coords) => Ok(coords),
            Value::MultiLineString(parts) if parts.len() == 1 => Ok(&parts[0]),
            Value::MultiLineString(parts) => Err(DrapeError::UnsupportedGeometry(format!(
                "multi-part line with {} parts",
                parts.len()
            ))),
            other => Err(DrapeError::UnsupportedGeometry(type_name(other).to_owned())),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Every position in `geometry`, recursing into collections.
fn positions(geometry: &Geometry) -> Box<dyn Iterator<Item = &PointType> + '_> {
    match &geometry.value {
        Value::Point(p) => Box::new(std::iter::once(p)),
        Value::MultiPoint(ps) | Value::LineString(ps) => Box::new(ps.iter()),
        Value::MultiLineString(parts) | Value::Polygon(parts) => Box::new(parts.iter().flatten()),
        Value::MultiPolygon(polygons) => Box::new(polygons.iter().flatten().flatten()),
        Value::GeometryCollection(geometries) => Box::new(geometries.iter().flat_map(positions)),
    }
}

impl LineSource for GeoJsonLines {
    fn count(&self) -> Result<usize, DrapeError> {
        Ok(self.records.len())
    }

    fn describe(&self) -> Result<LineDescription, DrapeError> {
        let has_z = self
            .records
            .iter()
            .flatten()
            .flat_map(positions)
            .any(|position| position.len() >= 3);
        Ok(LineDescription {
            has_z,
            base_name: self.base_name.clone(),
            spatial_reference: self.spatial_reference.clone(),
        })
    }

    fn vertices(&self) -> Result<LineString<f64>, DrapeError> {
        self.single_part()?
            .iter()
            .map(|position| match position.as_slice() {
                [x, y, ..] => Ok(Coord { x: *x, y: *y }),
                _ => Err(DrapeError::UnsupportedGeometry(format!(
                    "position {position:?} has fewer than 2 ordinates"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(LineString::new)
    }
}

#[cfg(test)]
mod tests {
    use super::GeoJsonLines;
    use crate::{DrapeError, LineSource, SpatialReference};
    use geo::line_string;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TRAIL: &str = r#"{
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "EPSG:32633" } },
        "features": [{
            "type": "Feature",
            "properties": { "name": "ridge" },
            "geometry": {
                "type": "LineString",
                "coordinates": [[0.0, 0.0], [100.0, 0.0], [100.0, 50.0]]
            }
        }]
    }"#;

    #[test]
    fn test_feature_collection() {
        let lines = GeoJsonLines::parse("trail", TRAIL).unwrap();
        assert_eq!(lines.count().unwrap(), 1);
        let description = lines.describe().unwrap();
        assert!(!description.has_z);
        assert_eq!(description.base_name, "trail");
        assert_eq!(
            description.spatial_reference,
            SpatialReference("EPSG:32633".to_owned())
        );
        assert_eq!(
            lines.vertices().unwrap(),
            line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 100.0, y: 50.0)]
        );
    }

    #[test]
    fn test_bare_geometry_defaults_to_wgs84() {
        let lines = GeoJsonLines::parse(
            "g",
            r#"{"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}"#,
        )
        .unwrap();
        assert_eq!(lines.count().unwrap(), 1);
        assert_eq!(
            lines.describe().unwrap().spatial_reference,
            SpatialReference::wgs84()
        );
    }

    #[test]
    fn test_z_is_detected() {
        let lines = GeoJsonLines::parse(
            "z",
            r#"{"type": "Feature", "properties": null, "geometry":
                {"type": "LineString", "coordinates": [[1.0, 2.0, 3.0], [3.0, 4.0, 5.0]]}}"#,
        )
        .unwrap();
        assert!(lines.describe().unwrap().has_z);
    }

    #[test]
    fn test_record_count() {
        let empty = GeoJsonLines::parse("e", r#"{"type": "FeatureCollection", "features": []}"#)
            .unwrap();
        assert_eq!(empty.count().unwrap(), 0);

        let two = GeoJsonLines::parse(
            "two",
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": null, "geometry": null},
                {"type": "Feature", "properties": null, "geometry": null}
            ]}"#,
        )
        .unwrap();
        assert_eq!(two.count().unwrap(), 2);
    }

    #[test]
    fn test_unsupported_geometry() {
        let cases = [
            r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#,
            r#"{"type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3]]]}"#,
            r#"{"type": "Feature", "properties": null, "geometry": null}"#,
        ];
        for case in cases {
            let lines = GeoJsonLines::parse("bad", case).unwrap();
            assert!(
                matches!(lines.vertices(), Err(DrapeError::UnsupportedGeometry(_))),
                "{case}"
            );
        }
    }

    #[test]
    fn test_single_part_multi_line() {
        let lines = GeoJsonLines::parse(
            "m",
            r#"{"type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]]]}"#,
        )
        .unwrap();
        assert_eq!(
            lines.vertices().unwrap(),
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]
        );
    }

    #[test]
    fn test_from_path_uses_file_stem() {
        let mut file = tempfile::Builder::new()
            .prefix("ridge_trail")
            .suffix(".geojson")
            .tempfile()
            .unwrap();
        file.write_all(TRAIL.as_bytes()).unwrap();
        let lines = GeoJsonLines::from_path(file.path()).unwrap();
        assert!(lines
            .describe()
            .unwrap()
            .base_name
            .starts_with("ridge_trail"));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(
            GeoJsonLines::from_path(file.path()),
            Err(DrapeError::GeoJson(_))
        ));
    }
}
