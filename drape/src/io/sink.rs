use super::crs_member;
use crate::{Destination, DrapeError, OutputSink, Polyline3D};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use log::debug;
use std::{
    fs::OpenOptions,
    io::{BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

/// Writes each polyline as a GeoJSON file under `dir`.
///
/// Existing files are never overwritten.
#[derive(Debug, Clone)]
pub struct GeoJsonSink {
    dir: PathBuf,
}

impl GeoJsonSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File a destination is written to.
    ///
    /// `.geojson` is appended unless the name already ends in
    /// `.geojson` or `.json`, so `trail.v2` becomes `trail.v2.geojson`.
    pub fn path(&self, destination: &Destination) -> PathBuf {
        let path = self.dir.join(&destination.0);
        let has_json_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("geojson") || ext.eq_ignore_ascii_case("json"));
        if has_json_extension {
            path
        } else {
            let mut name = path.into_os_string();
            name.push(".geojson");
            PathBuf::from(name)
        }
    }

    fn write_file(path: &Path, polyline: &Polyline3D) -> Result<(), DrapeError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    DrapeError::AssemblyFailed(format!("{} already exists", path.display()))
                }
                _ => DrapeError::AssemblyFailed(format!("cannot create {}: {e}", path.display())),
            })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &to_feature_collection(polyline))?;
        writer.flush()?;
        Ok(())
    }
}

fn to_feature_collection(polyline: &Polyline3D) -> FeatureCollection {
    let coordinates = polyline
        .vertices
        .iter()
        .map(|v| vec![v.x, v.y, v.z])
        .collect();

    let mut properties = JsonObject::new();
    properties.insert(
        "no_elevation".to_owned(),
        serde_json::Value::from(polyline.no_elevation.clone()),
    );

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("crs".to_owned(), crs_member(&polyline.spatial_reference));

    FeatureCollection {
        bbox: None,
        features: vec![Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(coordinates))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }],
        foreign_members: Some(foreign_members),
    }
}

impl OutputSink for GeoJsonSink {
    fn write(
        &mut self,
        polyline: &Polyline3D,
        destination: &Destination,
    ) -> Result<(), DrapeError> {
        let path = self.path(destination);
        Self::write_file(&path, polyline)?;
        debug!(
            "wrote {}; vertices: {}",
            path.display(),
            polyline.vertices.len()
        );
        Ok(())
    }
}
