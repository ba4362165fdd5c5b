//! GeoJSON implementations of the line source and output sink.

mod lines;
mod sink;

pub use self::{lines::GeoJsonLines, sink::GeoJsonSink};

use crate::SpatialReference;
use geojson::JsonObject;
use serde_json::{json, Value};

/// Reads a named CRS member (`{"type": "name", "properties": {"name": ..}}`).
fn read_crs(members: Option<&JsonObject>) -> Option<SpatialReference> {
    let name = members?.get("crs")?.get("properties")?.get("name")?.as_str()?;
    Some(SpatialReference(name.to_owned()))
}

fn crs_member(spatial_reference: &SpatialReference) -> Value {
    json!({
        "type": "name",
        "properties": { "name": spatial_reference.0 },
    })
}
