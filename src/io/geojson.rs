use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};

use crate::district::District;
use crate::types::{BlockId, CensusBlock};

/// Read census blocks from a GeoJSON FeatureCollection.
///
/// Each feature needs `county`, `tract` and `block` properties (strings or
/// numbers) and a `population` (or census `P0010001`) count, with a Polygon or
/// MultiPolygon geometry.
pub fn read_blocks_geojson(bytes: &[u8]) -> Result<Vec<CensusBlock>> {
    let value: Value = serde_json::from_slice(bytes).context("[io::geojson] Failed to parse GeoJSON bytes")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] Expected a FeatureCollection with a features array"))?;

    features.iter().enumerate()
        .map(|(i, feature)| read_block(feature).with_context(|| format!("[io::geojson] Invalid feature #{i}")))
        .collect()
}

fn read_block(feature: &Value) -> Result<CensusBlock> {
    let properties = feature["properties"].as_object()
        .ok_or_else(|| anyhow!("missing properties"))?;

    let id = BlockId::new(
        code(properties, "county")?,
        code(properties, "tract")?,
        code(properties, "block")?,
    );
    let population = ["population", "P0010001"].iter()
        .find_map(|key| properties.get(*key))
        .ok_or_else(|| anyhow!("missing population"))
        .and_then(count)?;
    let geometry = parse_geometry(&feature["geometry"])?;

    Ok(CensusBlock::new(id, population, geometry))
}

/// A FIPS code property; numeric values are rendered without a fraction.
fn code(properties: &Map<String, Value>, key: &str) -> Result<String> {
    match properties.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => bail!("missing {key} code"),
    }
}

fn count(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| anyhow!("population must be a non-negative integer")),
        Value::String(s) => s.trim().parse().with_context(|| format!("invalid population '{s}'")),
        _ => bail!("population must be a number"),
    }
}

fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("geometry has no coordinates"))?;

    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon::new(vec![parse_polygon(coords)?])),
        Some("MultiPolygon") => Ok(MultiPolygon::new(coords.iter()
            .map(|polygon| polygon.as_array()
                .ok_or_else(|| anyhow!("invalid MultiPolygon member"))
                .and_then(|rings| parse_polygon(rings)))
            .collect::<Result<_>>()?)),
        other => bail!("unsupported geometry type {other:?}"),
    }
}

/// Parse `[exterior, hole, hole, ...]`.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| ring.as_array()
        .ok_or_else(|| anyhow!("invalid ring"))
        .and_then(|ring| parse_ring(ring)));

    let exterior = rings.next().ok_or_else(|| anyhow!("polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse `[[x, y], ...]`, closing the ring if needed.
fn parse_ring(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| {
            let x = pair[0].as_f64().ok_or_else(|| anyhow!("coordinate x must be a number"))?;
            let y = pair[1].as_f64().ok_or_else(|| anyhow!("coordinate y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }
    Ok(LineString(points))
}

fn multipolygon_coords(shape: &MultiPolygon<f64>) -> Value {
    let polygons = shape.0.iter()
        .map(|polygon| std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|ring| ring.coords().map(|c| json!([c.x, c.y])).collect::<Vec<_>>())
            .collect::<Vec<_>>())
        .collect::<Vec<_>>();
    json!(polygons)
}

/// Write one feature per district, numbered from 1 in output order.
pub fn write_districts_geojson(districts: &[District]) -> Result<Vec<u8>> {
    let features = districts.iter().enumerate()
        .map(|(i, district)| json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": multipolygon_coords(district.geometry()),
            },
            "properties": {
                "district": i + 1,
                "population": district.population(),
                "groups": district.groups().len(),
            },
        }))
        .collect::<Vec<_>>();

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    serde_json::to_vec(&collection).context("[io::geojson] Failed to serialize GeoJSON to bytes")
}
