//! Conversion of GeoJSON geometries into [`Geom`], normalizing coordinates on the way.

use geojson::{PolygonType, Position, Value};

use crate::error::GisTypesError;
use crate::geo::CrsNormalizer;
use crate::geometry::{Geom, Ring};

/// Converts a GeoJSON geometry into [`Geom`], normalizing every position with `normalizer`.
///
/// Returns `Ok(None)` for geometry types the renderer does not draw (`MultiPoint`,
/// `GeometryCollection`).
pub fn convert_geometry(
    geometry: &geojson::Geometry,
    normalizer: &CrsNormalizer,
) -> Result<Option<Geom>, GisTypesError> {
    let geom = match &geometry.value {
        Value::Point(position) => Geom::Point(normalizer.normalize_position(position)?),
        Value::LineString(line) => Geom::LineString(convert_line(line, normalizer)?),
        Value::MultiLineString(lines) => Geom::MultiLineString(
            lines
                .iter()
                .map(|line| convert_line(line, normalizer))
                .collect::<Result<_, _>>()?,
        ),
        Value::Polygon(polygon) => Geom::Polygon(convert_polygon(polygon, normalizer)?),
        Value::MultiPolygon(polygons) => Geom::MultiPolygon(
            polygons
                .iter()
                .map(|polygon| convert_polygon(polygon, normalizer))
                .collect::<Result<_, _>>()?,
        ),
        Value::MultiPoint(_) | Value::GeometryCollection(_) => return Ok(None),
    };

    Ok(Some(geom))
}

fn convert_line(line: &[Position], normalizer: &CrsNormalizer) -> Result<Ring, GisTypesError> {
    line.iter()
        .map(|position| normalizer.normalize_position(position))
        .collect()
}

fn convert_polygon(
    polygon: &PolygonType,
    normalizer: &CrsNormalizer,
) -> Result<Vec<Ring>, GisTypesError> {
    if polygon.is_empty() {
        return Err(GisTypesError::MalformedGeometry(
            "polygon without rings".into(),
        ));
    }

    polygon
        .iter()
        .map(|ring| convert_line(ring, normalizer))
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::geo::Crs;
    use crate::point::GeoPoint;

    #[test]
    fn polygon_with_z() {
        let geometry = geojson::Geometry::new(Value::Polygon(vec![vec![
            vec![0.0, 0.0, 12.0],
            vec![1.0, 0.0, 12.0],
            vec![1.0, 1.0, 12.0],
            vec![0.0, 0.0, 12.0],
        ]]));
        let geom = convert_geometry(&geometry, &CrsNormalizer::default())
            .unwrap()
            .unwrap();
        let Geom::Polygon(rings) = geom else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0][2], GeoPoint::new(1.0, 1.0));
    }

    #[test]
    fn axis_order_is_normalized() {
        let geometry = geojson::Geometry::new(Value::LineString(vec![
            vec![-34.6, -58.3],
            vec![-34.7, -58.4],
        ]));
        let geom = convert_geometry(&geometry, &CrsNormalizer::new(Crs::Epsg4326))
            .unwrap()
            .unwrap();
        assert_eq!(
            geom,
            Geom::LineString(vec![GeoPoint::new(-58.3, -34.6), GeoPoint::new(-58.4, -34.7)])
        );
    }

    #[test]
    fn unsupported_and_malformed() {
        let multipoint = geojson::Geometry::new(Value::MultiPoint(vec![vec![0.0, 0.0]]));
        assert!(convert_geometry(&multipoint, &CrsNormalizer::default())
            .unwrap()
            .is_none());

        let short = geojson::Geometry::new(Value::Point(vec![1.0]));
        assert_matches!(
            convert_geometry(&short, &CrsNormalizer::default()),
            Err(GisTypesError::MalformedGeometry(_))
        );

        let empty = geojson::Geometry::new(Value::Polygon(vec![]));
        assert_matches!(
            convert_geometry(&empty, &CrsNormalizer::default()),
            Err(GisTypesError::MalformedGeometry(_))
        );
    }
}
