//! Geometry types supported by the renderer.

use std::fmt::{Display, Formatter};

use crate::point::GeoPoint;

/// Sequence of points forming a line or a polygon ring.
pub type Ring = Vec<GeoPoint>;

/// Geometry of a feature, in `[lon, lat]` degrees.
#[derive(Debug, Clone, PartialEq)]
pub enum Geom {
    /// Single point.
    Point(GeoPoint),
    /// Open line.
    LineString(Ring),
    /// Set of independent lines.
    MultiLineString(Vec<Ring>),
    /// Polygon as a list of rings, the first one being the exterior.
    Polygon(Vec<Ring>),
    /// Set of polygons.
    MultiPolygon(Vec<Vec<Ring>>),
}

/// Discriminant of [`Geom`], used where only the type of geometry matters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// Point.
    Point,
    /// Line string.
    LineString,
    /// Multi line string.
    MultiLineString,
    /// Polygon.
    Polygon,
    /// Multi polygon.
    MultiPolygon,
}

impl GeometryType {
    /// Line string or multi line string.
    pub fn is_linear(&self) -> bool {
        matches!(self, Self::LineString | Self::MultiLineString)
    }

    /// Polygon or multi polygon.
    pub fn is_areal(&self) -> bool {
        matches!(self, Self::Polygon | Self::MultiPolygon)
    }
}

impl Display for GeometryType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::MultiLineString => "MultiLineString",
            Self::Polygon => "Polygon",
            Self::MultiPolygon => "MultiPolygon",
        };
        f.write_str(name)
    }
}

impl Geom {
    /// Type of the geometry.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geom::Point(_) => GeometryType::Point,
            Geom::LineString(_) => GeometryType::LineString,
            Geom::MultiLineString(_) => GeometryType::MultiLineString,
            Geom::Polygon(_) => GeometryType::Polygon,
            Geom::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// Iterates over every coordinate of the geometry, in storage order.
    pub fn iter_points(&self) -> Box<dyn Iterator<Item = &GeoPoint> + '_> {
        match self {
            Geom::Point(p) => Box::new(std::iter::once(p)),
            Geom::LineString(line) => Box::new(line.iter()),
            Geom::MultiLineString(lines) => Box::new(lines.iter().flatten()),
            Geom::Polygon(rings) => Box::new(rings.iter().flatten()),
            Geom::MultiPolygon(polygons) => Box::new(polygons.iter().flatten().flatten()),
        }
    }

    /// Lines of a linear geometry. Empty for other types.
    pub fn lines(&self) -> &[Ring] {
        match self {
            Geom::LineString(line) => std::slice::from_ref(line),
            Geom::MultiLineString(lines) => lines,
            _ => &[],
        }
    }
}

/// Naive buffer polygon around a line, offsetting each vertex sideways by `meters`
/// converted with 111 320 m per degree. Visualization only: the offset ignores latitude
/// distortion and self-intersections are not resolved.
///
/// Returns an empty ring if the line has fewer than two points.
pub fn buffer_line(line: &[GeoPoint], meters: f64) -> Ring {
    if line.len() < 2 {
        return Vec::new();
    }

    let offset = meters / 111_320.0;
    let mut left = Vec::with_capacity(line.len());
    let mut right = Vec::with_capacity(line.len());

    for pair in line.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dx = b.lon() - a.lon();
        let dy = b.lat() - a.lat();
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            continue;
        }

        let nx = -dy / len;
        let ny = dx / len;
        left.push(GeoPoint::new(a.lon() + nx * offset, a.lat() + ny * offset));
        right.push(GeoPoint::new(a.lon() - nx * offset, a.lat() - ny * offset));
    }

    if let Some(last) = line.last() {
        left.push(*last);
        right.push(*last);
    }

    left.extend(right.into_iter().rev());
    left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iter_points_covers_all_rings() {
        let square = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(0.0, 0.0),
        ];
        let geom = Geom::MultiPolygon(vec![vec![square.clone()], vec![square.clone(), square]]);
        assert_eq!(geom.iter_points().count(), 12);
        assert!(geom.lines().is_empty());
        assert!(geom.geometry_type().is_areal());
    }

    #[test]
    fn buffer_line_wraps_around_line() {
        let line = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0)];
        let polygon = buffer_line(&line, 111_320.0);
        assert_eq!(polygon.len(), 4);
        assert_eq!(polygon[0], GeoPoint::new(0.0, 1.0));
        assert_eq!(polygon[1], GeoPoint::new(1.0, 0.0));
        assert_eq!(polygon[3], GeoPoint::new(0.0, -1.0));

        assert!(buffer_line(&line[..1], 10.0).is_empty());
    }
}
