use std::collections::BTreeMap;

use crate::feature::Feature;
use crate::style::{LayerKind, WaterKind};

/// Classified features grouped by the layer they are painted in.
///
/// Water features carry a [`WaterKind`] kept in a vector parallel to the water features, so the
/// two always have the same length.
#[derive(Debug, Default, Clone)]
pub struct LayerBuckets {
    features: BTreeMap<LayerKind, Vec<Feature>>,
    water_kinds: Vec<WaterKind>,
}

impl LayerBuckets {
    /// Creates empty buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature to the bucket of `kind`. Water features added this way are
    /// [`WaterKind::Minor`].
    pub fn push(&mut self, kind: LayerKind, feature: Feature) {
        if kind == LayerKind::Water {
            self.push_water(WaterKind::Minor, feature);
        } else {
            self.features.entry(kind).or_default().push(feature);
        }
    }

    /// Adds a water feature.
    pub fn push_water(&mut self, kind: WaterKind, feature: Feature) {
        self.features
            .entry(LayerKind::Water)
            .or_default()
            .push(feature);
        self.water_kinds.push(kind);
    }

    /// Features of the given kind in insertion order.
    pub fn features(&self, kind: LayerKind) -> &[Feature] {
        self.features.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Water features with their sub-kinds.
    pub fn water(&self) -> impl Iterator<Item = (WaterKind, &Feature)> + '_ {
        self.water_kinds
            .iter()
            .copied()
            .zip(self.features(LayerKind::Water))
    }

    /// All features of all kinds.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features.values().flatten()
    }

    /// Total number of features.
    pub fn len(&self) -> usize {
        self.features.values().map(Vec::len).sum()
    }

    /// Returns true if there are no features.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use rastermap_types::{lonlat, Geom};

    use super::*;
    use crate::feature::Properties;

    fn feature(lon: f64) -> Feature {
        Feature::new(Geom::Point(lonlat!(lon, 0.0)), Properties::new(), None)
    }

    #[test]
    fn water_kinds_stay_parallel() {
        let mut buckets = LayerBuckets::new();
        buckets.push_water(WaterKind::River, feature(1.0));
        buckets.push(LayerKind::Water, feature(2.0));
        buckets.push(LayerKind::Street, feature(3.0));

        let water: Vec<_> = buckets.water().collect();
        assert_eq!(water.len(), 2);
        assert_eq!(water[0].0, WaterKind::River);
        assert_eq!(water[1].0, WaterKind::Minor);
        assert_eq!(buckets.features(LayerKind::Street).len(), 1);
        assert!(buckets.features(LayerKind::Rail).is_empty());
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets.iter().count(), 3);
    }
}
