//! Named geographic extents, e.g. `"world"` or `"argentina"`.
//!
//! Boxes are approximate and intended for visualization.

use std::collections::BTreeMap;

use rastermap_types::BBox;

use crate::error::GisError;

const EXTENTS_DATA: &str = include_str!("../data/extents.json");

/// Table of named bounding boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct Extents {
    boxes: BTreeMap<String, BBox>,
}

impl Extents {
    /// Extents bundled with the crate.
    pub fn builtin() -> Result<Self, GisError> {
        Self::from_json(EXTENTS_DATA)
    }

    /// Parses a `{"name": [min_lon, min_lat, max_lon, max_lat]}` document.
    ///
    /// Names are stored lowercase.
    pub fn from_json(json: &str) -> Result<Self, GisError> {
        let raw: BTreeMap<String, Vec<f64>> = serde_json::from_str(json)
            .map_err(|err| GisError::InvalidBBox(format!("invalid extents document: {err}")))?;

        let mut boxes = BTreeMap::new();
        for (name, values) in raw {
            let bbox = BBox::from_slice(&values)
                .map_err(|err| GisError::InvalidBBox(format!("extent {name}: {err}")))?;
            boxes.insert(name.to_lowercase(), bbox);
        }

        Ok(Self { boxes })
    }

    /// Bounding box of a bundled extent.
    ///
    /// ```ignore
    /// let argentina = Extents::fetch("Argentina")?;
    /// ```
    pub fn fetch(name: &str) -> Result<BBox, GisError> {
        Self::builtin()?.get(name)
    }

    /// Bounding box of the extent with the given name, compared case-insensitively.
    pub fn get(&self, name: &str) -> Result<BBox, GisError> {
        self.boxes
            .get(&name.trim().to_lowercase())
            .copied()
            .ok_or_else(|| GisError::InvalidBBox(format!("unknown extent: {name}")))
    }

    /// Names of all extents, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.boxes.keys().map(String::as_str)
    }
}
