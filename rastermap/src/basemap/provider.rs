use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::GisError;
use crate::tile_grid::TileIndex;

/// Date used by time-varying imagery when none is given.
pub const DEFAULT_TIME: &str = "default";

/// Raster tile providers the map knows how to fetch from.
///
/// Every provider serves 256×256 XYZ tiles in Web Mercator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BasemapProvider {
    /// OpenStreetMap standard.
    Osm,
    /// OpenStreetMap humanitarian.
    OsmHot,
    /// OpenStreetMap France.
    OsmFr,
    /// CARTO light.
    #[default]
    CartoLight,
    /// CARTO light without labels.
    CartoLightNoLabels,
    /// CARTO dark.
    CartoDark,
    /// CARTO dark without labels.
    CartoDarkNoLabels,
    /// Esri world imagery.
    EsriSatellite,
    /// Esri street map.
    EsriStreets,
    /// Esri topographic map.
    EsriTerrain,
    /// Stamen toner.
    StamenToner,
    /// Stamen toner lite.
    StamenTonerLite,
    /// Stamen terrain.
    StamenTerrain,
    /// Stamen watercolor (JPEG tiles).
    StamenWatercolor,
    /// OpenTopoMap.
    Topo,
    /// Wikimedia maps.
    Wikimedia,
    /// OpenRailwayMap.
    Railway,
    /// CyclOSM.
    Cyclosm,
    /// NASA GIBS MODIS Terra true color imagery of a given date (`YYYY-MM-DD` or `default`).
    NasaModisTrueColor {
        /// Imagery date.
        time: String,
    },
}

impl BasemapProvider {
    /// Identifiers of all known providers.
    pub const IDS: [&'static str; 19] = [
        "osm",
        "osm_hot",
        "osm_fr",
        "carto_light",
        "carto_light_nolabels",
        "carto_dark",
        "carto_dark_nolabels",
        "esri_satellite",
        "esri_streets",
        "esri_terrain",
        "stamen_toner",
        "stamen_toner_lite",
        "stamen_terrain",
        "stamen_watercolor",
        "topo",
        "wikimedia",
        "railway",
        "cyclosm",
        "nasa_modis_true_color",
    ];

    /// Looks up a provider by its identifier.
    pub fn from_id(id: &str) -> Result<Self, GisError> {
        let provider = match id {
            "osm" => Self::Osm,
            "osm_hot" => Self::OsmHot,
            "osm_fr" => Self::OsmFr,
            "carto_light" => Self::CartoLight,
            "carto_light_nolabels" => Self::CartoLightNoLabels,
            "carto_dark" => Self::CartoDark,
            "carto_dark_nolabels" => Self::CartoDarkNoLabels,
            "esri_satellite" => Self::EsriSatellite,
            "esri_streets" => Self::EsriStreets,
            "esri_terrain" => Self::EsriTerrain,
            "stamen_toner" => Self::StamenToner,
            "stamen_toner_lite" => Self::StamenTonerLite,
            "stamen_terrain" => Self::StamenTerrain,
            "stamen_watercolor" => Self::StamenWatercolor,
            "topo" => Self::Topo,
            "wikimedia" => Self::Wikimedia,
            "railway" => Self::Railway,
            "cyclosm" => Self::Cyclosm,
            "nasa_modis_true_color" => Self::NasaModisTrueColor {
                time: DEFAULT_TIME.to_string(),
            },
            _ => return Err(GisError::UnsupportedBasemapProvider(id.to_string())),
        };

        Ok(provider)
    }

    /// Sets the imagery date of a time-varying provider. Other providers are returned unchanged.
    pub fn with_time(self, date: impl Into<String>) -> Self {
        match self {
            Self::NasaModisTrueColor { .. } => Self::NasaModisTrueColor { time: date.into() },
            other => other,
        }
    }

    /// Identifier of the provider, also used as a prefix of tile cache entries.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Osm => "osm",
            Self::OsmHot => "osm_hot",
            Self::OsmFr => "osm_fr",
            Self::CartoLight => "carto_light",
            Self::CartoLightNoLabels => "carto_light_nolabels",
            Self::CartoDark => "carto_dark",
            Self::CartoDarkNoLabels => "carto_dark_nolabels",
            Self::EsriSatellite => "esri_satellite",
            Self::EsriStreets => "esri_streets",
            Self::EsriTerrain => "esri_terrain",
            Self::StamenToner => "stamen_toner",
            Self::StamenTonerLite => "stamen_toner_lite",
            Self::StamenTerrain => "stamen_terrain",
            Self::StamenWatercolor => "stamen_watercolor",
            Self::Topo => "topo",
            Self::Wikimedia => "wikimedia",
            Self::Railway => "railway",
            Self::Cyclosm => "cyclosm",
            Self::NasaModisTrueColor { .. } => "nasa_modis_true_color",
        }
    }

    /// Key that identifies the provider's tiles in a cache. Includes the date for time-varying
    /// imagery.
    pub fn cache_key(&self) -> String {
        match self {
            Self::NasaModisTrueColor { time } if time != DEFAULT_TIME => {
                format!("{}-{time}", self.id())
            }
            _ => self.id().to_string(),
        }
    }

    /// URL template with `{z}`, `{x}`, `{y}` and, for time-varying imagery, `{time}` placeholders.
    pub fn url_template(&self) -> &'static str {
        match self {
            Self::Osm => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            Self::OsmHot => "https://tile.openstreetmap.fr/hot/{z}/{x}/{y}.png",
            Self::OsmFr => "https://a.tile.openstreetmap.fr/osmfr/{z}/{x}/{y}.png",
            Self::CartoLight => "https://a.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png",
            Self::CartoLightNoLabels => {
                "https://a.basemaps.cartocdn.com/light_nolabels/{z}/{x}/{y}.png"
            }
            Self::CartoDark => "https://a.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png",
            Self::CartoDarkNoLabels => "https://a.basemaps.cartocdn.com/dark_nolabels/{z}/{x}/{y}.png",
            Self::EsriSatellite => "https://services.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            Self::EsriStreets => "https://services.arcgisonline.com/ArcGIS/rest/services/World_Street_Map/MapServer/tile/{z}/{y}/{x}",
            Self::EsriTerrain => "https://services.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}",
            Self::StamenToner => "https://stamen-tiles.a.ssl.fastly.net/toner/{z}/{x}/{y}.png",
            Self::StamenTonerLite => "https://stamen-tiles.a.ssl.fastly.net/toner-lite/{z}/{x}/{y}.png",
            Self::StamenTerrain => "https://stamen-tiles.a.ssl.fastly.net/terrain/{z}/{x}/{y}.png",
            Self::StamenWatercolor => {
                "https://stamen-tiles.a.ssl.fastly.net/watercolor/{z}/{x}/{y}.jpg"
            }
            Self::Topo => "https://a.tile.opentopomap.org/{z}/{x}/{y}.png",
            Self::Wikimedia => "https://maps.wikimedia.org/osm-intl/{z}/{x}/{y}.png",
            Self::Railway => "https://tiles.openrailwaymap.org/standard/{z}/{x}/{y}.png",
            Self::Cyclosm => "https://a.tile-cyclosm.openstreetmap.fr/cyclosm/{z}/{x}/{y}.png",
            Self::NasaModisTrueColor { .. } => "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best/MODIS_Terra_CorrectedReflectance_TrueColor/default/{time}/GoogleMapsCompatible_Level9/{z}/{y}/{x}.jpg",
        }
    }

    /// URL of the tile with the given index.
    pub fn tile_url(&self, index: TileIndex) -> Result<String, GisError> {
        let mut vars = HashMap::from([
            ("z".to_string(), index.z.to_string()),
            ("x".to_string(), index.x.to_string()),
            ("y".to_string(), index.y.to_string()),
        ]);
        if let Self::NasaModisTrueColor { time } = self {
            vars.insert("time".to_string(), time.clone());
        }

        strfmt::strfmt(self.url_template(), &vars).map_err(|err| GisError::TileFetchFailure {
            index,
            reason: format!("invalid url template for {}: {err}", self.id()),
        })
    }
}

impl FromStr for BasemapProvider {
    type Err = GisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s)
    }
}

impl Display for BasemapProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn every_id_resolves() {
        for id in BasemapProvider::IDS {
            let provider = BasemapProvider::from_id(id).unwrap();
            assert_eq!(provider.id(), id);
            assert!(provider.tile_url(TileIndex::new(1, 2, 3)).is_ok());
        }
    }

    #[test]
    fn unknown_provider() {
        assert_matches!(
            "google_maps".parse::<BasemapProvider>(),
            Err(GisError::UnsupportedBasemapProvider(id)) if id == "google_maps"
        );
    }

    #[test]
    fn xyz_and_zyx_templates() {
        let index = TileIndex::new(10868, 19428, 15);
        assert_eq!(
            BasemapProvider::CartoLight.tile_url(index).unwrap(),
            "https://a.basemaps.cartocdn.com/light_all/15/10868/19428.png"
        );
        assert_eq!(
            BasemapProvider::EsriSatellite.tile_url(index).unwrap(),
            "https://services.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/15/19428/10868"
        );
    }

    #[test]
    fn time_varying_imagery() {
        let provider = BasemapProvider::from_id("nasa_modis_true_color").unwrap();
        assert_eq!(provider.cache_key(), "nasa_modis_true_color");
        let url = provider.tile_url(TileIndex::new(1, 1, 2)).unwrap();
        assert!(url.contains("/default/default/"));
        assert!(url.ends_with("/2/1/1.jpg"));

        let dated = provider.with_time("2024-01-15");
        assert_eq!(dated.cache_key(), "nasa_modis_true_color-2024-01-15");
        assert!(dated
            .tile_url(TileIndex::new(1, 1, 2))
            .unwrap()
            .contains("/2024-01-15/"));
        assert_eq!(BasemapProvider::Osm.with_time("2024-01-15"), BasemapProvider::Osm);
    }
}
