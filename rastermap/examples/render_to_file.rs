//! This example renders a map described by an options file into a PNG image.
//!
//! The first argument is a JSON file with [`MapOptions`], the optional second one is a GeoJSON
//! file to draw over the basemap. The image is written to `output_map.png`.
//!
//! ```shell
//! cargo run --example render_to_file -- options.json "Museums 2021.geojson"
//! ```
//!
//! A minimal options file:
//!
//! ```json
//! { "bbox": "buenos_aires", "zoom": 12, "basemap": "osm", "width": 1024, "height": 768 }
//! ```

use anyhow::{anyhow, Result};
use rastermap::layer::MarkerShape;
use rastermap::legend::{LegendItem, LegendPosition};
use rastermap::map::PointSpec;
use rastermap::{Color, MapOptions, Style};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let options_file = args.next().ok_or_else(|| {
        anyhow!("This example must be run with the options file and an optional .geojson file")
    })?;

    let options = MapOptions::load(&options_file)?;
    let mut map = options
        .into_builder()?
        .with_tile_cache(".tile_cache")
        .build()?;

    if let Some(geojson_file) = args.next() {
        let added = map.add_geojson_file(&geojson_file)?;
        log::info!("Loaded {added} features from {geojson_file}");
    }

    // Mark the center of the map, so there is always something over the basemap.
    let center = map.bbox().center();
    map.add_point(
        PointSpec::new(center.lon(), center.lat())
            .with_label("center")
            .with_shape(MarkerShape::Diamond)
            .with_color(Color::rgb(30, 90, 200)),
    );
    map.set_legend(
        LegendPosition::BottomRight,
        [LegendItem::new(Color::rgb(30, 90, 200), "Map center")],
    );

    map.set_style(Style::light());
    map.render()?.to_image().save("output_map.png")?;

    Ok(())
}
