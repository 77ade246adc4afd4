#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless driver for the crash map panel.
//!
//! ```text
//! crash_map_cli render --boundaries boroughs.geojson --incidents crashes.csv \
//!     --width 960 --height 720 [--dpr 2] [--pointer 480 360] [--out out/]
//! crash_map_cli inspect --boundaries boroughs.geojson --incidents crashes.csv
//! ```
//!
//! `render` mounts a panel, optionally replays one pointer position, and
//! writes `boundaries.svg`, `points.png`, `tooltip.json`, and
//! `legend.json` to the output directory. `inspect` prints the fit counts.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use crash_map_panel::config::PanelConfig;
use crash_map_panel::{FitSummary, MapPanel, PanelEvent};
use crash_map_render::PanelSize;
use crash_map_source::FileSource;
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "crash_map_cli",
    about = "Render crash map panel layers without a browser"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount a panel and write its layers to disk
    Render {
        #[command(flatten)]
        panel: PanelArgs,
        /// Pointer position to hover before writing, in panel pixels
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        pointer: Option<Vec<f64>>,
        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },
    /// Mount a panel and print record, projection, and index counts
    Inspect {
        #[command(flatten)]
        panel: PanelArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct PanelArgs {
    /// Boundary `GeoJSON` `FeatureCollection`
    #[arg(long)]
    boundaries: PathBuf,
    /// Incident CSV
    #[arg(long)]
    incidents: PathBuf,
    /// Panel width in CSS pixels
    #[arg(long, default_value = "960")]
    width: f64,
    /// Panel height in CSS pixels
    #[arg(long, default_value = "720")]
    height: f64,
    /// Device pixel ratio for the raster buffer
    #[arg(long, default_value = "1")]
    dpr: f64,
    /// Panel configuration TOML
    #[arg(long)]
    config: Option<PathBuf>,
}

impl PanelArgs {
    fn mount(&self) -> Result<MapPanel, Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => PanelConfig::load(path)?,
            None => PanelConfig::default(),
        };
        let source = FileSource::new(&self.boundaries, &self.incidents)
            .with_name_property(config.boundary_name_property.clone());
        let size = PanelSize::new(self.width, self.height).with_device_pixel_ratio(self.dpr);

        let panel = MapPanel::mount(&source, config, size)?;
        if !panel.is_ready() {
            let message = format!("panel size {}x{} is not drawable", self.width, self.height);
            return Err(message.into());
        }
        Ok(panel)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport {
    #[serde(flatten)]
    summary: FitSummary,
    boundaries: usize,
    scale: f64,
    translate: (f64, f64),
    /// Geographic corners of the panel as `[west, south, east, north]`.
    panel_bounds: Option<[f64; 4]>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            panel,
            pointer,
            out,
        } => {
            let mut panel = panel.mount()?;
            if let Some(&[x, y]) = pointer.as_deref() {
                panel.handle(PanelEvent::PointerMove { x, y });
                if let Some(location) = panel.location_at(x, y) {
                    println!(
                        "Pointer ({x}, {y}) is at lat {:.6}, lon {:.6}",
                        location.latitude, location.longitude
                    );
                }
            }
            write_layers(&panel, &out)?;
            println!("Wrote panel layers to {}", out.display());
        }
        Commands::Inspect { panel, json } => {
            let panel = panel.mount()?;
            let report = inspect(&panel).ok_or("panel has no completed fit")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Boundaries:       {}", report.boundaries);
                println!("Records:          {}", report.summary.records);
                println!("Projectable:      {}", report.summary.projectable);
                println!("Indexed:          {}", report.summary.indexed);
                println!("Boundary paths:   {}", report.summary.boundary_paths);
                println!("Scale:            {:.3}", report.scale);
                println!(
                    "Translate:        ({:.3}, {:.3})",
                    report.translate.0, report.translate.1
                );
                if let Some([west, south, east, north]) = report.panel_bounds {
                    println!(
                        "Panel bounds:     W {west:.6}, S {south:.6}, E {east:.6}, N {north:.6}"
                    );
                }
            }
        }
    }

    Ok(())
}

fn inspect(panel: &MapPanel) -> Option<InspectReport> {
    let summary = panel.fit_summary()?;
    let projection = panel.projection()?;
    let size = panel.size()?;

    let top_left = panel.location_at(0.0, 0.0);
    let bottom_right = panel.location_at(size.width, size.height);
    let panel_bounds = top_left.zip(bottom_right).map(|(nw, se)| {
        [nw.longitude, se.latitude, se.longitude, nw.latitude]
    });

    Some(InspectReport {
        summary,
        boundaries: panel.boundaries().len(),
        scale: projection.scale(),
        translate: projection.translate(),
        panel_bounds,
    })
}

fn write_layers(panel: &MapPanel, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(out)?;

    std::fs::write(out.join("boundaries.svg"), panel.vector_layer().to_svg())?;
    panel.raster_layer().image().save(out.join("points.png"))?;
    std::fs::write(
        out.join("tooltip.json"),
        serde_json::to_string_pretty(panel.tooltip())?,
    )?;
    std::fs::write(
        out.join("legend.json"),
        serde_json::to_string_pretty(&panel.legend())?,
    )?;

    log::info!("Wrote 4 layer files to {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use crash_map_source::MemorySource;
    use crash_map_source::boundaries::parse_feature_collection;

    use super::*;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "square"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-74.0, 40.6], [-73.8, 40.6], [-73.8, 40.8], [-74.0, 40.8], [-74.0, 40.6]]]
            }
        }]
    }"#;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_accepts_pointer_pair() {
        let cli = Cli::try_parse_from([
            "crash_map_cli",
            "render",
            "--boundaries",
            "b.geojson",
            "--incidents",
            "c.csv",
            "--pointer",
            "12.5",
            "40",
        ])
        .unwrap();

        let Commands::Render { panel, pointer, out } = cli.command else {
            panic!("expected render");
        };
        assert_eq!(pointer, Some(vec![12.5, 40.0]));
        assert_eq!(out, PathBuf::from("out"));
        assert!((panel.width - 960.0).abs() < f64::EPSILON);
        assert!((panel.dpr - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inspect_reports_geographic_bounds() {
        let boundaries = parse_feature_collection(SQUARE, "name").unwrap();
        let source = MemorySource::new(boundaries, Vec::new());
        let panel =
            MapPanel::mount(&source, PanelConfig::default(), PanelSize::new(400.0, 400.0)).unwrap();

        let report = inspect(&panel).unwrap();
        let [west, south, east, north] = report.panel_bounds.unwrap();
        assert!(west <= -74.0 + 1e-9 && east >= -73.8 - 1e-9);
        assert!(south <= 40.6 + 1e-9 && north >= 40.8 - 1e-9);
        assert!(west < east && south < north);
        assert_eq!(report.summary.boundary_paths, 1);
    }
}
