mod options;

use anyhow::{bail, Error as AnyError};
use clap::Parser;
use drape::{
    io::{GeoJsonLines, GeoJsonSink},
    validate, Conversion, ConversionReport, Destination, DirWorkspace, RasterSurface,
    NO_ELEVATION,
};
use log::info;
use options::Cli;
use serde::Serialize;

fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();
    let json = cli.json;

    env_logger::init();

    let report = convert(cli)?;

    if json {
        print_json(&report)?;
    }

    if !report.is_complete() {
        bail!(
            "{} of {} vertices have no elevation (written as {})",
            report.missing_elevation.len(),
            report.vertex_count,
            NO_ELEVATION
        );
    }
    Ok(())
}

fn convert(
    Cli {
        line,
        dem,
        out,
        out_dir,
        scratch_dir,
        sampling,
        ..
    }: Cli,
) -> Result<ConversionReport, AnyError> {
    let lines = GeoJsonLines::from_path(&line)?;
    // The raster is only opened once the line is known to be usable.
    validate(&lines)?;
    let surface = RasterSurface::open(&dem)?.with_interpolation(sampling.into());
    let workspace = DirWorkspace::new(
        scratch_dir.unwrap_or_else(|| std::env::temp_dir().join("drape3d")),
    )?;
    let mut sink = GeoJsonSink::new(out_dir);

    let mut conversion = Conversion::new();
    if let Some(destination) = out.as_deref().and_then(Destination::parse) {
        conversion = conversion.destination(destination);
    }
    let report = conversion.run(&lines, &surface, &mut sink, &workspace)?;
    info!("output: {}", sink.path(&report.destination).display());
    Ok(report)
}

fn print_json(report: &ConversionReport) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonReport<'a> {
        destination: &'a str,
        vertices: usize,
        spacing: f64,
        missing_elevation: &'a [usize],
    }

    let json = serde_json::to_string(&JsonReport {
        destination: &report.destination.0,
        vertices: report.vertex_count,
        spacing: report.spacing,
        missing_elevation: &report.missing_elevation,
    })?;
    println!("{json}");
    Ok(())
}
