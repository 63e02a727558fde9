//! CLI tool to convert a single point between geodetic and scene coordinates.

use anyhow::Result;
use clap::{Parser, Subcommand};
use flightpath_core::{CartesianPoint, CoordinateMapper, GeoPoint, GeoReference};

/// Convert points between latitude/longitude and scene coordinates
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Reference latitude (default: Tokyo Station)
    #[arg(long, default_value_t = 35.6812, allow_hyphen_values = true)]
    ref_lat: f64,

    /// Reference longitude (default: Tokyo Station)
    #[arg(long, default_value_t = 139.7671, allow_hyphen_values = true)]
    ref_lon: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Geographic point -> scene point
    Forward {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Altitude in meters
        #[arg(long, default_value_t = 50.0, allow_hyphen_values = true)]
        alt: f64,
    },
    /// Scene point -> geographic point
    Inverse {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[arg(long, allow_hyphen_values = true)]
        z: f64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mapper = CoordinateMapper::default();
    let reference = GeoReference::new(args.ref_lat, args.ref_lon);

    match args.command {
        Command::Forward { lat, lon, alt } => {
            let point = mapper.forward(&GeoPoint::new(lat, lon, alt), reference)?;
            println!("{}", serde_json::to_string_pretty(&point)?);
        }
        Command::Inverse { x, y, z } => {
            let geo = mapper.inverse(&CartesianPoint::new(x, y, z), reference)?;
            println!("{}", serde_json::to_string_pretty(&geo)?);
        }
    }

    Ok(())
}
