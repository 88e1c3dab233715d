//! Estimate route fuel consumption through the vessel server.
//!
//! Either submits a request file:
//!   cargo run -p vessel-cli --bin estimate_route -- --request voyage.json
//!
//! or synthesises a straight voyage:
//!   cargo run -p vessel-cli --bin estimate_route -- \
//!     --imo 9434656 --draught 10.5 --from 59.9,10.7 --to 57.7,11.9 --speed 12

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use vessel_cli::{EstimateRequest, LinearVoyage, VesselClient};

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate fuel consumption for vessel routes")]
struct Args {
    /// Vessel Server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// JSON file with {"imo", "draught", "routes"}
    #[arg(long, conflicts_with_all = ["from", "to"])]
    request: Option<String>,

    /// Vessel IMO number
    #[arg(long, default_value_t = 9_434_656)]
    imo: i64,

    /// Vessel draught in meters
    #[arg(long, default_value_t = 10.0)]
    draught: f64,

    /// Departure position as "lat,lon"
    #[arg(long, value_parser = parse_position)]
    from: Option<(f64, f64)>,

    /// Arrival position as "lat,lon"
    #[arg(long, value_parser = parse_position)]
    to: Option<(f64, f64)>,

    /// Constant speed in knots
    #[arg(long, default_value_t = 12.0)]
    speed: f64,

    /// Departure time (RFC 3339), defaults to now
    #[arg(long)]
    departure: Option<DateTime<Utc>>,

    /// Minutes between generated waypoints
    #[arg(long, default_value_t = 60.0)]
    interval: f64,
}

fn parse_position(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got {:?}", s))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;
    Ok((lat, lon))
}

fn build_request(args: &Args) -> Result<EstimateRequest> {
    if let Some(path) = &args.request {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path))?;
        return serde_json::from_str(&raw).with_context(|| format!("invalid request file {}", path));
    }

    let (Some((from_lat, from_lon)), Some((to_lat, to_lon))) = (args.from, args.to) else {
        bail!("either --request or both --from and --to are required");
    };

    let voyage = LinearVoyage::new(
        from_lat,
        from_lon,
        to_lat,
        to_lon,
        args.speed,
        args.departure.unwrap_or_else(Utc::now),
    );
    println!(
        "Voyage: {:.1} nm at {:.1} kn, {:.0} minutes",
        voyage.distance_nm, voyage.speed_knots, voyage.duration_minutes
    );

    Ok(EstimateRequest {
        imo: args.imo,
        draught: args.draught,
        routes: vec![voyage.route(args.interval)],
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let request = build_request(&args)?;

    let client = VesselClient::new(&args.url);
    let totals = client.estimate(&request).await?;

    println!("Vessel {} at draught {}:", request.imo, request.draught);
    for (index, (route, total)) in request.routes.iter().zip(&totals).enumerate() {
        println!(
            "  route {:>3}: {:>3} waypoints  {:>10.3} t fuel  {:>10.3} t CO2",
            index,
            route.len(),
            total.consumption_metric_tons,
            total.consumption_co2
        );
    }

    Ok(())
}
