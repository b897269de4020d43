use std::io::{self, Write};

use manzil::config::Config;
use manzil::emissions::FuelEfficiency;
use manzil::engine::Engine;
use manzil::entities::TripReport;
use manzil::error::Error;

// Routes printed in the summary; every route is drawn on the map.
const REPORTED_ROUTES: usize = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::debug!("{:?}", err);
        eprintln!("Error: {}", err);
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;
    let fuel_efficiency = prompt_fuel_efficiency()?;

    let engine = Engine::new(config)?;
    let report = engine.plan(fuel_efficiency).await?;

    print_report(&report);

    Ok(())
}

fn prompt_fuel_efficiency() -> Result<FuelEfficiency, Error> {
    print!("Enter vehicle fuel efficiency (km per liter): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    line.parse()
}

fn print_report(report: &TripReport) {
    for line in report.summary(REPORTED_ROUTES) {
        println!("{}", line);
    }
}
