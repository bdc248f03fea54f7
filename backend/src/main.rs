use anyhow::{Context, Result};
use chrono::Local;
use itinerary_backend::Backend;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: trip-report [trip-id]";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let trip_id = std::env::args().nth(1);
    if matches!(trip_id.as_deref(), Some("-h") | Some("--help")) {
        println!("{}", USAGE);
        return Ok(());
    }

    let backend = Backend::new().context("Failed to open the trip data directory")?;
    let service = &backend.trip_service;
    let today = Local::now().date_naive();

    let Some(trip_id) = trip_id else {
        let trips = service.list_trips(today)?;
        info!("Found {} trips", trips.len());
        for trip in trips {
            println!(
                "{:<45} {:<30} {} -> {}  [{}]  {}",
                trip.id, trip.name, trip.start_date, trip.end_date, trip.status, trip.formatted_total_budget
            );
        }
        return Ok(());
    };

    let summary = service
        .trip_summary(&trip_id, today)
        .with_context(|| format!("Could not load trip {}", trip_id))?;
    println!("{} ({})", summary.name, summary.status);
    println!("{} -> {}, {} days", summary.start_date, summary.end_date, summary.duration_days);
    println!(
        "Budget {}, planned spend {} across {} activities",
        summary.formatted_total_budget, summary.formatted_total_spend, summary.total_activities
    );

    println!();
    for day in service.day_wise_view(&trip_id)? {
        println!("Day {} - {} ({})", day.day_number, day.formatted_date, day.formatted_total);
        for activity in &day.activities {
            println!(
                "  {:>5}  {:<40} {:<20} {}",
                activity.time.as_deref().unwrap_or(""),
                activity.name,
                activity.destination_name,
                activity.formatted_budget
            );
        }
    }

    println!();
    for destination in service.destination_view(&trip_id)? {
        let ceiling = destination.formatted_ceiling.as_deref().unwrap_or("no ceiling");
        let flag = if destination.over_ceiling { "  OVER CEILING" } else { "" };
        println!("{:<30} {} of {}{}", destination.name, destination.formatted_total, ceiling, flag);
    }

    Ok(())
}
