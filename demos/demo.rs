use datediff::{diff, diff_with, DiffOptions, NanoTime, Unit, Units};
use tracing_subscriber::EnvFilter;

fn main() {
    // RUST_LOG=datediff=trace shows calendar corrections and running advances.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let start = NanoTime::from_ymd(2024, 1, 1).unwrap();
    let end = NanoTime::new(2025, 7, 15, 2, 0, 0, 0).unwrap();
    println!("From {} to {}", start, end);

    let units = Units::from_names(["years", "months", "weeks", "hours"]);
    match diff(&start, &end, &units, true) {
        Ok(d) => println!("Running:     {}", d),
        Err(e) => println!("error: {}", e),
    }
    match diff(&start, &end, &units, false) {
        Ok(d) => println!("Independent: {}", d),
        Err(e) => println!("error: {}", e),
    }

    // Against the present
    let now = NanoTime::now_utc();
    let next_year = NanoTime::from_ymd(now.year() + 1, 1, 1).unwrap();
    let options = DiffOptions::new()
        .units(Units::from([Unit::Months, Unit::Days, Unit::Hours, Unit::Minutes]))
        .running(true);
    match diff_with(&now, &next_year, &options) {
        Ok(d) => println!("Until {}: {}", next_year.date(), d),
        Err(e) => println!("error: {}", e),
    }

    // Reversed pairs are rejected
    if let Err(e) = diff(&end, &start, &units, true) {
        println!("Reversed: {}", e);
    }
}
