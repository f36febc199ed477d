//! Leverage simulation CLI
//!
//! Usage: simulate --input <csv> [--start <date>] [--leverage <factor>] [--sweep]
//!
//! Prints the simulation result as JSON on stdout, summary on stderr.

use std::time::Instant;

use tracing_subscriber::EnvFilter;

use leverage_sim::{
    load_csv_path, run_simulation, run_start_sweep, Baseline, SimulationRequest, SweepPoint,
    SweepRequest,
};

/// Structure representing command-line arguments.
#[derive(Debug)]
struct Args {
    input: std::path::PathBuf,
    start: Option<String>,
    leverage: f64,
    sweep: bool,
    min_days: usize,
    anchor_open: bool,
    no_baseline: bool,
}

impl Args {
    fn parse() -> Self {
        let matches = clap::Command::new("simulate")
            .version("0.1.0")
            .about("Simulate a constant-leverage position over daily price history")
            .arg(
                clap::Arg::new("input")
                    .short('i')
                    .long("input")
                    .help("Path to CSV price history")
                    .required(true)
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("start")
                    .short('s')
                    .long("start")
                    .help("Start date (YYYY-MM-DD or MM/DD/YYYY) or row index; defaults to the first day")
                    .num_args(1),
            )
            .arg(
                clap::Arg::new("leverage")
                    .short('l')
                    .long("leverage")
                    .help("Leverage factor applied to each day's return")
                    .default_value("3")
                    .num_args(1)
                    .value_parser(clap::builder::ValueParser::new(parse_finite_f64)),
            )
            .arg(
                clap::Arg::new("sweep")
                    .long("sweep")
                    .help("Compute the final value for every start date instead of one curve")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                clap::Arg::new("min-days")
                    .long("min-days")
                    .help("Skip sweep starts with this many or fewer days remaining")
                    .default_value("10")
                    .num_args(1)
                    .value_parser(clap::builder::ValueParser::new(parse_usize_positive))
                    .requires("sweep"),
            )
            .arg(
                clap::Arg::new("anchor-open")
                    .long("anchor-open")
                    .help("Anchor the curves at the opening price instead of 1.0")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                clap::Arg::new("no-baseline")
                    .long("no-baseline")
                    .help("Omit the unleveraged comparison series")
                    .action(clap::ArgAction::SetTrue),
            )
            .get_matches();

        Args {
            input: std::path::PathBuf::from(matches.get_one::<String>("input").unwrap()),
            start: matches.get_one::<String>("start").cloned(),
            leverage: *matches.get_one::<f64>("leverage").unwrap(),
            sweep: matches.get_flag("sweep"),
            min_days: *matches.get_one::<usize>("min-days").unwrap(),
            anchor_open: matches.get_flag("anchor-open"),
            no_baseline: matches.get_flag("no-baseline"),
        }
    }
}

fn parse_finite_f64(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err("must be a finite number".to_string()),
        Err(e) => Err(format!("not a valid number: {}", e)),
    }
}

fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("not a valid number: {}", e)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let start_t = Instant::now();

    let series = match load_csv_path(&args.input) {
        Ok(series) => series,
        Err(e) => {
            eprintln!("Failed to load {}: {}", args.input.display(), e);
            std::process::exit(1);
        }
    };
    eprintln!(
        "Loaded {} rows ({} invalid) from {}",
        series.len(),
        series.count_invalid(),
        args.input.display()
    );

    let start_index = match &args.start {
        Some(value) => match series.index_of_date(value).or_else(|| value.parse().ok()) {
            Some(i) => i,
            None => {
                eprintln!("Start date {} not found in series", value);
                std::process::exit(1);
            }
        },
        None => 0,
    };

    let baseline = if args.anchor_open {
        Baseline::OpenPrice
    } else {
        Baseline::Normalized
    };

    if args.sweep {
        let request = SweepRequest {
            start_index,
            leverage_factor: args.leverage,
            baseline,
            min_days: args.min_days,
        };
        let response = match run_start_sweep(&series, &request) {
            Ok(response) => response,
            Err(e) => {
                eprintln!("Sweep error: {}", e);
                std::process::exit(1);
            }
        };
        let elapsed = start_t.elapsed();

        println!("{}", serde_json::to_string_pretty(&response).unwrap());

        let mut best: Option<&SweepPoint> = None;
        for point in &response.points {
            if best.map_or(true, |b| point.final_value > b.final_value) {
                best = Some(point);
            }
        }

        eprintln!("\n───────────────────────────────");
        eprintln!("Starts:    {}", response.count);
        if let Some(best) = best {
            eprintln!("Best:      {} ({:.4})", best.start_date, best.final_value);
        }
        eprintln!("Time:      {:.2}ms", elapsed.as_secs_f64() * 1000.0);
        eprintln!("───────────────────────────────");
    } else {
        let request = SimulationRequest {
            start_index,
            leverage_factor: args.leverage,
            baseline,
            include_baseline: !args.no_baseline,
        };
        let response = match run_simulation(&series, &request) {
            Ok(response) => response,
            Err(e) => {
                eprintln!("Simulation error: {}", e);
                std::process::exit(1);
            }
        };
        let elapsed = start_t.elapsed();

        println!("{}", serde_json::to_string_pretty(&response).unwrap());

        let final_leveraged = response.leveraged.last().map(|p| p.value).unwrap_or(1.0);
        let final_unleveraged = response
            .unleveraged
            .as_ref()
            .and_then(|points| points.last())
            .map(|p| p.value);

        eprintln!("\n───────────────────────────────");
        eprintln!("Days:      {}", response.leveraged.len());
        eprintln!("Skipped:   {}", response.skipped_days);
        eprintln!("Resets:    {}", response.corruption_resets);
        eprintln!("Final:     {:.4}", final_leveraged);
        if let Some(value) = final_unleveraged {
            eprintln!("Unlevered: {:.4}", value);
        }
        eprintln!("CAGR:      {:.2}%", response.metrics.cagr * 100.0);
        eprintln!("Time:      {:.2}ms", elapsed.as_secs_f64() * 1000.0);
        eprintln!("───────────────────────────────");
    }
}
