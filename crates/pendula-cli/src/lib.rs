//! Pendula CLI - batch runs of the double-pendulum simulator.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use pendula_sim::{run_batch, slider, BatchResult, SimulationConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Public function that can be called from the main binary
pub fn run_cli_main(args: &[&str]) -> Result<()> {
    let args = Args::parse_from(args);
    main_inner(args)
}

#[derive(Parser, Debug)]
#[command(name = "pendula-cli")]
#[command(about = "Double-pendulum batch simulator")]
#[command(version)]
pub struct Args {
    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Output file format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Run a single simulation
    #[arg(long)]
    single: bool,

    /// JSON configuration file; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Displayed frames to simulate (32 RK4 steps each)
    #[arg(long, default_value_t = 600)]
    frames: usize,

    // ── Physical constants ────────────────────────────────────
    #[arg(long)]
    l1: Option<f64>,

    #[arg(long)]
    m1: Option<f64>,

    #[arg(long)]
    l2: Option<f64>,

    #[arg(long)]
    m2: Option<f64>,

    // ── Initial conditions ────────────────────────────────────
    #[arg(long)]
    phi1_init: Option<f64>,

    #[arg(long)]
    phi2_init: Option<f64>,

    #[arg(short = 'n', long)]
    pendulum_number: Option<usize>,

    #[arg(long)]
    deviation: Option<f64>,

    #[arg(long)]
    randomness: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    // ── Trails ────────────────────────────────────────────────
    #[arg(long)]
    trails: bool,

    #[arg(long)]
    trail_length: Option<usize>,

    #[arg(long)]
    trail_update_interval: Option<usize>,

    // ── Sweep options ─────────────────────────────────────────
    #[arg(long, default_value = "l1")]
    sweep_param: String,

    #[arg(long, default_value_t = 5)]
    sweep_steps: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main_inner(args: Args) -> Result<()> {
    println!("Pendula Double-Pendulum Simulator");
    println!("=================================\n");

    if args.single {
        run_single(&args)?;
    } else {
        run_sweep(&args)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Single Run
// ---------------------------------------------------------------------------
fn run_single(args: &Args) -> Result<()> {
    println!("Running single simulation...");

    let config = build_config(args)?;
    let result = run_batch(&config, args.frames).context("simulation halted")?;

    print_sim_stats(&result);
    write_output(args, &result)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Sweep Run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
struct SweepRow {
    value: f64,
    energy_drift: f64,
    final_spread: f64,
}

fn run_sweep(args: &Args) -> Result<()> {
    let base = build_config(args)?;
    let name = args.sweep_param.as_str();
    let Some(centre) = sweep_field(&mut base.clone(), name).map(|v| *v) else {
        bail!(
            "cannot sweep '{name}', expected one of: {}",
            SWEEPABLE.join(", ")
        );
    };
    if args.sweep_steps == 0 {
        bail!("--sweep-steps must be at least 1");
    }

    // Slider-backed fields stay inside their slider range
    let (start, end) = match slider(name) {
        Some(spec) => (spec.clamp(centre * 0.5), spec.clamp(centre * 1.5)),
        None => (centre * 0.5, centre * 1.5),
    };
    println!("Sweeping {name} from {:.3} to {:.3}", start, end);

    let steps = args.sweep_steps;
    let mut rows = Vec::with_capacity(steps);

    for i in 0..steps {
        let val = if steps > 1 {
            start + (end - start) * (i as f64 / (steps - 1) as f64)
        } else {
            centre
        };

        let mut config = base.clone();
        if let Some(field) = sweep_field(&mut config, name) {
            *field = val;
        }
        let res = run_batch(&config, args.frames)
            .with_context(|| format!("sweep run {} ({name} = {val})", i + 1))?;

        let row = SweepRow {
            value: val,
            energy_drift: res.energy_drift(),
            final_spread: res.final_spread(),
        };
        println!(
            "Run {}/{} | {}: {:.3} -> Drift: {:.2e}, Spread: {:.3}",
            i + 1,
            steps,
            name,
            val,
            row.energy_drift,
            row.final_spread
        );
        rows.push(row);
    }

    std::fs::create_dir_all(&args.output_dir)?;
    let path = match args.format {
        OutputFormat::Csv => {
            let path = args.output_dir.join("sweep_summary.csv");
            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record([name, "energy_drift", "final_spread"])?;
            for row in &rows {
                wtr.write_record(&[
                    format!("{:.4}", row.value),
                    format!("{:.3e}", row.energy_drift),
                    format!("{:.4}", row.final_spread),
                ])?;
            }
            wtr.flush()?;
            path
        }
        OutputFormat::Json => {
            let path = args.output_dir.join("sweep_summary.json");
            let summary = serde_json::json!({ "param": name, "runs": rows });
            std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
            path
        }
    };

    println!("\nSweep complete. Summary at {:?}", path);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SWEEPABLE: [&str; 7] = ["l1", "l2", "m1", "m2", "phi1_init", "phi2_init", "deviation"];

fn sweep_field<'a>(config: &'a mut SimulationConfig, name: &str) -> Option<&'a mut f64> {
    match name {
        "l1" => Some(&mut config.l1),
        "l2" => Some(&mut config.l2),
        "m1" => Some(&mut config.m1),
        "m2" => Some(&mut config.m2),
        "phi1_init" => Some(&mut config.phi1_init),
        "phi2_init" => Some(&mut config.phi2_init),
        "deviation" => Some(&mut config.deviation),
        _ => None,
    }
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    // Flags win over the file
    macro_rules! apply {
        ($($field:ident),*) => {
            $(if let Some(v) = args.$field {
                config.$field = v;
            })*
        };
    }
    apply!(
        l1,
        m1,
        l2,
        m2,
        phi1_init,
        phi2_init,
        pendulum_number,
        deviation,
        randomness,
        trail_length,
        trail_update_interval
    );
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.trails {
        config.trails = true;
    }

    config.validate().context("invalid simulation config")?;
    debug!(?config, "configuration resolved");
    Ok(config)
}

fn print_sim_stats(result: &BatchResult) {
    let sim_time = result.time.last().copied().unwrap_or(0.0);

    println!("\nSimulation Stats:");
    println!("  Pendulums:     {}", result.pendulum_count());
    println!("  Frames:        {}", result.frame_count());
    println!("  Sim Time:      {:.3} s", sim_time);
    println!("  Energy Drift:  {:.3e}", result.energy_drift());
    println!("  Final Spread:  {:.4}", result.final_spread());
    println!("-----------------------------");
}

fn write_output(args: &Args, result: &BatchResult) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)?;
    let path = match args.format {
        OutputFormat::Csv => {
            let path = args.output_dir.join("simulation.csv");
            write_csv(&path, result)?;
            path
        }
        OutputFormat::Json => {
            let path = args.output_dir.join("simulation.json");
            std::fs::write(&path, serde_json::to_string_pretty(result)?)?;
            path
        }
    };
    println!("Results written to {:?}", path);
    Ok(())
}

fn write_csv(path: &Path, result: &BatchResult) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "time", "pendulum", "x1", "y1", "x2", "y2", "phi1", "phi2", "energy",
    ])?;

    for (k, frame) in result.frames.iter().enumerate() {
        for (i, f) in frame.iter().enumerate() {
            wtr.write_record(&[
                format!("{:.4}", result.time[k]),
                i.to_string(),
                format!("{:.6}", f.x1),
                format!("{:.6}", f.y1),
                format!("{:.6}", f.x2),
                format!("{:.6}", f.y2),
                format!("{:.6}", result.phi1[k][i]),
                format!("{:.6}", result.phi2[k][i]),
                format!("{:.6}", result.pendulum_energy[k][i]),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
