use clap::{Args, Parser, Subcommand};
use ltm_network::ThermalNetwork;
use ltm_project::{Project, build_network, load_yaml, sim_options};
use ltm_results::{OutputFormat, SnapshotWriter, create_writer};
use ltm_sim::{SimOptions, SimProgress, StepControl, Stepping, run_sim_with_observer};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ltm")]
#[command(about = "Lumped thermal model simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project and print its network
    Info {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Run a simulation
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Path to the project YAML file
    project_path: PathBuf,
    /// Stream temperatures to a CSV file
    #[arg(long, conflicts_with = "bin")]
    csv: Option<PathBuf>,
    /// Stream temperatures to a binary file
    #[arg(long)]
    bin: Option<PathBuf>,
    /// End time in seconds (overrides the project)
    #[arg(long)]
    t_end: Option<f64>,
    /// Fixed time step in seconds (overrides the project)
    #[arg(long, conflicts_with = "adaptive")]
    dt: Option<f64>,
    /// Adaptive stepping with this maximum temperature change per step
    #[arg(long, value_name = "MAX_DELTA_T")]
    adaptive: Option<f64>,
    /// Stop the run on the first failed snapshot write
    #[arg(long)]
    abort_on_io_error: bool,
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("Project error: {0}")]
    Project(#[from] ltm_project::ProjectError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] ltm_sim::SimError),

    #[error("Results error: {0}")]
    Results(#[from] ltm_results::ResultsError),
}

type AppResult<T> = Result<T, AppError>;

fn main() -> AppResult<()> {
    // RUST_LOG selects the filter
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { project_path } => cmd_info(&project_path),
        Commands::Run(args) => cmd_run(&args),
    }
}

fn cmd_info(project_path: &Path) -> AppResult<()> {
    let project = load_yaml(project_path)?;
    let network = build_network(&project)?;

    println!("Project: {} (version {})", project.name, project.version);
    println!(
        "  {} bodies, {} exchanges, {} sources",
        network.body_count(),
        network.exchanges().len(),
        network.sources().len()
    );

    println!("\nExchanges:");
    for exchange in network.exchanges() {
        let first = network.body(exchange.first()).map_or("?", |b| b.label());
        let second = network.body(exchange.second()).map_or("?", |b| b.label());
        println!(
            "  {} [{}] {} <-> {}",
            exchange.label(),
            exchange.law().name(),
            first,
            second
        );
    }

    if !network.sources().is_empty() {
        println!("\nSources:");
        for source in network.sources() {
            let body = network.body(source.body()).map_or("?", |b| b.label());
            println!("  {} -> {}: {} W", source.label(), body, source.power());
        }
    }

    println!("\nInitial state:");
    print!("{network}");
    Ok(())
}

fn cmd_run(args: &RunArgs) -> AppResult<()> {
    let project = load_yaml(&args.project_path)?;
    let mut network = build_network(&project)?;
    let opts = run_options(&project, args);
    info!(project = %project.name, t_end = opts.t_end, stepping = ?opts.stepping, "starting run");

    let mut stream = SnapshotStream {
        writer: open_writer(args, &network)?,
        record_every: opts.record_every,
        abort_on_io_error: args.abort_on_io_error,
        last_step: 0,
        failures: 0,
    };

    let start = Instant::now();
    let record = run_sim_with_observer(&mut network, &opts, |progress, net| {
        stream.observe(progress, net)
    })?;
    let elapsed = start.elapsed();
    let io_failures = stream.finish(record.steps, &network);

    let t_final = record.last().map_or(0.0, |(t, _)| t);
    let per_step_us = elapsed.as_secs_f64() * 1e6 / record.steps.max(1) as f64;

    if record.stopped {
        println!("Run stopped early");
    }
    println!("Iterations: {}", record.steps);
    println!("Final time: {:.6} s", t_final);
    println!(
        "Duration:   {:.3} ms ({:.3} us/iteration)",
        elapsed.as_secs_f64() * 1e3,
        per_step_us
    );
    if io_failures > 0 {
        println!("Snapshot write failures: {}", io_failures);
    }
    println!("\nFinal temperatures:");
    print!("{network}");
    Ok(())
}

/// Optional snapshot stream fed by the run observer.
///
/// Streams the same states the run records: every `record_every`-th step
/// and the final one.
struct SnapshotStream {
    writer: Option<Box<dyn SnapshotWriter>>,
    record_every: usize,
    abort_on_io_error: bool,
    /// Last step handed to the writer
    last_step: usize,
    failures: usize,
}

impl SnapshotStream {
    fn observe(&mut self, progress: &SimProgress, network: &ThermalNetwork) -> StepControl {
        if self.writer.is_none() || progress.step % self.record_every != 0 {
            return StepControl::Continue;
        }
        if self.write(progress.step, network) || !self.abort_on_io_error {
            StepControl::Continue
        } else {
            StepControl::Stop
        }
    }

    /// Write the final state if the last step was skipped, flush, and
    /// return the number of failed writes.
    fn finish(mut self, steps: usize, network: &ThermalNetwork) -> usize {
        if steps != self.last_step {
            self.write(steps, network);
        }
        if let Some(w) = self.writer.as_mut()
            && let Err(e) = w.finish()
        {
            self.failures += 1;
            warn!(error = %e, "failed to flush snapshot stream");
        }
        self.failures
    }

    fn write(&mut self, step: usize, network: &ThermalNetwork) -> bool {
        let Some(w) = self.writer.as_mut() else {
            return true;
        };
        self.last_step = step;
        match w.write_snapshot(network) {
            Ok(()) => true,
            Err(e) => {
                self.failures += 1;
                warn!(step, error = %e, "snapshot write failed");
                false
            }
        }
    }
}

/// Project run options with command line overrides applied.
fn run_options(project: &Project, args: &RunArgs) -> SimOptions {
    let mut opts = sim_options(&project.run);
    if let Some(t_end) = args.t_end {
        opts.t_end = t_end;
    }
    if let Some(dt) = args.dt {
        opts.stepping = Stepping::Fixed { dt };
    }
    if let Some(max_delta_t) = args.adaptive {
        opts.stepping = Stepping::adaptive(max_delta_t);
    }
    opts
}

/// Open the requested stream and write its header and the initial snapshot.
fn open_writer(
    args: &RunArgs,
    network: &ThermalNetwork,
) -> AppResult<Option<Box<dyn SnapshotWriter>>> {
    let target = match (&args.csv, &args.bin) {
        (Some(path), _) => Some((path, OutputFormat::Csv)),
        (None, Some(path)) => Some((path, OutputFormat::Binary)),
        (None, None) => None,
    };
    let Some((path, format)) = target else {
        return Ok(None);
    };
    let mut writer = create_writer(path, format)?;
    writer.write_header(network)?;
    writer.write_snapshot(network)?;
    Ok(Some(writer))
}
