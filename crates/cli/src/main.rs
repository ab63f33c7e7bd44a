#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use transflow_api::{BalancePolicy, TransportError, TransportModel};
use transflow_core::instance::{GeneratorOptions, Instance};
use transflow_core::math::Scalar;
use transflow_core::options::SolveOptions;
use transflow_io::text::matrix_to_string;
use transflow_io::{
    read_instance, save_residual_map, save_route_map, write_counts, write_distance_section,
    write_flow_section, write_instance, write_report, write_summary,
};
use transflow_solver::ClarabelBackend;

#[derive(Parser)]
#[command(name = "transflow")]
#[command(version, about = "Balance-constrained transportation problems on a conic LP backend")]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance (the built-in demo unless --instance is given).
    Solve {
        #[arg(long)]
        instance: Option<PathBuf>,
        #[arg(long)]
        tol: Option<f64>,
        #[arg(long)]
        max_iters: Option<usize>,
        /// Wall-clock limit for the solver, in seconds.
        #[arg(long)]
        time_limit: Option<u64>,
        /// Let the solver judge unbalanced totals instead of rejecting them up front.
        #[arg(long)]
        defer_balance: bool,
        /// Print the solver's own iteration log.
        #[arg(long)]
        verbose: bool,
        /// Also write the full report as JSON to this file.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the report as JSON instead of the text layout.
        #[arg(long)]
        json: bool,
        /// Skip status, objective and route lines after the flow matrix.
        #[arg(long)]
        quiet_summary: bool,
        /// Write an SVG map of the routes to this file.
        #[arg(long)]
        map: Option<PathBuf>,
        /// Write an SVG map of the supply and demand left after shipping.
        #[arg(long)]
        residual_map: Option<PathBuf>,
    },
    /// Validate an instance file and print its totals.
    Check {
        #[arg(long)]
        instance: PathBuf,
    },
    /// Draw a random balanced instance.
    Generate {
        #[arg(long)]
        facilities: usize,
        #[arg(long)]
        customers: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, default_value_t = 20)]
        coord_max: u32,
        #[arg(long, default_value_t = 10)]
        quantity_max: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the built-in demo instance as JSON.
    DemoInstance {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

struct SolveArgs {
    instance: Option<PathBuf>,
    options: SolveOptions<Scalar>,
    output: Option<PathBuf>,
    json: bool,
    quiet_summary: bool,
    map: Option<PathBuf>,
    residual_map: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_tracing(cli.log_json);
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        // a closed stdout (e.g. piped into `head`) is not a failure
        Err(err) if is_broken_pipe(&err) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

fn initialize_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if log_json {
        builder.json().try_init().ok();
    } else {
        builder.try_init().ok();
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|e| e.kind() == io::ErrorKind::BrokenPipe)
}

/// One line naming the failure kind when it is a model error.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TransportError>() {
        Some(transport) => format!("{}: {}", transport.kind(), transport),
        None => format!("{err:#}"),
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Solve {
            instance,
            tol,
            max_iters,
            time_limit,
            defer_balance,
            verbose,
            output,
            json,
            quiet_summary,
            map,
            residual_map,
        } => {
            let mut options = SolveOptions::<Scalar>::default();
            if let Some(tolerance) = tol {
                options.tolerance = tolerance;
            }
            if let Some(iters) = max_iters {
                options.max_iterations = iters;
            }
            if let Some(limit) = time_limit {
                options.max_time = Some(Duration::from_secs(limit));
            }
            if defer_balance {
                options.balance_policy = BalancePolicy::Defer;
            }
            options.verbose = verbose;
            solve_command(SolveArgs {
                instance,
                options,
                output,
                json,
                quiet_summary,
                map,
                residual_map,
            })
        }
        Commands::Check { instance } => check_command(instance),
        Commands::Generate {
            facilities,
            customers,
            seed,
            coord_max,
            quantity_max,
            output,
        } => {
            let options = GeneratorOptions {
                coord_max,
                quantity_max,
            };
            let mut rng = StdRng::seed_from_u64(seed);
            let instance = Instance::random(facilities, customers, &options, &mut rng)?;
            emit_instance(&instance, output)
        }
        Commands::DemoInstance { output } => emit_instance(&Instance::demo(), output),
    }
}

fn load_instance(path: Option<&PathBuf>) -> Result<Instance> {
    match path {
        Some(path) => read_instance(path),
        None => {
            debug!("using built-in demo instance");
            Ok(Instance::demo())
        }
    }
}

fn solve_command(args: SolveArgs) -> Result<()> {
    let instance = load_instance(args.instance.as_ref())?;
    let model = TransportModel::build(&instance, &args.options)?;
    debug!(distances = %matrix_to_string(model.distances()), "distance matrix");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !args.json {
        write_distance_section(&mut out, model.distances())?;
        write_counts(&mut out, instance.num_facilities(), instance.num_customers())?;
        out.flush()?;
    }

    let report = model.solve(&ClarabelBackend::new(), &args.options)?;
    info!(
        objective = report.objective,
        iterations = report.iterations,
        balance_residual = report.balance_residual,
        "solve finished"
    );

    if args.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        write_flow_section(&mut out, &report.flows)?;
        if !args.quiet_summary {
            write_summary(&mut out, &report)?;
        }
    }
    out.flush()?;

    if let Some(path) = args.output {
        write_report(&path, &report)
            .with_context(|| format!("failed to save report to {:?}", path))?;
    }
    if let Some(path) = args.map {
        save_route_map(&path, &instance, &report)?;
        info!(path = %path.display(), "route map written");
    }
    if let Some(path) = args.residual_map {
        save_residual_map(&path, &instance, &report)?;
        info!(path = %path.display(), "residual map written");
    }
    Ok(())
}

fn check_command(path: PathBuf) -> Result<()> {
    let instance = read_instance(&path)?;
    let tolerance = SolveOptions::<Scalar>::default().balance_tolerance;
    instance
        .validate(tolerance)
        .map_err(TransportError::from)
        .context("instance validation failed")?;
    writeln!(
        io::stdout().lock(),
        "instance ok: {} facilities, {} customers, total supply {}, total demand {}",
        instance.num_facilities(),
        instance.num_customers(),
        instance.total_supply(),
        instance.total_demand()
    )?;
    Ok(())
}

fn emit_instance(instance: &Instance, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            write_instance(&path, instance)?;
            info!(path = %path.display(), "instance written");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, instance)?;
            handle.write_all(b"\n")?;
            handle.flush()?;
        }
    }
    Ok(())
}
