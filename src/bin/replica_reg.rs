use std::path::Path;
use std::process::ExitCode;

use camino::Utf8Path;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use replica_registrar::attacher::DatasetAttacher;
use replica_registrar::catalog::RestCatalogConnector;
use replica_registrar::config::{ConfigLoader, RegisterConfig};
use replica_registrar::domain::{ProducerKind, SourceRef};
use replica_registrar::error::RegError;
use replica_registrar::identifier::IdentifierBuilder;
use replica_registrar::manifest;
use replica_registrar::orchestrator::RegistrationOrchestrator;
use replica_registrar::output::{JsonOutput, RegisterSummary};
use replica_registrar::submitter::ReplicaSubmitter;

#[derive(Parser)]
#[command(name = "replica-reg")]
#[command(about = "Register local files as catalog replicas and attach them to datasets")]
#[command(version, author)]
struct Cli {
    #[arg(short = 'v', long, global = true, help = "set log level to info")]
    verbose: bool,

    #[arg(
        short = 'D',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "set log level to debug"
    )]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Register files as replicas and attach them to a dataset")]
    Register(RegisterArgs),
    #[command(about = "Build and print the identifier record for a file, offline")]
    Inspect(InspectArgs),
}

#[derive(Args)]
struct RegisterArgs {
    #[command(subcommand)]
    producer: ProducerCommand,
}

#[derive(Subcommand)]
enum ProducerCommand {
    #[command(about = "Register pipeline data products")]
    DataProducts(BatchArgs),
    #[command(about = "Register raw files")]
    Raws(BatchArgs),
    #[command(about = "Register zip archives")]
    Zips(BatchArgs),
    #[command(about = "Register dimension files")]
    Dimensions(BatchArgs),
}

#[derive(Args, Clone)]
struct BatchArgs {
    paths: Vec<String>,

    #[arg(short = 'd', long, help = "dataset to register files to")]
    dataset: String,

    #[arg(short = 'm', long, help = "JSON manifest of files to register")]
    manifest: Option<String>,

    #[arg(short = 'C', long, help = "configuration file used for registration")]
    config: Option<String>,

    #[arg(
        short = 's',
        long,
        default_value_t = 30,
        help = "number of replica requests to make at once"
    )]
    chunk_size: usize,
}

#[derive(Args)]
struct InspectArgs {
    path: String,

    #[arg(short = 'C', long, help = "configuration file used for registration")]
    config: Option<String>,

    #[arg(short = 't', long, value_enum, default_value = "data-product")]
    producer_type: ProducerKind,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(reg) = report.downcast_ref::<RegError>() {
            return ExitCode::from(map_exit_code(reg));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &RegError) -> u8 {
    match error {
        RegError::MissingConfig
        | RegError::ConfigRead(_)
        | RegError::ConfigParse(_)
        | RegError::ManifestRead(_)
        | RegError::ManifestParse(_)
        | RegError::PathOutsideRoot(_) => 2,
        RegError::CatalogTransient(_)
        | RegError::CatalogStatus { .. }
        | RegError::RetriesExhausted { .. }
        | RegError::DatasetMissing(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        Commands::Register(args) => run_register(args),
        Commands::Inspect(args) => run_inspect(args),
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_register(args: RegisterArgs) -> miette::Result<()> {
    let (producer, batch) = match args.producer {
        ProducerCommand::DataProducts(batch) => (ProducerKind::DataProduct, batch),
        ProducerCommand::Raws(batch) => (ProducerKind::RawFile, batch),
        ProducerCommand::Zips(batch) => (ProducerKind::ZipFile, batch),
        ProducerCommand::Dimensions(batch) => (ProducerKind::DimensionFile, batch),
    };

    let config = ConfigLoader::resolve(batch.config.as_deref()).into_diagnostic()?;

    let mut refs: Vec<SourceRef> = match &batch.manifest {
        Some(path) => manifest::load(Path::new(path)).into_diagnostic()?,
        None => Vec::new(),
    };
    refs.extend(manifest::from_paths(&batch.paths));

    let mut orchestrator = build_orchestrator(&config, producer).into_diagnostic()?;

    let mut files_registered = 0;
    let mut batches = 0;
    for chunk in refs.chunks(batch.chunk_size.max(1)) {
        files_registered += orchestrator
            .register(&batch.dataset, chunk)
            .into_diagnostic()?;
        batches += 1;
    }

    let mut datasets: Vec<String> = refs.iter().filter_map(|r| r.dataset.clone()).collect();
    datasets.push(batch.dataset.clone());
    datasets.sort();
    datasets.dedup();

    JsonOutput::print_summary(&RegisterSummary {
        files_registered,
        batches,
        datasets,
    })
    .into_diagnostic()?;
    Ok(())
}

fn run_inspect(args: InspectArgs) -> miette::Result<()> {
    let config = ConfigLoader::resolve(args.config.as_deref()).into_diagnostic()?;
    let builder = IdentifierBuilder::from_config(&config, args.producer_type);
    let identifier = builder
        .build(Utf8Path::new(&args.path), None)
        .into_diagnostic()?;
    JsonOutput::print_identifier(&identifier).into_diagnostic()?;
    Ok(())
}

fn build_orchestrator(
    config: &RegisterConfig,
    producer: ProducerKind,
) -> Result<RegistrationOrchestrator<RestCatalogConnector>, RegError> {
    let connector = RestCatalogConnector::new(&config.catalog_url);
    let builder = IdentifierBuilder::from_config(config, producer);
    let submitter = ReplicaSubmitter::new(connector.clone(), &config.location, config.retry)?;
    let attacher = DatasetAttacher::new(connector, &config.scope, &config.location, config.retry)?;
    Ok(RegistrationOrchestrator::new(builder, submitter, attacher))
}
