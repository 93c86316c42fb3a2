use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use cartflow_core::codec::write_cart_events;
use cartflow_core::config::{PipelineConfig, RAW_BUCKET_VAR};
use cartflow_core::producer::ProducerConfig;
use cartflow_core::stage::{BoundStage, Stage};
use cartflow_core::store::{FsStore, ObjectRef, ObjectStore, StoreLocation};
use cartflow_core::trigger::{drive_stage, ArrivalWatcher};

#[derive(Parser, Debug)]
#[command(name = "cartflow")]
#[command(about = "Abandoned-cart analytics pipeline", long_about = None)]
struct Cli {
    /// Root directory backing the local object store.
    #[arg(long, default_value = "./cartflow-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a synthetic cart-event batch into the raw area.
    Generate {
        #[arg(long, default_value_t = 2000)]
        events: usize,
        #[arg(long, default_value_t = 200)]
        customers: i64,
        #[arg(long, default_value_t = 100)]
        products: i64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Object name the batch is stored under.
        #[arg(long, default_value = "batch.csv")]
        name: String,
    },
    /// Run one stage against a single input object.
    RunStage {
        #[arg(long, value_enum)]
        stage: StageKind,
        /// Input object as `bucket/key`.
        #[arg(long)]
        input: String,
    },
    /// Watch the pipeline areas and run stages on new arrivals.
    Watch {
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StageKind {
    ProductRollup,
    CustomerRanking,
}

impl StageKind {
    fn stage(self) -> Stage {
        match self {
            StageKind::ProductRollup => Stage::product_rollup(),
            StageKind::CustomerRanking => Stage::customer_ranking(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = pipeline_config()?;
    let store = FsStore::new(&cli.data_dir)?;

    match cli.command {
        Commands::Generate {
            events,
            customers,
            products,
            seed,
            name,
        } => {
            let producer = ProducerConfig {
                events,
                customers,
                products,
                seed,
                ..ProducerConfig::default()
            };
            let batch = producer.generate();
            let bytes = write_cart_events(&batch)?;
            let location = config.raw.resolve(&name);
            let size = bytes.len();
            store.put(&location, bytes)?;
            println!("generated {} events into {} ({} bytes)", batch.len(), location, size);
        }
        Commands::RunStage { stage, input } => {
            let input = parse_object_ref(&input)?;
            let output = match stage {
                StageKind::ProductRollup => config.curated.resolve(input.name()),
                StageKind::CustomerRanking => config.promoted.resolve(input.name()),
            };
            let report = stage.stage().run(&store, &input, &output)?;
            println!("{report}");
        }
        Commands::Watch { poll_ms } => {
            let store: Arc<dyn ObjectStore> = Arc::new(store);
            let poll = Duration::from_millis(poll_ms);

            let (raw_rx, _raw_watcher) =
                ArrivalWatcher::spawn(Arc::clone(&store), config.raw.clone(), poll);
            let (curated_rx, _curated_watcher) =
                ArrivalWatcher::spawn(Arc::clone(&store), config.curated.clone(), poll);

            let rollup = BoundStage::new(
                Stage::product_rollup(),
                Arc::clone(&store),
                config.product_rollup(),
            );
            let ranking = BoundStage::new(
                Stage::customer_ranking(),
                Arc::clone(&store),
                config.customer_ranking(),
            );

            println!(
                "watching {} and {} (poll every {}ms, Ctrl-C to stop)",
                config.raw, config.curated, poll_ms
            );
            let rollup_loop = thread::spawn(move || drive_stage(&rollup, &raw_rx));
            let ranking_loop = thread::spawn(move || drive_stage(&ranking, &curated_rx));
            let _ = rollup_loop.join();
            let _ = ranking_loop.join();
        }
    }
    Ok(())
}

/// Use the `CARTFLOW_*` environment when it is set, else the default
/// raw/curated/promoted bucket layout.
fn pipeline_config() -> anyhow::Result<PipelineConfig> {
    if std::env::var_os(RAW_BUCKET_VAR).is_some() {
        Ok(PipelineConfig::from_env()?)
    } else {
        Ok(PipelineConfig::new(
            StoreLocation::new("raw", ""),
            StoreLocation::new("curated", ""),
            StoreLocation::new("promoted", ""),
        )?)
    }
}

fn parse_object_ref(input: &str) -> anyhow::Result<ObjectRef> {
    let (bucket, key) = input
        .split_once('/')
        .with_context(|| format!("expected `bucket/key`, got `{input}`"))?;
    Ok(ObjectRef::new(bucket, key))
}
