use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use graphonlab::{
    dataset_file_name, AugmentConfig, DatasetBalancer, GraphSampler, Graphon,
    HistogramEstimator, SampleConfig, SizeSpec,
};

const OUTPUT_DIR: &str = "graphons_dir";
const SIZE_FLOOR: usize = 100;
const SIZE_LIMIT: usize = 1000;

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

struct RunConfig {
    num_graphons: usize,
    graphs_per_graphon: usize,
    n0: usize,
    seed: u64,
}

fn parse_args() -> Result<RunConfig> {
    let mut args = env::args().skip(1);
    let num_graphons = parse_or(args.next(), 3, "graphon count")?;
    let graphs_per_graphon = parse_or(args.next(), 20, "graphs per graphon")?;
    let n0 = parse_or(args.next(), 30, "histogram resolution")?;
    let seed = parse_or(args.next(), 42, "seed")?;
    if let Some(extra) = args.next() {
        anyhow::bail!("Unexpected extra argument: {extra}");
    }
    Ok(RunConfig {
        num_graphons,
        graphs_per_graphon,
        n0,
        seed,
    })
}

fn parse_or<T: std::str::FromStr>(arg: Option<String>, default: T, name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match arg {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("parse {} from '{}'", name, raw)),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    init_logging();
    let config = parse_args()?;

    let graphons = (1..=config.num_graphons)
        .map(Graphon::from_index)
        .collect::<Result<Vec<_>>>()?;
    info!(
        "simulating {} graphs for each of {} graphons",
        config.graphs_per_graphon,
        graphons.len()
    );

    let dataset = GraphSampler::data_simulation(
        &graphons,
        config.graphs_per_graphon,
        SizeSpec::Range {
            floor: SIZE_FLOOR,
            limit: SIZE_LIMIT,
        },
        &SampleConfig::seeded(config.seed),
    )?;

    let artifact = Path::new(OUTPUT_DIR).join(dataset_file_name(
        graphons.len(),
        config.graphs_per_graphon,
    ));
    dataset.save(&artifact)?;
    info!("saved {} graphs to {:?}", dataset.len(), artifact);

    let augmented = DatasetBalancer::augment_dataset(
        &dataset,
        &AugmentConfig {
            extra_per_class: Some(10),
            min_size: config.n0,
            seed: Some(config.seed),
            ..AugmentConfig::default()
        },
    )?;
    info!("augmented dataset holds {} graphs", augmented.len());

    let histograms = HistogramEstimator::histogram_embeddings(augmented.graphs(), config.n0)?;
    let embeddings: Vec<Vec<f64>> = histograms
        .iter()
        .map(HistogramEstimator::flatten_embedding)
        .collect();
    info!(
        "produced {} embeddings of length {}",
        embeddings.len(),
        config.n0 * config.n0
    );

    Ok(())
}
