#![deny(warnings)]

//! Headless front end: owns the record store, applies command-line filters
//! and prints chart datasets as JSON.

use anyhow::{anyhow, bail, Context, Result};
use bubble_layout::LayoutConfig;
use market_analytics::{
    aggregate_by_year_and_segment, compute_attractiveness, compute_waterfall, compute_yoy_and_cagr,
    filter_records, region_country_breakdown, AggregateOptions, EvaluationMode, FilterCriteria,
    Metric, SegmentField, WaterfallConfig,
};
use market_core::{product_hierarchy, sales_channel_hierarchy, Generator, RecordStore, DEFAULT_SEED};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum View {
    Records,
    Grouped,
    Stacked,
    RegionShare,
    Waterfall,
    Attractiveness,
    Growth,
    Hierarchy,
}

impl FromStr for View {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "records" => View::Records,
            "grouped" => View::Grouped,
            "stacked" => View::Stacked,
            "region-share" => View::RegionShare,
            "waterfall" => View::Waterfall,
            "attractiveness" => View::Attractiveness,
            "growth" => View::Growth,
            "hierarchy" => View::Hierarchy,
            other => bail!("unknown view {other:?}"),
        })
    }
}

/// Comma-separated filter lists as given on the command line.
#[derive(Debug, Default)]
struct RawFilters {
    years: Vec<String>,
    regions: Vec<String>,
    countries: Vec<String>,
    product_types: Vec<String>,
    product_forms: Vec<String>,
    price_ranges: Vec<String>,
    age_groups: Vec<String>,
    professions: Vec<String>,
    sales_channels: Vec<String>,
    distribution_channels: Vec<String>,
}

#[derive(Debug)]
struct Args {
    view: View,
    segment: SegmentField,
    metric: Metric,
    mode: EvaluationMode,
    filters: RawFilters,
    select: Vec<String>,
    layout_config: Option<PathBuf>,
    seed: u32,
    limit: Option<usize>,
    version: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            view: View::Grouped,
            segment: SegmentField::Region,
            metric: Metric::MarketValue,
            mode: EvaluationMode::Value,
            filters: RawFilters::default(),
            select: Vec::new(),
            layout_config: None,
            seed: DEFAULT_SEED,
            limit: None,
            version: false,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_args<I: IntoIterator<Item = String>>(argv: I) -> Result<Args> {
    let mut args = Args::default();
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        if arg == "--version" {
            args.version = true;
            continue;
        }
        let value = it
            .next()
            .ok_or_else(|| anyhow!("missing value for {arg}"))?;
        let f = &mut args.filters;
        match arg.as_str() {
            "--view" => args.view = value.parse()?,
            "--segment" => args.segment = value.parse()?,
            "--metric" => args.metric = value.parse()?,
            "--mode" => args.mode = value.parse()?,
            "--select" => args.select = split_list(&value),
            "--layout-config" => args.layout_config = Some(PathBuf::from(value)),
            "--seed" => args.seed = value.parse().with_context(|| format!("--seed {value}"))?,
            "--limit" => {
                args.limit = Some(value.parse().with_context(|| format!("--limit {value}"))?)
            }
            "--years" => f.years = split_list(&value),
            "--regions" => f.regions = split_list(&value),
            "--countries" => f.countries = split_list(&value),
            "--product-types" => f.product_types = split_list(&value),
            "--product-forms" => f.product_forms = split_list(&value),
            "--price-ranges" => f.price_ranges = split_list(&value),
            "--age-groups" => f.age_groups = split_list(&value),
            "--professions" => f.professions = split_list(&value),
            "--sales-channels" => f.sales_channels = split_list(&value),
            "--distribution-channels" => f.distribution_channels = split_list(&value),
            other => bail!("unknown argument {other}"),
        }
    }
    Ok(args)
}

fn parse_all<T>(labels: &[String]) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    labels
        .iter()
        .map(|label| label.parse::<T>().map_err(anyhow::Error::from))
        .collect()
}

fn build_criteria(raw: &RawFilters) -> Result<FilterCriteria> {
    let years = raw
        .years
        .iter()
        .map(|y| y.parse::<u16>().with_context(|| format!("year {y:?}")))
        .collect::<Result<Vec<_>>>()?;
    let paths = |field: SegmentField, labels: &[String]| {
        labels
            .iter()
            .map(|label| field.parse_path(label).map_err(anyhow::Error::from))
            .collect::<Result<Vec<_>>>()
    };
    Ok(FilterCriteria {
        years,
        regions: parse_all(&raw.regions)?,
        countries: raw.countries.clone(),
        product_types: paths(SegmentField::ProductType, &raw.product_types)?,
        product_forms: parse_all(&raw.product_forms)?,
        price_ranges: parse_all(&raw.price_ranges)?,
        age_groups: parse_all(&raw.age_groups)?,
        professions: parse_all(&raw.professions)?,
        sales_channels: paths(SegmentField::SalesChannel, &raw.sales_channels)?,
        distribution_channels: parse_all(&raw.distribution_channels)?,
    })
}

fn aggregate_options(args: &Args, stacked: bool) -> Result<AggregateOptions> {
    let mut options = AggregateOptions {
        metric: args.metric,
        stacked,
        ..AggregateOptions::default()
    };
    if args.segment.hierarchy().is_some() {
        for label in &args.select {
            options.selection.push(args.segment.parse_path(label)?);
        }
    } else {
        for label in &args.select {
            options.segments.push(args.segment.canonical_key(label)?);
        }
    }
    Ok(options)
}

fn hierarchy_json() -> Value {
    json!({
        "productHierarchy": product_hierarchy(),
        "salesChannelHierarchy": sales_channel_hierarchy(),
    })
}

fn render(args: &Args, store: &RecordStore) -> Result<Value> {
    if args.view == View::Hierarchy {
        return Ok(hierarchy_json());
    }

    let criteria = build_criteria(&args.filters)?;
    let records = filter_records(store.get(), &criteria);
    info!(view = ?args.view, records = records.len(), "rendering view");

    let value = match args.view {
        View::Records => {
            let shown = &records[..args.limit.unwrap_or(records.len()).min(records.len())];
            serde_json::to_value(shown)?
        }
        View::Grouped | View::Stacked => {
            let options = aggregate_options(args, args.view == View::Stacked)?;
            serde_json::to_value(aggregate_by_year_and_segment(&records, args.segment, &options))?
        }
        View::RegionShare => serde_json::to_value(region_country_breakdown(&records, args.mode))?,
        View::Waterfall => {
            serde_json::to_value(compute_waterfall(&records, &WaterfallConfig::default()))?
        }
        View::Attractiveness => {
            let layout = match &args.layout_config {
                Some(path) => LayoutConfig::from_path(path)?,
                None => LayoutConfig::default(),
            };
            serde_json::to_value(compute_attractiveness(
                &records,
                args.segment,
                &args.select,
                &layout,
            )?)?
        }
        View::Growth => serde_json::to_value(compute_yoy_and_cagr(
            &records,
            args.segment,
            &args.select,
            args.metric,
        )?)?,
        View::Hierarchy => hierarchy_json(),
    };
    Ok(value)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!(
            "market-cli {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(seed = args.seed, view = ?args.view, "starting CLI");

    let store = RecordStore::with_generator(Generator::with_seed(args.seed));
    let output = render(&args, &store)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
