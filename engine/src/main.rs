// Engine main entry point: loads candles from CSV and runs a multi-timeframe indicator analysis
use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use engine::config::EngineSettings;
use engine::data::csv_parser::BrazilianCsvParser;
use engine::data::MarketDataStore;
use engine::models::{IndicatorKind, TimeFrame};
use engine::services::IndicatorService;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Semicolon-separated candle export (Ativo;Data;Hora;Abertura;...)
    #[arg(long, required_unless_present = "list")]
    csv: Option<PathBuf>,

    /// Symbol to select from the file
    #[arg(short, long, default_value = "WINFUT")]
    symbol: String,

    /// Indicator to calculate (sma, ema, rsi, bb, stoch, macd, wr)
    #[arg(short, long, default_value = "rsi")]
    indicator: IndicatorKind,

    /// Indicator period; defaults to the configured period for the indicator
    #[arg(short, long)]
    period: Option<usize>,

    /// Timeframe of the rows in the file
    #[arg(long, default_value = "1m")]
    source_timeframe: TimeFrame,

    /// Target timeframes (comma-separated)
    #[arg(short, long, value_delimiter = ',', default_value = "5m,15m,1h")]
    timeframes: Vec<TimeFrame>,

    /// JSON settings file; the bundled defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the supported indicators and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => EngineSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from '{}'", path.display()))?,
        None => EngineSettings::load_default()?,
    };

    let store = MarketDataStore::shared();
    let service = IndicatorService::new(Arc::new(store.clone()), &settings)?;

    if args.list {
        let descriptors = service
            .list_supported_indicators()
            .into_iter()
            .map(|kind| service.describe_indicator(kind))
            .collect::<Result<Vec<_>, _>>()?;
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    let csv_path = args.csv.as_ref().context("--csv is required unless --list is given")?;
    let candles = BrazilianCsvParser::load_candles_from_csv(csv_path, &args.symbol)?;
    store.write().await.add_candles(&args.symbol, args.source_timeframe, candles)?;
    let candles = store
        .read()
        .await
        .get_candles(&args.symbol, args.source_timeframe, None, None)
        .unwrap_or_default();

    let period = match args.period {
        Some(period) => period,
        None => service.describe_indicator(args.indicator)?.default_period,
    };
    info!(symbol = %args.symbol, indicator = %args.indicator, period, candles = candles.len(), "Running multi-timeframe analysis");

    let (values, alignment) = service
        .calculate_multi_timeframe_indicators(&args.symbol, candles, args.source_timeframe, &args.timeframes, args.indicator, period)
        .await?;

    let report = json!({
        "symbol": args.symbol,
        "indicator": args.indicator.short_name(),
        "period": period,
        "values": values,
        "alignment": alignment,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
