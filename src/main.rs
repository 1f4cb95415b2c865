use awce::components::{Preset, Primitive};
use awce::core::clock::SystemClock;
use awce::logging::{init_logging, TracingLogSink};
use awce::models::{AnalysisResult, MarketRegime};
use awce::services::scorer::{FixedRegime, FixedScore, ScorerSet};
use awce::signals::engine::{AdaptiveWeightedConfidenceEngine, EngineSettings};
use awce::signals::scoring::confidence_label;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_logging();

    let symbol = "BTC-PERP";

    let bullish = ScorerSet::new()
        .with(Primitive::TrendStrength, FixedScore(82.0))
        .with(Primitive::StructureBreak, FixedScore(76.0))
        .with(Primitive::OrderBlock, FixedScore(68.0))
        .with(Primitive::Liquidity, FixedScore(64.0))
        .with(Primitive::FairValueGap, FixedScore(55.0))
        .with(Primitive::Volume, FixedScore(71.0));
    let result1 = run(symbol, Preset::MarketStructure, bullish, MarketRegime::Trending)?;
    println!("Analysis 1 (trending, market structure):");
    print_analysis(&result1);
    println!();

    let bearish = ScorerSet::new()
        .with(Primitive::MultiTimeframe, FixedScore(22.0))
        .with(Primitive::Momentum, FixedScore(30.0))
        .with(Primitive::OrderFlow, FixedScore(18.0))
        .with(Primitive::Divergence, FixedScore(35.0))
        .with(Primitive::Volatility, FixedScore(60.0));
    let result2 = run(symbol, Preset::TradeConfluence, bearish, MarketRegime::HighVolatility)?;
    println!("Analysis 2 (high volatility, trade confluence):");
    print_analysis(&result2);
    println!();

    let mixed = ScorerSet::new()
        .with(Primitive::TrendStrength, FixedScore(90.0))
        .with(Primitive::StructureBreak, FixedScore(10.0));
    let result3 = run(symbol, Preset::MarketStructure, mixed, MarketRegime::Ranging)?;
    println!("Analysis 3 (ranging, partial scorers):");
    print_analysis(&result3);

    Ok(())
}

fn run(
    symbol: &str,
    preset: Preset,
    scorers: ScorerSet,
    regime: MarketRegime,
) -> Result<AnalysisResult, Box<dyn std::error::Error>> {
    let mut engine = AdaptiveWeightedConfidenceEngine::new(EngineSettings::default())
        .with_clock(Arc::new(SystemClock))
        .with_regime_detector(Arc::new(FixedRegime(regime)));
    for descriptor in preset.descriptors() {
        engine.register_descriptor(descriptor);
    }
    engine.initialize(
        Some(Arc::new(TracingLogSink)),
        Some(Arc::new(scorers)),
        symbol,
        60.0,
    )?;
    Ok(engine.analyze(symbol, false))
}

fn print_analysis(result: &AnalysisResult) {
    println!("  Symbol: {}", result.symbol);
    println!("  Regime: {}", result.regime);
    println!(
        "  Confidence: {:.2}% ({})",
        result.total_confidence,
        confidence_label(result.total_confidence)
    );
    println!("  Bias: {:?} (strength {:.1})", result.bias, result.bias_strength);
    println!("  Signal: {:?}", result.signal);
    println!(
        "  Mass: bullish {:.1} / bearish {:.1}",
        result.bullish_mass, result.bearish_mass
    );
    println!("  Confluent: {}", result.is_confluent);
    println!("  Divergence: {:.1}", result.divergence_score);
    println!("  Action: {}", result.recommended_action);
    println!("  Components:");
    for (i, component) in result.components.iter().enumerate() {
        println!(
            "    {}. {} raw {:.1} -> {:.1} (weight: {:.2}%{})",
            i + 1,
            component.name,
            component.raw_score,
            component.normalized_score,
            component.adjusted_weight,
            if component.substituted { ", neutral" } else { "" }
        );
    }
}
