//! Feature Summary Example
//!
//! This example extracts every frame-level feature from a few synthetic
//! signals and collapses them into fixed-length summaries.

use audiofeatures::feature::statistical;
use audiofeatures::pipeline::{ExtractorConfig, FeatureAggregator, FeatureExtractor};
use audiofeatures::preprocess;
use audiofeatures::synth;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> audiofeatures::Result<()> {
    env_logger::init();
    info!("Feature Summary Example");

    let sr = 22050;
    let duration = 2.0;
    let mut rng = StdRng::seed_from_u64(7);

    let signals = [
        ("tone", synth::tone(440.0, sr, duration)),
        ("chirp", synth::chirp(110.0, 3520.0, sr, duration)),
        ("noise", synth::white_noise((sr as f32 * duration) as usize, 0.5, &mut rng)),
    ];

    let extractor = FeatureExtractor::new(ExtractorConfig::new(sr))?;
    let aggregator = FeatureAggregator::new();

    for (label, signal) in &signals {
        info!("\n{label}: {} samples", signal.len());
        let signal = preprocess::peak_normalize(signal, preprocess::DEFAULT_TARGET_PEAK);

        let features = extractor.extract_all(&signal)?;
        for (name, matrix) in &features {
            info!("  {name}: shape {:?}", matrix.shape());
        }

        let summary = aggregator.aggregate(&features, &["mean", "std"])?;
        info!("  spectral_centroid mean: {:.1} Hz", summary["spectral_centroid_mean"][0]);
        info!("  zcr mean: {:.4}", summary["zcr_mean"][0]);
        info!("  rms std: {:.4}", summary["rms_std"][0]);

        let ratio = statistical::harmonic_percussive_ratio(
            &signal,
            sr,
            statistical::DEFAULT_HPR_MARGIN,
            31,
        )?;
        info!("  harmonic/percussive ratio: {ratio:.3}");
    }

    // Grouped default statistics
    info!("\nDefault statistics of the chirp");
    let features = extractor.extract(&signals[1].1, &["mfcc", "chroma"])?;
    for (feature, stats) in aggregator.aggregate_default(&features) {
        for (method, values) in stats {
            info!("  {feature}/{method}: {} values, first {:.3}", values.len(), values[0]);
        }
    }

    Ok(())
}
