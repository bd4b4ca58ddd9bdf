use approx::assert_relative_eq;
use audiofeatures::Error;
use audiofeatures::pipeline::{
    AggregationMethod, ExtractorConfig, FeatureAggregator, FeatureExtractor, FeatureKind,
};
use audiofeatures::synth;
use std::path::Path;

fn extractor() -> FeatureExtractor {
    FeatureExtractor::new(ExtractorConfig::new(22050)).unwrap()
}

#[test]
fn extract_all_yields_canonical_matrices() {
    let y = synth::chirp(200.0, 4000.0, 22050, 2.0);
    let features = extractor().extract_all(&y).unwrap();
    assert_eq!(features.len(), FeatureKind::ALL.len());

    let n_frames = 1 + y.len() / 512;
    for name in ["mfcc", "spectral_centroid", "chroma", "tonnetz", "tempogram", "rms"] {
        assert_eq!(features[name].nrows(), n_frames, "{name}");
    }
    assert_eq!(features["mfcc"].ncols(), 13);
    assert_eq!(features["chroma"].ncols(), 12);
    assert_eq!(features["tonnetz"].ncols(), 6);
    assert_eq!(features["tempogram"].ncols(), 384);
    assert_eq!(features["zcr"].ncols(), 1);
    for (name, m) in &features {
        assert!(m.iter().all(|v| v.is_finite()), "{name}");
    }
}

#[test]
fn unknown_feature_fails_before_extraction() {
    let y = synth::tone(440.0, 22050, 0.5);
    let err = extractor().extract(&y, &["mfcc", "loudness"]).unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }));
    assert!(err.to_string().contains("loudness"));
}

#[test]
fn invalid_audio_is_rejected() {
    assert!(extractor().extract(&[], &["rms"]).is_err());
    assert!(extractor().extract(&[0.0, f32::NAN, 0.0], &["rms"]).is_err());
}

#[test]
fn aggregated_mean_is_column_mean() {
    let y = synth::chirp(300.0, 3000.0, 22050, 1.0);
    let features = extractor().extract(&y, &["mfcc", "spectral_rolloff"]).unwrap();
    let summary = FeatureAggregator::new()
        .aggregate(&features, &["mean", "max"])
        .unwrap();
    assert_eq!(summary.len(), 4);

    let mfcc = &features["mfcc"];
    let mean = &summary["mfcc_mean"];
    assert_eq!(mean.len(), 13);
    for (k, col) in mfcc.columns().into_iter().enumerate() {
        let expected = col.iter().sum::<f32>() / col.len() as f32;
        assert_relative_eq!(mean[k], expected, max_relative = 1e-4, epsilon = 1e-3);
    }
    let rolloff_max = features["spectral_rolloff"].iter().cloned().fold(f32::MIN, f32::max);
    assert_eq!(summary["spectral_rolloff_max"][0], rolloff_max);
}

#[test]
fn default_aggregation_groups_six_statistics() {
    let y = synth::tone(440.0, 22050, 1.0);
    let features = extractor().extract(&y, &["zcr", "chroma"]).unwrap();
    let grouped = FeatureAggregator::new().aggregate_default(&features);
    assert_eq!(grouped.len(), 2);
    for stats in grouped.values() {
        let names: Vec<&str> = stats.keys().map(String::as_str).collect();
        let mut expected: Vec<&str> = AggregationMethod::DEFAULT.iter().map(|m| m.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(names, expected);
    }
    assert_eq!(grouped["chroma"]["mean"].len(), 12);
}

#[test]
fn unknown_method_is_rejected() {
    let features = extractor().extract(&synth::tone(440.0, 22050, 0.5), &["rms"]).unwrap();
    assert!(FeatureAggregator::new().aggregate(&features, &["mean", "mode"]).is_err());
    assert!("quantile_75".parse::<AggregationMethod>().is_ok());
}

#[test]
fn extract_from_source_uses_configured_rate() {
    let source = |path: &Path, sr: u32| -> audiofeatures::Result<Vec<f32>> {
        assert_eq!(path, Path::new("clip.wav"));
        Ok(synth::tone(440.0, sr, 0.5))
    };
    let features = FeatureExtractor::new(ExtractorConfig::new(16000))
        .unwrap()
        .extract_from_source(&source, Path::new("clip.wav"), &["rms"])
        .unwrap();
    assert_eq!(features["rms"].nrows(), 1 + 8000 / 512);
}

#[test]
fn source_failures_propagate() {
    let failing = |_: &Path, _: u32| -> audiofeatures::Result<Vec<f32>> {
        Err(Error::Source("no such file".into()))
    };
    let err = extractor()
        .extract_from_source(&failing, Path::new("missing.wav"), &["rms"])
        .unwrap_err();
    assert!(matches!(err, Error::Source(_)));
}
