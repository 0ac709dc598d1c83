//! Custom assertions for featurekit testing.

use featurekit_core::{FeatureSet, Format, Resolution, Verbosity};

/// Assert that every query on `features` yields its default.
///
/// # Panics
///
/// Panics if any query differs from the empty-set result.
#[track_caller]
pub fn assert_defaults(features: &FeatureSet) {
    assert_eq!(
        features.resolution(),
        Resolution::default(),
        "Expected default resolution for {features:?}"
    );
    assert_eq!(features.format(), Format::Markdown);
    assert_eq!(features.verbosity(), Verbosity::Standard);
}

/// Assert the resolved format and verbosity.
///
/// # Panics
///
/// Panics if either differs.
#[track_caller]
pub fn assert_resolves(features: &FeatureSet, format: Format, verbosity: Verbosity) {
    assert_eq!(
        (features.format(), features.verbosity()),
        (format, verbosity),
        "Unexpected resolution for {features:?}"
    );
}
