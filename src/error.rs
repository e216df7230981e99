//! Error taxonomy for the overlay engine
//!
//! None of these are fatal to the map: persistence and widget failures fail
//! open, projection failures reject the single call.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// Category has no registry or radius entry (e.g. asking `tfr` for a radius).
    UnknownCategory(String),
    /// Widget reported a meters-per-point scale that is zero, negative or not finite.
    InvalidProjectionScale(f64),
    /// Radius edits must be positive and finite.
    InvalidRadius(f64),
    /// Backing preference storage could not be read or written.
    PreferencePersistenceUnavailable(String),
    /// Style not loaded yet, source missing, or any other widget-side refusal.
    MapWidgetPreconditionNotMet(String),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::UnknownCategory(name) => write!(f, "unknown hazard category: {name}"),
            OverlayError::InvalidProjectionScale(scale) => {
                write!(f, "invalid projection scale: {scale} meters per point")
            }
            OverlayError::InvalidRadius(meters) => write!(f, "invalid radius: {meters} m"),
            OverlayError::PreferencePersistenceUnavailable(reason) => {
                write!(f, "preference storage unavailable: {reason}")
            }
            OverlayError::MapWidgetPreconditionNotMet(reason) => {
                write!(f, "map widget not ready: {reason}")
            }
        }
    }
}

impl std::error::Error for OverlayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_offending_value() {
        let err = OverlayError::InvalidProjectionScale(0.0);
        assert_eq!(err.to_string(), "invalid projection scale: 0 meters per point");

        let err = OverlayError::UnknownCategory("flying_sites_260".into());
        assert!(err.to_string().contains("flying_sites_260"));
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = OverlayError::MapWidgetPreconditionNotMet("no style".into()).into();
        assert!(err.to_string().contains("no style"));
    }
}
