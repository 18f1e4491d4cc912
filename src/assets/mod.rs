/// Font candidates, fallback chain and line measurement.
pub mod fonts;
