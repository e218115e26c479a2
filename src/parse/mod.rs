/// `Key=value` run description.
pub mod input;
/// Csv list of bonds.
pub mod geometry;
