/// Greedy word wrapping against measured line widths.
pub mod wrap;
