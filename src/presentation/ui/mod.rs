pub mod display;

pub use display::{should_use_color, DisplayHelper};
