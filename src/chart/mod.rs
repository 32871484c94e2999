//! Text charts for the terminal dashboard.

pub mod bar;
pub mod line;
pub mod scalable;

pub use bar::BarChart;
pub use line::{LineChart, Series};
