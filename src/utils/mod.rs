pub mod edge_analysis;
pub mod presenter;
pub mod probability;
pub mod time_window;
