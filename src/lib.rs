pub mod app;
pub mod avatar;
pub mod dataset;
pub mod export;
pub mod graph;
pub mod pipeline;
mod util;
