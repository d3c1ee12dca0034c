pub mod analyzers;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod narrative;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod services;
pub mod window;
