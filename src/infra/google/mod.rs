//! Google Search Console and Analytics 4 reporting clients.
//!
//! Both APIs take an OAuth bearer token, obtained by [`token::access_token_from_env`].

pub mod analytics;
pub mod search_console;
pub mod token;

pub use analytics::AnalyticsClient;
pub use search_console::SearchConsoleClient;
