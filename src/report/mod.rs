//! Presentation of a finished analysis: chart series and the HTML page.

pub mod charts;
pub mod html;
