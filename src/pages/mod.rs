//! Page models. Each request builds its own page state; nothing here is shared
//! between requests.

pub mod analytics;
pub mod batch;
pub mod home;
pub mod predict;
pub mod results;
