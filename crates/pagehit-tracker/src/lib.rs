pub mod logging;
pub mod middleware;
pub mod tracker;

pub use middleware::track_page_views;
pub use tracker::Tracker;
