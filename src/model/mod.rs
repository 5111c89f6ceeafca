pub mod activity;
pub mod change;
pub mod common;
pub mod monitoring;
pub mod sitemap;

pub use activity::*;
pub use change::*;
pub use common::*;
pub use monitoring::*;
pub use sitemap::*;
