pub mod discovery;
pub mod sitemap;

pub use discovery::*;
pub use sitemap::*;
