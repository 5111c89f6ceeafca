pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;
pub mod urls;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{ActivityCollectionBuilder, DiscoveryError, SitemapTasks};

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

// Export store types
pub use store::{IndexStore, MemoryStore, PostgresStore};

// Export URL building types
pub use urls::{ApiPath, ApiUrls};
