//! Map tile provider abstraction
//!
//! Resolves a map type to a base-layer URL, downloads it together with the
//! OpenSeaMap seamark overlay, and composites the two into one tile.
//!
//! # Example
//!
//! ```ignore
//! use mapconverter::provider::{
//!     AsyncReqwestClient, FetchedTile, MapType, SourceCatalog, TileSource,
//! };
//!
//! let source = TileSource::new(AsyncReqwestClient::new()?, SourceCatalog::new());
//! match source.fetch(&coord, MapType::OpenStreetMap).await {
//!     FetchedTile::Fresh(tile) => cache.put(&key, tile.encode_png()?).await,
//!     FetchedTile::Placeholder(_) => {} // never cached
//! }
//! ```

mod catalog;
mod http;
mod source;
mod types;

pub use catalog::{render_template, SourceCatalog, OVERLAY_TEMPLATE};
pub use http::{user_agent_for, AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT};
pub use source::{FetchedTile, TileSource};
pub use types::{MapType, ProviderError};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
