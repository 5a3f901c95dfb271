//! Bike-share station feed.
//!
//! Fetches the current station list from the routing API and shares each
//! fetch between all consumers. The feed can be consumed once
//! ([`StationFeed::get_stations`]) or driven by the refresh trigger
//! ([`StationFeed::run`]), in which case every settled trigger value
//! invalidates the cache and publishes a fresh snapshot.
//!
//! # Example
//!
//! ```ignore
//! use bikemap::station::{ReqwestClient, StationFeed};
//!
//! let client = Arc::new(ReqwestClient::new()?);
//! let feed = StationFeed::with_default_url(client);
//!
//! let snapshot = feed.get_stations().await?;
//! println!("{} stations", snapshot.len());
//! ```

mod error;
mod feed;
pub mod http;
mod model;

pub use error::FeedError;
pub use feed::{FeedResult, SharedFetch, StationFeed, DEFAULT_STATIONS_URL};
pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use model::{Station, StationSnapshot, StationsResponse};
