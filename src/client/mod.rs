pub mod discogs;
pub mod pagination;
pub mod transport;

pub use discogs::DiscogsClient;
pub use pagination::PageWalker;
pub use transport::{HttpTransport, Transport, UpstreamResponse};
