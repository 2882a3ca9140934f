//! Browse a server-held catalog of specs through filters, search, sorting
//! and incremental pagination, with the view kept in a shareable query string.

pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod lookups;
pub mod observe;
pub mod pagination;
pub mod query;
pub mod session;
pub mod specs;
pub mod url_codec;
pub mod url_state;
pub mod view_state;

pub use error::FetchError;
pub use filter::{FilterCriteria, OrderBy, OrderedSet};
pub use session::SpecsSession;
pub use url_codec::UrlCodec;
pub use url_state::{MemoryNavigation, NavigationPort, UrlStateStore};
pub use view_state::{ViewState, ViewStatePatch};
