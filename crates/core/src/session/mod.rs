//! Query session: filter state, dispatch and result publication.

mod query_session;
mod state;

pub use query_session::{Latency, QuerySession, SessionConfig};
pub use state::{QueryStatus, SessionState};
