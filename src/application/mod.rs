// Application layer - sessions, the assistant seam and orchestration of
// the ledger engine with the snapshot store.

mod assistant;
pub mod error;
mod language;
mod service;
mod session;

pub use assistant::*;
pub use error::*;
pub use language::*;
pub use service::*;
pub use session::*;
