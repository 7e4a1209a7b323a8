mod customer;
mod filter;
mod insights;
mod ledger;
mod money;
mod snapshot;
mod transaction;

pub use customer::*;
pub use filter::*;
pub use insights::*;
pub use ledger::*;
pub use money::*;
pub use snapshot::*;
pub use transaction::*;
