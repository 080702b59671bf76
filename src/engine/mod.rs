//! Core engine: the per-match session state machine and the poll-cycle
//! driver around it.

pub mod session;
pub mod accountant;
pub mod executor;
pub mod trader;

pub use accountant::{Accountant, Settlement};
pub use executor::Executor;
pub use session::{BetTicket, Decision, Session, Step};
pub use trader::{CycleOutcome, Trader};
