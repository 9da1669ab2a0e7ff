//! In-memory repository implementations, used by the test suite and handy
//! for local development without a database.

mod repositories;

pub use repositories::{
    InMemoryActionLogRepository, InMemoryCreditLedgerRepository, InMemoryInviteTokenRepository,
};
