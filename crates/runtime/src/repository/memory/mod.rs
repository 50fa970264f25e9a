//! In-memory repository implementations for testing and development.

mod battle;
mod character;
mod ledger;
mod log;
mod session;

pub use battle::InMemoryBattleRepository;
pub use character::InMemoryCharacterRepository;
pub use ledger::InMemoryRewardLedger;
pub use log::InMemoryCombatLogRepository;
pub use session::InMemorySessionRepository;
