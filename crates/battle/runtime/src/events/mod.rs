//! Topic-based event bus decoupling simulation from presentation.

mod bus;
mod types;

pub use bus::{EventBus, SubscriptionId};
pub use types::{BattleEvent, Topic};
