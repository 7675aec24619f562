//! Deskmate runtime: turn execution and the assistant loop.
//!
//! Control flow is strictly sequential. A loop iteration optionally waits for
//! a wake word, runs one turn, then sleeps the configured interval. At most
//! one turn is ever in flight.

pub mod assistant_loop;
pub mod turn;

pub use assistant_loop::{AssistantLoop, StopSignal, TurnErrorPolicy};
pub use turn::TurnExecutor;
