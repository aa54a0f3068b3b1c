//! Text generation adapters.

mod anthropic;
mod mock;

pub use anthropic::{AnthropicConfig, AnthropicGenerator};
pub use mock::MockTextGenerator;
