//! Completion service adapters.

mod mock_completion;
mod openai_completion;

pub use mock_completion::{MockCompletionService, MockReply};
pub use openai_completion::{OpenAiCompletionService, OpenAiConfig};
