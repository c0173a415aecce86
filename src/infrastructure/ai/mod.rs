pub mod client;
pub mod drafter;

pub use client::AnthropicChatClient;
pub use drafter::ChatDrafter;
