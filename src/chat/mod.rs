pub mod conversation;
pub mod engine;
pub mod message;
pub mod selection;
pub mod store;
pub mod title;

pub use conversation::{Conversation, ConversationId};
pub use engine::{ChatEngine, SendOutcome};
pub use message::{Message, Sender};
pub use selection::ProviderSelection;
pub use store::ConversationStore;
