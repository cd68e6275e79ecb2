pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::chat::ChatEngine;
pub use dispatcher::{CommandDispatcher, create_command_registry};
use std::sync::Arc;

pub struct ChatState {
    pub engine: Arc<ChatEngine>,
    pub should_continue: bool,
}

impl ChatState {
    pub fn new(engine: Arc<ChatEngine>) -> Self {
        Self {
            engine,
            should_continue: true,
        }
    }
}
