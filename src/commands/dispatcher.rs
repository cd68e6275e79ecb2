use super::{
    ChatState,
    handler::{
        ChatsCommand, ExportCommand, HelpCommand, ModelCommand, ModelsCommand, NewCommand,
        OpenCommand, QuitCommand, RenameCommand, ShowCommand, TuneCommand,
    },
    registry::CommandRegistry,
};
use crate::core::error::ChatError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        state: &mut ChatState,
    ) -> Result<Option<String>, ChatError> {
        self.registry.execute(command, args, state)
    }

    /// Parses `/name arg...` and runs it. `None` when `input` is not a command.
    pub fn execute_line(
        &self,
        input: &str,
        state: &mut ChatState,
    ) -> Option<Result<Option<String>, ChatError>> {
        let rest = input.strip_prefix('/')?;
        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some((command, args)) = parts.split_first() else {
            return Some(Err(ChatError::Input("Missing command name".to_string())));
        };
        Some(self.execute(command, args, state))
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("quit", QuitCommand);
    registry.register("help", HelpCommand);
    registry.register("new", NewCommand);
    registry.register("chats", ChatsCommand);
    registry.register("open", OpenCommand);
    registry.register("rename", RenameCommand);
    registry.register("model", ModelCommand);
    registry.register("models", ModelsCommand);
    registry.register("tune", TuneCommand);
    registry.register("show", ShowCommand);
    registry.register("export", ExportCommand);

    registry.alias("exit", "quit");
    registry.alias("q", "quit");
    registry.alias("?", "help");
    registry.alias("ls", "chats");

    CommandDispatcher::new(Arc::new(registry))
}
