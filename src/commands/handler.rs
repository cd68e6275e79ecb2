use super::ChatState;
use crate::chat::ConversationId;
use crate::core::error::ChatError;
use crate::display;
use crate::providers::TuningField;

use console::style;

pub trait CommandHandler: Send + Sync {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct NewCommand;
pub struct ChatsCommand;
pub struct OpenCommand;
pub struct RenameCommand;
pub struct ModelCommand;
pub struct ModelsCommand;
pub struct TuneCommand;
pub struct ShowCommand;
pub struct ExportCommand;

fn parse_id(arg: Option<&&str>, usage: &str) -> Result<ConversationId, ChatError> {
    let raw = arg.ok_or_else(|| ChatError::Input(format!("Usage: {}", usage)))?;
    raw.trim_start_matches('#')
        .parse()
        .map_err(|_| ChatError::Input(format!("Not a conversation id: {}", raw)))
}

impl CommandHandler for QuitCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ChatError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit, /exit, /q - Exit the chat session"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = [
            title.to_string(),
            QuitCommand.help().to_string(),
            HelpCommand.help().to_string(),
            NewCommand.help().to_string(),
            ChatsCommand.help().to_string(),
            OpenCommand.help().to_string(),
            RenameCommand.help().to_string(),
            ModelCommand.help().to_string(),
            ModelsCommand.help().to_string(),
            TuneCommand.help().to_string(),
            ShowCommand.help().to_string(),
            ExportCommand.help().to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help, /? - Show available commands"
    }
}

impl CommandHandler for NewCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ChatError> {
        let id = state.engine.create_conversation();
        Ok(Some(format!("Started conversation #{}", id)))
    }

    fn help(&self) -> &'static str {
        "/new - Start a new conversation"
    }
}

impl CommandHandler for ChatsCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ChatError> {
        let conversations = state.engine.conversations();
        let active = state.engine.active_conversation().id();
        Ok(Some(display::format_conversation_list(&conversations, active)))
    }

    fn help(&self) -> &'static str {
        "/chats, /ls - List conversations, most recent first"
    }
}

impl CommandHandler for OpenCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError> {
        let id = parse_id(args.first(), self.help())?;
        state.engine.select_conversation(id)?;
        display::display_conversation(&state.engine.active_conversation());
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/open <id> - Switch to another conversation"
    }
}

impl CommandHandler for RenameCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError> {
        let id = parse_id(args.first(), self.help())?;
        let title = args.get(1..).unwrap_or_default().join(" ");
        state.engine.rename_conversation(id, &title)?;
        let renamed = state
            .engine
            .conversation(id)
            .ok_or(ChatError::UnknownConversation(id))?;
        Ok(Some(format!("Conversation #{} renamed to: {}", id, renamed.title())))
    }

    fn help(&self) -> &'static str {
        "/rename <id> <title> - Rename a conversation (stops automatic titles)"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError> {
        let Some(provider_id) = args.first() else {
            let current = state.engine.current_provider();
            return Ok(Some(format!(
                "Current model: {} ({})",
                current.label, current.id
            )));
        };

        match state.engine.select_provider(provider_id)? {
            Some(_) => {
                display::display_conversation(&state.engine.active_conversation());
                Ok(None)
            }
            None => Ok(Some(format!("Already using {}", provider_id))),
        }
    }

    fn help(&self) -> &'static str {
        "/model [id] - Show or change the model (opens a new conversation)"
    }
}

impl CommandHandler for ModelsCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ChatError> {
        let current = state.engine.current_provider();
        Ok(Some(display::format_provider_list(current.id)))
    }

    fn help(&self) -> &'static str {
        "/models - List available models"
    }
}

impl CommandHandler for TuneCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError> {
        if args.is_empty() {
            let current = state.engine.current_provider();
            return Ok(Some(match state.engine.tuning() {
                Some(tuning) => format!(
                    "{}: temperature={} top_p={}",
                    current.label, tuning.temperature, tuning.top_p
                ),
                None => format!("{} does not accept tuning parameters", current.label),
            }));
        }

        let [field, value] = args else {
            return Err(ChatError::Input(format!("Usage: {}", self.help())));
        };
        let field = TuningField::from_str(field)
            .ok_or_else(|| ChatError::Input(format!("Unknown tuning field: {}", field)))?;
        let value: f32 = value
            .parse()
            .map_err(|_| ChatError::Input(format!("Not a number: {}", value)))?;

        let tuning = state.engine.set_tuning(field, value)?;
        Ok(Some(format!(
            "Tuning updated: temperature={} top_p={}",
            tuning.temperature, tuning.top_p
        )))
    }

    fn help(&self) -> &'static str {
        "/tune [temperature|top_p <value>] - Show or adjust sampling for tunable models"
    }
}

impl CommandHandler for ShowCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, ChatError> {
        display::display_conversation(&state.engine.active_conversation());
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/show - Show the active conversation"
    }
}

impl CommandHandler for ExportCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, ChatError> {
        let conversation = state.engine.active_conversation();
        let filename = match args.first() {
            Some(name) => name.to_string(),
            None => format!("conversation-{}.txt", conversation.id()),
        };

        std::fs::write(&filename, conversation.transcript())?;
        Ok(Some(format!("Conversation exported to: {}", filename)))
    }

    fn help(&self) -> &'static str {
        "/export [file] - Save the active conversation as text"
    }
}
