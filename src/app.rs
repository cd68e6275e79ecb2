use crate::chat::{ChatEngine, SendOutcome};
use crate::cli::Args;
use crate::commands::{ChatState, CommandDispatcher, create_command_registry};
use crate::config::Config;
use crate::core::clock::SystemClock;
use crate::core::error::ChatError;
use crate::display;
use crate::input;
use crate::providers::registry::{self, ProviderEntry};
use crate::providers::{HttpTransport, ProviderFactory};
use is_terminal::IsTerminal;
use std::future::Future;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

/// Drives `send`, calling `on_wait` once the send has reached its network
/// call if the active conversation is still awaiting the reply. Returns the
/// outcome and whether `on_wait` ran.
async fn with_typing_indicator<F>(
    engine: &ChatEngine,
    send: F,
    on_wait: impl FnOnce(&'static ProviderEntry),
) -> (SendOutcome, bool)
where
    F: Future<Output = SendOutcome>,
{
    let typing = async {
        tokio::task::yield_now().await;
        let awaiting = engine.is_awaiting_reply();
        if awaiting {
            on_wait(engine.current_provider());
        }
        awaiting
    };
    tokio::join!(send, typing)
}

pub struct Application {
    pub args: Args,
    pub config: Config,
    pub engine: Arc<ChatEngine>,
    pub command_dispatcher: CommandDispatcher,
}

impl Application {
    pub fn new(args: Args, config: Config) -> Result<Self, ChatError> {
        let adapters = ProviderFactory::new().build_all(&config)?;
        let timeout = Duration::from_secs(args.timeout.unwrap_or(config.request_timeout_secs));
        let transport = Arc::new(HttpTransport::new(timeout)?);

        let provider_id = args
            .provider
            .clone()
            .or_else(|| config.default_provider.clone())
            .unwrap_or_else(|| registry::default_provider().id.to_string());

        let engine = ChatEngine::new(
            adapters,
            transport,
            Arc::new(SystemClock::new()),
            &provider_id,
            config.tuning.unwrap_or_default(),
        )?;

        Ok(Self {
            args,
            config,
            engine: Arc::new(engine),
            command_dispatcher: create_command_registry(),
        })
    }

    pub async fn run(&mut self) -> Result<(), ChatError> {
        if self.args.list_models {
            println!(
                "{}",
                display::format_provider_list(self.engine.current_provider().id)
            );
            return Ok(());
        }

        let piped = if !io::stdin().is_terminal() {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| ChatError::Input(format!("Failed to read from stdin: {}", e)))?;
            Some(buffer)
        } else {
            None
        };

        let opening = match (self.args.message.as_deref(), piped.as_deref()) {
            (Some(message), Some(context)) => Some(format!("{}\n\n{}", context, message)),
            (None, Some(context)) => Some(context.to_string()),
            (Some(message), None) => Some(message.to_string()),
            (None, None) => None,
        };

        if let Some(opening) = opening {
            self.dispatch(&opening, true).await;
        }

        if self.args.once || piped.is_some() {
            return Ok(());
        }

        self.handle_chat_mode().await
    }

    async fn dispatch(&self, text: &str, initial: bool) {
        let send = async {
            if initial {
                self.engine.send_initial_message(text).await
            } else {
                self.engine.send_message(text).await
            }
        };

        let (outcome, typing_shown) =
            with_typing_indicator(&self.engine, send, display::display_typing).await;
        if typing_shown {
            display::clear_typing();
        }

        match &outcome {
            SendOutcome::Replied { message, .. } => display::display_reply(message),
            SendOutcome::Failed { message, .. } => display::display_failure(message),
            SendOutcome::Skipped => {}
        }
    }

    async fn handle_chat_mode(&mut self) -> Result<(), ChatError> {
        let mut state = ChatState::new(Arc::clone(&self.engine));
        let provider = self.engine.current_provider();

        println!(
            "Chatting with {}. Type '/help' for available commands. Press Ctrl+D or type /quit to exit.",
            console::style(provider.label).bold()
        );

        let mut editor = input::create_editor(self.command_dispatcher.clone())?;

        loop {
            let line = match input::read_input(&mut editor)? {
                Some(line) => line,
                None => break,
            };

            if line.trim().is_empty() {
                continue;
            }

            if let Some(result) = self.command_dispatcher.execute_line(line.trim(), &mut state) {
                match result {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", console::style(e).red()),
                }
                if !state.should_continue {
                    break;
                }
                continue;
            }

            self.dispatch(&line, false).await;
        }

        input::save_history(&mut editor)?;

        Ok(())
    }
}
