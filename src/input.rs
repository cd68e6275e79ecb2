use crate::commands::CommandDispatcher;
use crate::config::Config;
use crate::core::error::ChatError;
use crate::providers::registry;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config as EditorConfig, Context, EditMode, Editor, Helper};
use std::borrow::Cow;

/// Completes slash commands and, after `/model `, model ids
pub struct ChatCompleter {
    command_registry: CommandDispatcher,
}

impl ChatCompleter {
    pub fn new(command_registry: CommandDispatcher) -> Self {
        Self { command_registry }
    }

    fn candidates(&self, line: &str, pos: usize) -> Option<(usize, Vec<Pair>)> {
        let typed = line.get(..pos)?.strip_prefix('/')?;

        if let Some(partial) = typed.strip_prefix("model ") {
            let matches: Vec<Pair> = registry::list_providers()
                .iter()
                .filter(|entry| entry.selectable && entry.id.starts_with(partial))
                .map(|entry| Pair {
                    display: format!("{} ({})", entry.id, entry.label),
                    replacement: entry.id.to_string(),
                })
                .collect();
            return Some((pos - partial.len(), matches));
        }

        if typed.contains(' ') {
            return None;
        }

        let matches: Vec<Pair> = self
            .command_registry
            .get_command_names()
            .into_iter()
            .filter(|cmd| cmd.starts_with(typed))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd,
            })
            .collect();
        Some((1, matches))
    }
}

impl Completer for ChatCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos).unwrap_or((pos, Vec::new())))
    }
}

/// Helper struct that combines the rustyline components
pub struct ChatHelper {
    completer: ChatCompleter,
    hinter: HistoryHinter,
}

impl ChatHelper {
    pub fn new(command_registry: CommandDispatcher) -> Self {
        Self {
            completer: ChatCompleter::new(command_registry),
            hinter: HistoryHinter {},
        }
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ChatHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }
}

impl Validator for ChatHelper {}

/// Creates a configured rustyline editor
pub fn create_editor(
    command_registry: CommandDispatcher,
) -> Result<Editor<ChatHelper, FileHistory>, ChatError> {
    let config = EditorConfig::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| ChatError::Input(format!("Failed to create line editor: {}", e)))?;

    editor.set_helper(Some(ChatHelper::new(command_registry)));
    let _ = editor.load_history(&Config::history_path());

    Ok(editor)
}

/// Reads a line of input; `None` on Ctrl-C or Ctrl-D
pub fn read_input(
    editor: &mut Editor<ChatHelper, FileHistory>,
) -> Result<Option<String>, ChatError> {
    let prompt = if cfg!(windows) && std::env::var("PSModulePath").is_ok() {
        "> ".to_string()
    } else {
        style("> ").bold().cyan().to_string()
    };
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                editor.add_history_entry(&line)?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("Exiting...");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Saves the editor history
pub fn save_history(editor: &mut Editor<ChatHelper, FileHistory>) -> Result<(), ChatError> {
    let history_path = Config::history_path();

    if let Some(parent) = history_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    editor
        .save_history(&history_path)
        .map_err(|e| ChatError::Input(format!("Failed to save history: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_command_registry;

    fn replacements(line: &str) -> (usize, Vec<String>) {
        let completer = ChatCompleter::new(create_command_registry());
        let (start, pairs) = completer
            .candidates(line, line.len())
            .unwrap_or((line.len(), Vec::new()));
        (start, pairs.into_iter().map(|p| p.replacement).collect())
    }

    #[test]
    fn completes_command_names() {
        let (start, names) = replacements("/mo");
        assert_eq!(start, 1);
        assert_eq!(names, vec!["model", "models"]);
    }

    #[test]
    fn completes_model_ids_only_for_selectable_entries() {
        let (start, ids) = replacements("/model gpt-4o");
        assert_eq!(start, "/model ".len());
        assert_eq!(ids, vec!["gpt-4o-mini", "gpt-4o"]);

        let (_, ids) = replacements("/model openai");
        assert!(ids.is_empty());
    }

    #[test]
    fn plain_text_has_no_completions() {
        assert!(replacements("hello there").1.is_empty());
    }
}
