use crate::chat::{Conversation, ConversationId, Message, Sender};
use crate::providers::registry::{self, ProviderEntry};
use console::style;
use termimad::MadSkin;

fn box_width(term: &console::Term, content_max_len: usize) -> usize {
    let terminal_width = term.size().1 as usize;
    let max_width = std::cmp::min(terminal_width.saturating_sub(4), 120).max(60);
    std::cmp::min(max_width, content_max_len + 4)
}

/// Wraps `line` at spaces so no piece exceeds `max_len` characters.
fn wrap_line(line: &str, max_len: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split(' ') {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_len && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines
}

fn looks_like_markdown(text: &str) -> bool {
    text.contains("```") || text.contains('*') || text.contains('`') || text.contains('#')
}

/// Display an assistant reply, as markdown when it looks like markdown
pub fn display_reply(message: &Message) {
    let model = message
        .debug_info
        .as_deref()
        .and_then(|info| info.lines().next())
        .unwrap_or("Assistant");
    println!("\n{}", style(format!("🤖 {}", model)).bold().blue());

    if looks_like_markdown(&message.text) {
        MadSkin::default().print_text(&message.text);
        return;
    }

    let term = console::Term::stdout();
    let max_line_len = box_width(&term, usize::MAX / 2).saturating_sub(4).max(20);
    let wrapped: Vec<String> = message
        .text
        .lines()
        .flat_map(|line| wrap_line(line, max_line_len))
        .collect();
    let content_max_len = wrapped.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = box_width(&term, content_max_len);

    println!("{}", style("┌".to_string() + &"─".repeat(width - 2) + "┐").dim().blue());
    for line in wrapped {
        let padding = width.saturating_sub(line.chars().count() + 3);
        println!("│ {}{}│", style(&line).white(), " ".repeat(padding));
    }
    println!("{}", style("└".to_string() + &"─".repeat(width - 2) + "┘").dim().blue());
}

/// Display a failed turn
pub fn display_failure(message: &Message) {
    println!("\n{} {}", style("⚠️").bold().red(), style(&message.text).red());
}

pub fn display_user(message: &Message) {
    println!("\n{} {}", style("You:").bold().cyan(), message.text);
}

/// Replays a whole conversation
pub fn display_conversation(conversation: &Conversation) {
    println!(
        "\n{} {}",
        style(format!("#{}", conversation.id())).dim(),
        style(conversation.title()).bold().underlined()
    );
    if conversation.messages().is_empty() {
        println!("{}", style("(empty)").dim());
    }
    for message in conversation.messages() {
        match message.sender {
            Sender::User => display_user(message),
            Sender::Assistant if message.debug_info.is_none() => display_failure(message),
            Sender::Assistant => display_reply(message),
        }
    }
}

/// Typing indicator shown while the active conversation awaits a reply
pub fn display_typing(provider: &ProviderEntry) {
    println!(
        "{}",
        style(format!("{} is typing...", provider.label)).dim().italic()
    );
}

pub fn clear_typing() {
    console::Term::stdout().clear_last_lines(1).ok();
}

pub fn format_conversation_list(
    conversations: &[std::sync::Arc<Conversation>],
    active: ConversationId,
) -> String {
    conversations
        .iter()
        .map(|c| {
            let marker = if c.id() == active { "*" } else { " " };
            let lock = if c.is_title_locked() { " 🔒" } else { "" };
            format!(
                "{} {:>3}  {}{} ({} messages)",
                marker,
                c.id(),
                c.title(),
                lock,
                c.messages().len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Registry listing; group headers are shown as section titles
pub fn format_provider_list(current: &str) -> String {
    registry::list_providers()
        .iter()
        .map(|entry| {
            if !entry.selectable {
                format!("{}", style(entry.label).bold().underlined())
            } else {
                let marker = if entry.id == current { "*" } else { " " };
                format!("{} {:<26} {}", marker, entry.id, entry.label)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
