use crossbeam_channel::Receiver;
use std::thread::{self, JoinHandle};

use quickscribe_foundation::Notification;

pub const HELP: &str =
    "commands: t = toggle recording | c = clear transcript | p = paste all | d [name] = input device | s = stats | h = help | q = quit";

/// Parsed shell input. The shell is deliberately thin: every command maps
/// onto one runtime operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Toggle,
    Clear,
    PasteAll,
    /// `None` selects the host default device.
    SetDevice(Option<String>),
    Stats,
    Help,
    Quit,
    Unknown(String),
}

/// Parse one input line; `None` for blank lines.
pub fn parse_command(line: &str) -> Option<ShellCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    Some(match head {
        "t" | "toggle" | "record" => ShellCommand::Toggle,
        "c" | "clear" => ShellCommand::Clear,
        "p" | "paste" => ShellCommand::PasteAll,
        "d" | "device" => {
            ShellCommand::SetDevice((!rest.is_empty()).then(|| rest.to_string()))
        }
        "s" | "stats" => ShellCommand::Stats,
        "h" | "help" | "?" => ShellCommand::Help,
        "q" | "quit" | "exit" => ShellCommand::Quit,
        _ => ShellCommand::Unknown(line.to_string()),
    })
}

/// Consume notifications and render them as console lines. The thread ends
/// when every notifier clone has been dropped.
pub fn spawn_printer(rx: Receiver<Notification>) -> JoinHandle<()> {
    thread::spawn(move || {
        for notification in rx.iter() {
            match notification {
                Notification::Status(text) => println!("[status] {}", text),
                Notification::Recording(true) => println!("[rec] ● recording"),
                Notification::Recording(false) => println!("[rec] ○ stopped"),
                Notification::Partial(text) => println!("[partial] {}", text),
                Notification::Transcript(text) => println!("[transcript] {}", text),
                Notification::Activity(text) => println!("[audio] {}", text),
            }
        }
    })
}
