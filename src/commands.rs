use std::path::PathBuf;

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Upload(Vec<PathBuf>),
    Profile,
    Save(String),
    Load(String),
    Students,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// `None` for blank lines. Anything not starting with `/` is a question.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Command::Ask(line.to_string()));
        };

        let (name, argument) = match rest.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (rest, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "upload" => Command::Upload(
                argument
                    .split_whitespace()
                    .map(PathBuf::from)
                    .collect(),
            ),
            "profile" => Command::Profile,
            "save" => Command::Save(argument.to_string()),
            "load" => Command::Load(argument.to_string()),
            "students" | "list" => Command::Students,
            "reset" | "new" | "clear" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}
