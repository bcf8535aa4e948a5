/// A line entered at the prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Pick a file by path, like a file picker.
    Open(String),
    /// A bare path, which is what terminals paste when a file is dropped
    /// onto them.
    Drop(String),
    Type(String),
    Layer(String),
    Search,
    Clear,
    Status,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

/// Undo the quoting or escaping a terminal applies to a dropped path.
fn unquote_path(path: &str) -> String {
    let path = path.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = path
            .strip_prefix(quote)
            .and_then(|path| path.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    path.replace("\\ ", " ")
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::Empty;
        }
        let Some(command) = input.strip_prefix(':') else {
            return Self::Drop(unquote_path(input));
        };
        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map(|(name, rest)| (name, rest.trim()))
            .unwrap_or((command, ""));
        match name {
            "open" | "o" => Self::Open(unquote_path(rest)),
            "type" | "t" => Self::Type(rest.to_string()),
            "layer" | "l" => Self::Layer(rest.to_string()),
            "search" | "s" => Self::Search,
            "clear" | "c" => Self::Clear,
            "status" => Self::Status,
            "help" | "h" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => Self::Unknown(name.to_string()),
        }
    }
}
