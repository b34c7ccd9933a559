use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the board to do.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Command {
    Retry,
    Quit,
}

impl Command {
    /// Raw mode swallows SIGINT, so Ctrl-C arrives here as a key.
    pub fn from_key(key: &KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Retry),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        }
    }
}
