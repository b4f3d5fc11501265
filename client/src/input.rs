//! Turns typed terminal lines into wire commands

pub const HELP_TEXT: &str = "\
Commands:
  W / A / S / D   move up / left / down / right (lowercase works too)
  find            show the nearest coin
  path            show the nearest coin and the route to it
  reset           restore the starting maze
  kill            shut the server down
  help            show this message
  quit            disconnect";

/// What the client should do with one line the user typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Forward this exact line to the server
    Send(String),
    Help,
    Quit,
    Skip,
}

/// Maps user input to protocol lines. Lowercase movement keys are upgraded
/// to the uppercase tokens the server expects; everything else is passed
/// through untouched so the server stays the judge of what is valid.
pub struct InputManager {
    lines_sent: u64,
}

impl InputManager {
    pub fn new() -> Self {
        Self { lines_sent: 0 }
    }

    pub fn interpret(&mut self, line: &str) -> InputAction {
        let line = line.trim_end_matches(['\r', '\n']);

        let action = match line {
            "" => InputAction::Skip,
            "help" | "?" => InputAction::Help,
            "quit" | "exit" => InputAction::Quit,
            "w" | "a" | "s" | "d" => InputAction::Send(line.to_ascii_uppercase()),
            other => InputAction::Send(other.to_string()),
        };

        if matches!(action, InputAction::Send(_)) {
            self.lines_sent += 1;
        }
        action
    }

    pub fn lines_sent(&self) -> u64 {
        self.lines_sent
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_manager_creation() {
        let input_manager = InputManager::new();
        assert_eq!(input_manager.lines_sent(), 0);
    }

    #[test]
    fn test_movement_keys_are_uppercased() {
        let mut input = InputManager::new();
        assert_eq!(input.interpret("w\n"), InputAction::Send("W".to_string()));
        assert_eq!(input.interpret("d\r\n"), InputAction::Send("D".to_string()));
        assert_eq!(input.interpret("S\n"), InputAction::Send("S".to_string()));
        assert_eq!(input.lines_sent(), 3);
    }

    #[test]
    fn test_local_commands() {
        let mut input = InputManager::new();
        assert_eq!(input.interpret("help"), InputAction::Help);
        assert_eq!(input.interpret("?"), InputAction::Help);
        assert_eq!(input.interpret("quit\n"), InputAction::Quit);
        assert_eq!(input.interpret("\n"), InputAction::Skip);
        assert_eq!(input.lines_sent(), 0);
    }

    #[test]
    fn test_other_lines_pass_through() {
        let mut input = InputManager::new();
        assert_eq!(input.interpret("path\n"), InputAction::Send("path".to_string()));
        assert_eq!(input.interpret("FIND"), InputAction::Send("FIND".to_string()));
        assert_eq!(input.interpret(" w"), InputAction::Send(" w".to_string()));
    }
}
