//! The small command set shared by the keyboard and the serial device.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    Reset,
    /// Leaves the menu.
    Start,
}

impl Command {
    /// Decodes one line from the serial device. Tokens are case-sensitive and
    /// matched after trimming; anything else is `None`.
    pub fn from_device_token(line: &str) -> Option<Self> {
        match line.trim() {
            "LEFT" => Some(Command::MoveLeft),
            "RIGHT" => Some(Command::MoveRight),
            "DOWN" => Some(Command::SoftDrop),
            "ROTATE" => Some(Command::RotateCw),
            "DROP" => Some(Command::HardDrop),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::MoveLeft => "move-left",
            Command::MoveRight => "move-right",
            Command::SoftDrop => "soft-drop",
            Command::HardDrop => "hard-drop",
            Command::RotateCw => "rotate-cw",
            Command::RotateCcw => "rotate-ccw",
            Command::Reset => "reset",
            Command::Start => "start",
        };
        f.write_str(name)
    }
}
