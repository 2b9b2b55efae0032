//! Client command parsing.
//!
//! The transport hands us one already-deframed text command per datagram.
//! Recognized forms are `SPECTATE`, `PLAY <name>` and `KEY <code>`; anything
//! else parses to [`ClientCommand::Invalid`]. Keywords are case-sensitive
//! because key codes are (`h` steps left, `H` runs left).
use log::trace;

/// The eight compass moves, expressed as `(row, col)` deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (-1, 1),
            Direction::DownLeft => (1, -1),
            Direction::DownRight => (1, 1),
        }
    }

    /// Vi-style movement letters, case-insensitive.
    fn from_letter(ch: char) -> Option<Self> {
        let dir = match ch.to_ascii_lowercase() {
            'h' => Direction::Left,
            'l' => Direction::Right,
            'k' => Direction::Up,
            'j' => Direction::Down,
            'y' => Direction::UpLeft,
            'u' => Direction::UpRight,
            'b' => Direction::DownLeft,
            'n' => Direction::DownRight,
            _ => return None,
        };
        Some(dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    Quit,
    /// One step (lower-case letter).
    Step(Direction),
    /// Repeat the step until blocked (upper-case letter).
    Run(Direction),
    Unknown(String),
}

impl Keystroke {
    pub fn parse(code: &str) -> Self {
        let mut chars = code.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return Keystroke::Unknown(code.to_string());
        };
        if ch == 'Q' {
            return Keystroke::Quit;
        }
        match Direction::from_letter(ch) {
            Some(dir) if ch.is_ascii_uppercase() => Keystroke::Run(dir),
            Some(dir) => Keystroke::Step(dir),
            None => Keystroke::Unknown(code.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Spectate,
    /// Raw, unsanitized name as sent by the client.
    Play(String),
    Key(Keystroke),
    Invalid,
}

pub fn parse_command(raw: &str) -> ClientCommand {
    let line = raw.trim_end_matches(['\r', '\n']);
    if line == "SPECTATE" {
        trace!("Parsed SPECTATE");
        return ClientCommand::Spectate;
    }
    if let Some(name) = line.strip_prefix("PLAY ") {
        trace!("Parsed PLAY '{}'", crate::logutil::escape_log(name));
        return ClientCommand::Play(name.to_string());
    }
    if let Some(code) = line.strip_prefix("KEY ") {
        trace!("Parsed KEY '{}'", crate::logutil::escape_log(code));
        return ClientCommand::Key(Keystroke::parse(code));
    }
    ClientCommand::Invalid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_top_level_commands() {
        assert_eq!(parse_command("SPECTATE"), ClientCommand::Spectate);
        assert_eq!(parse_command("SPECTATE\n"), ClientCommand::Spectate);
        assert_eq!(
            parse_command("PLAY Alice Smith"),
            ClientCommand::Play("Alice Smith".into())
        );
        assert_eq!(parse_command("PLAY"), ClientCommand::Invalid);
        assert_eq!(parse_command("PLAY "), ClientCommand::Play(String::new()));
        assert_eq!(
            parse_command("KEY h"),
            ClientCommand::Key(Keystroke::Step(Direction::Left))
        );
        assert_eq!(parse_command("spectate"), ClientCommand::Invalid);
        assert_eq!(parse_command("PLAYBOB"), ClientCommand::Invalid);
        assert_eq!(parse_command(""), ClientCommand::Invalid);
    }

    #[test]
    fn key_case_selects_step_or_run() {
        assert_eq!(Keystroke::parse("n"), Keystroke::Step(Direction::DownRight));
        assert_eq!(Keystroke::parse("N"), Keystroke::Run(Direction::DownRight));
        assert_eq!(Keystroke::parse("K"), Keystroke::Run(Direction::Up));
        assert_eq!(Keystroke::parse("Q"), Keystroke::Quit);
        assert_eq!(Keystroke::parse("q"), Keystroke::Unknown("q".into()));
        assert_eq!(Keystroke::parse("hh"), Keystroke::Unknown("hh".into()));
        assert_eq!(Keystroke::parse(""), Keystroke::Unknown(String::new()));
    }

    #[test]
    fn deltas_are_unit_steps() {
        for ch in ['h', 'l', 'k', 'j', 'y', 'u', 'b', 'n'] {
            let Keystroke::Step(dir) = Keystroke::parse(&ch.to_string()) else {
                panic!("{ch} should be a step");
            };
            let (dr, dc) = dir.delta();
            assert!(dr.abs() <= 1 && dc.abs() <= 1 && (dr, dc) != (0, 0));
        }
        assert_eq!(Direction::UpRight.delta(), (-1, 1));
    }
}
