//! Parsing of the line commands typed at the prompt.

use chess::parse_square;
use cozy_chess::Square;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A single square tap, e.g. `e2`.
    Tap(Square),
    /// Shorthand for two taps, e.g. `e2e4`.
    Move(Square, Square),
    Start,
    Pause,
    Undo,
    New,
    Back,
    Forward,
    GoTo(usize),
    Presets,
    Fen(String),
    Export,
    Json,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Empty input")]
    Empty,
    #[error("Unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("'goto' needs a ply number")]
    MissingPly,
    #[error("'fen' needs a position")]
    MissingFen,
}

pub const HELP: &str = "\
Commands:
  e2          tap a square (select, move, or deselect)
  e2e4        tap two squares
  start       start the clock
  pause       pause or resume the clock
  undo        take back the last move
  new         new game with the same time control
  back, fwd   step through the move list (clock paused)
  goto N      show the position after N moves (clock paused)
  presets     list the named time controls
  fen <FEN>   import a position
  export      print the current FEN
  json        dump the session snapshot as JSON
  quit        exit";

pub fn parse_input(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Err(InputError::Empty),
        "start" => Ok(Input::Start),
        "pause" | "p" => Ok(Input::Pause),
        "undo" | "u" => Ok(Input::Undo),
        "new" => Ok(Input::New),
        "back" | "b" => Ok(Input::Back),
        "fwd" | "forward" | "f" => Ok(Input::Forward),
        "goto" => rest
            .parse()
            .map(Input::GoTo)
            .map_err(|_| InputError::MissingPly),
        "presets" | "controls" => Ok(Input::Presets),
        "fen" if rest.is_empty() => Err(InputError::MissingFen),
        "fen" => Ok(Input::Fen(rest.to_string())),
        "export" => Ok(Input::Export),
        "json" => Ok(Input::Json),
        "help" | "?" => Ok(Input::Help),
        "quit" | "q" | "exit" => Ok(Input::Quit),
        other => parse_squares(other).ok_or_else(|| InputError::Unknown(other.to_string())),
    }
}

fn parse_squares(word: &str) -> Option<Input> {
    match word.len() {
        2 => parse_square(word).map(Input::Tap),
        4 => Some(Input::Move(
            parse_square(word.get(..2)?)?,
            parse_square(word.get(2..)?)?,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    #[test]
    fn test_parse_taps() {
        assert_eq!(parse_input("e2"), Ok(Input::Tap(sq("e2"))));
        assert_eq!(parse_input(" E4 "), Ok(Input::Tap(sq("e4"))));
        assert_eq!(parse_input("g1f3"), Ok(Input::Move(sq("g1"), sq("f3"))));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("pause"), Ok(Input::Pause));
        assert_eq!(parse_input("goto 3"), Ok(Input::GoTo(3)));
        assert_eq!(parse_input("goto"), Err(InputError::MissingPly));
        assert_eq!(parse_input("q"), Ok(Input::Quit));
        assert_eq!(parse_input("presets"), Ok(Input::Presets));
        assert_eq!(parse_input("Controls"), Ok(Input::Presets));
    }

    #[test]
    fn test_parse_fen_keeps_case() {
        let fen = "8/8/8/8/8/8/8/K6k w - - 0 1";
        assert_eq!(parse_input(&format!("fen {fen}")), Ok(Input::Fen(fen.into())));
        assert_eq!(parse_input("fen"), Err(InputError::MissingFen));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_input(""), Err(InputError::Empty));
        assert!(matches!(parse_input("z9"), Err(InputError::Unknown(_))));
        assert!(matches!(parse_input("castle"), Err(InputError::Unknown(_))));
    }
}
