//! Plain-text rendering of a session snapshot.

use std::fmt::Write;

use chess::fen::parse_fen;
use chess::{format_square, PlayerSide};
use cozy_chess::{Color, File, Piece, Rank, Square};
use session::{format_clock, ClockSnapshot, ClockState, IncrementMode, Preset, SessionSnapshot};

fn piece_char(piece: Piece, color: Color) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match color {
        Color::White => c.to_ascii_uppercase(),
        Color::Black => c,
    }
}

/// Board from White's side. The selected piece is bracketed and legal
/// destinations are marked.
pub fn render_board(snap: &SessionSnapshot) -> String {
    let Ok(board) = parse_fen(&snap.fen) else {
        return format!("<unreadable position: {}>\n", snap.fen);
    };

    let mut out = String::new();
    out.push_str("   +------------------------+\n");
    for rank_idx in (0..8).rev() {
        let _ = write!(out, " {} |", rank_idx + 1);
        for file_idx in 0..8 {
            let square = Square::new(File::index(file_idx), Rank::index(rank_idx));
            let name = format_square(square);
            let symbol = match (board.piece_on(square), board.color_on(square)) {
                (Some(piece), Some(color)) => piece_char(piece, color),
                _ => '.',
            };
            let cell = if snap.selected.as_deref() == Some(name.as_str()) {
                format!("[{}]", symbol)
            } else if snap.destinations.contains(&name) {
                if symbol == '.' {
                    " * ".to_string()
                } else {
                    format!("({})", symbol)
                }
            } else {
                format!(" {} ", symbol)
            };
            out.push_str(&cell);
        }
        out.push_str("|\n");
    }
    out.push_str("   +------------------------+\n");
    out.push_str("     a  b  c  d  e  f  g  h\n");
    out
}

fn clock_line(side: PlayerSide, state: ClockState, low: bool) -> String {
    format!(
        "{:<6} {}{}{}",
        side.display_name(),
        format_clock(state.remaining_ms),
        if state.is_running { "  <" } else { "" },
        if low { "  (low time)" } else { "" },
    )
}

pub fn render_clock(clock: &ClockSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Clock: {}", clock.label);
    let _ = writeln!(
        out,
        "{}",
        clock_line(PlayerSide::Black, clock.black, clock.black_low_time)
    );
    let _ = writeln!(
        out,
        "{}",
        clock_line(PlayerSide::White, clock.white, clock.white_low_time)
    );
    if clock.delay_remaining_ms > 0 && clock.active_side.is_some() {
        let _ = writeln!(out, "Delay: {}s", clock.delay_remaining_ms.div_ceil(1000));
    }
    if clock.paused {
        out.push_str("Paused (type 'start' or play a move)\n");
    }
    out
}

pub fn render_history(snap: &SessionSnapshot) -> String {
    if snap.pairs.is_empty() {
        return "No moves yet\n".to_string();
    }
    let mut out = String::new();
    for pair in &snap.pairs {
        let _ = writeln!(
            out,
            "{:>3}. {:<8} {}",
            pair.number,
            pair.white.as_deref().unwrap_or("..."),
            pair.black.as_deref().unwrap_or("")
        );
    }
    if snap.cursor < snap.history.len() {
        let _ = writeln!(
            out,
            "Viewing ply {} of {} (a move here discards the rest)",
            snap.cursor,
            snap.history.len()
        );
    }
    out
}

/// The named controls as they would be played under `mode`.
pub fn render_time_controls(mode: IncrementMode) -> String {
    let mut out = String::from("Time controls:\n");
    for preset in Preset::ALL {
        let _ = writeln!(
            out,
            "  {:<10} {}",
            preset.name(),
            preset.time_control(mode).label()
        );
    }
    let _ = writeln!(out, "{}", mode.description());
    out
}

/// Everything the prompt shows after a command.
pub fn render_snapshot(snap: &SessionSnapshot) -> String {
    let mut out = render_board(snap);
    if let Some(clock) = &snap.clock {
        out.push_str(&render_clock(clock));
    }
    out.push_str(&render_history(snap));
    match &snap.status {
        Some(status) => {
            let _ = writeln!(out, "{}", status);
        }
        None => {
            let _ = writeln!(out, "{} to move", snap.side_to_move.display_name());
        }
    }
    out
}
