use std::{
    fmt::{self, Display, Formatter},
    io::{self, BufRead, Write, stderr, stdin, stdout},
    str::FromStr,
};

use sensorboard::{
    color::Color,
    coord::{Coord, ParseCoordError},
    driver::MockBoard,
    fen::{Fen, ParseFenError},
    moves::{Move, ParseMoveError},
    session::{GameEvent, GameSession},
};
use thiserror::Error;
use tracing::debug;

use crate::{board_display::BoardDisplay, misc::strip_prefix_token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Input {
    Help,
    Flip,
    Restart,
    Quit,
    Import(Fen),
    ExportFen,
    Lift(Coord),
    Place(Coord),
    Toggle(Coord),
    Sync,
    Push(Move),
    Resign,
    Draw,
    Wait,
}
impl Display for Input {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Input::Help => write!(f, "help")?,
            Input::Flip => write!(f, "flip")?,
            Input::Restart => write!(f, "restart")?,
            Input::Quit => write!(f, "quit")?,
            Input::Import(fen) => write!(f, "import {fen}")?,
            Input::ExportFen => write!(f, "fen")?,
            Input::Lift(square) => write!(f, "lift {square}")?,
            Input::Place(square) => write!(f, "place {square}")?,
            Input::Toggle(square) => write!(f, "{square}")?,
            Input::Sync => write!(f, "sync")?,
            Input::Push(movement) => write!(f, "push {movement}")?,
            Input::Resign => write!(f, "resign")?,
            Input::Draw => write!(f, "draw")?,
            Input::Wait => write!(f, "wait")?,
        }
        Ok(())
    }
}
impl FromStr for Input {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "help" => Ok(Input::Help),
            "flip" => Ok(Input::Flip),
            "restart" => Ok(Input::Restart),
            "quit" => Ok(Input::Quit),
            "fen" => Ok(Input::ExportFen),
            "sync" => Ok(Input::Sync),
            "resign" => Ok(Input::Resign),
            "draw" => Ok(Input::Draw),
            "" | "wait" => Ok(Input::Wait),
            s => {
                if let Some(s) = strip_prefix_token(s, "import") {
                    Ok(Input::Import(s.parse()?))
                } else if let Some(s) = strip_prefix_token(s, "lift") {
                    Ok(Input::Lift(s.parse()?))
                } else if let Some(s) = strip_prefix_token(s, "place") {
                    Ok(Input::Place(s.parse()?))
                } else if let Some(s) = strip_prefix_token(s, "push") {
                    Ok(Input::Push(s.parse()?))
                } else if let Ok(square) = s.parse() {
                    Ok(Input::Toggle(square))
                } else {
                    Err(ParseInputError::Unknown(s.to_string()))
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
enum ParseInputError {
    #[error(transparent)]
    Fen(#[from] ParseFenError),
    #[error(transparent)]
    Move(#[from] ParseMoveError),
    #[error(transparent)]
    Coord(#[from] ParseCoordError),
    #[error("unknown command `{0}`")]
    Unknown(String),
}

/// Plays a session on a simulated sensor board driven from standard input.
#[allow(
    clippy::too_many_lines,
    reason = "further decomposition could potentially hurt readability"
)]
pub fn repl(mut session: GameSession) -> io::Result<()> {
    let input = stdin().lock();
    let mut output = stdout().lock();
    let mut error = stderr().lock();

    let mut lines = input.lines();

    let mut driver = MockBoard::new(session.board().occupancy());
    let mut view = session.remote_color().map_or(Color::White, |color| !color);
    let mut info = vec!["type `help` for instructions".to_string()];
    loop {
        // the second poll gives a remote opponent its turn right after a
        // confirmed move
        for _ in 0..2 {
            session.poll(&mut driver, &mut |event: &GameEvent| {
                info.push(event.to_string());
            });
        }
        info.insert(
            0,
            match session.end_state() {
                Some(end_state) => end_state.to_string(),
                None => format!("{} plays", session.board().turn()),
            },
        );
        writeln!(
            output,
            "{}",
            BoardDisplay {
                board: session.board(),
                driver: &driver,
                view,
                info: &info.join("\n"),
            },
        )?;
        info.clear();
        loop {
            write!(output, "> ")?;
            output.flush()?;
            let Some(text) = lines.next() else {
                return Ok(());
            };
            let input: Input = match text?.trim().parse() {
                Ok(input) => input,
                Err(err) => {
                    writeln!(error, "Error: {err}")?;
                    writeln!(error, "for available command, enter `help`")?;
                    continue;
                }
            };
            debug!(%input, "command");
            match input {
                Input::Help => {
                    writeln!(output, "flip           - flip the board")?;
                    writeln!(output, "restart        - reset to starting position")?;
                    writeln!(output, "quit           - quit the game")?;
                    writeln!(output, "import <fen>   - import a position")?;
                    writeln!(output, "fen            - export the position as fen")?;
                    writeln!(output, "lift e2        - lift the piece on a square")?;
                    writeln!(output, "place e4       - put a piece on a square")?;
                    writeln!(output, "e2             - lift or place on a square")?;
                    writeln!(output, "sync           - set the pieces up as the game says")?;
                    writeln!(output, "push e2e4      - play a move without touching pieces")?;
                    writeln!(output, "resign         - resign for the side to move")?;
                    writeln!(output, "draw           - agree to a draw")?;
                    writeln!(output, "wait           - read the sensors again")?;
                    continue;
                }
                Input::Flip => {
                    view = !view;
                }
                Input::Restart => {
                    session.new_game();
                    driver.load(session.board().occupancy());
                }
                Input::Quit => return Ok(()),
                Input::Import(Fen(board)) => {
                    session.set_board(board);
                    driver.load(session.board().occupancy());
                }
                Input::ExportFen => {
                    writeln!(output, "{}", session.fen())?;
                    continue;
                }
                Input::Lift(square) => driver.lift(square),
                Input::Place(square) => driver.place(square),
                Input::Toggle(square) => driver.toggle(square),
                Input::Sync => driver.load(session.board().occupancy()),
                Input::Push(movement) => {
                    if let Err(err) = session.apply_move(movement) {
                        writeln!(error, "Error: {err}")?;
                        continue;
                    }
                }
                Input::Resign => {
                    if let Err(err) = session.resign(session.board().turn()) {
                        writeln!(error, "Error: {err}")?;
                        continue;
                    }
                }
                Input::Draw => {
                    if let Err(err) = session.agree_draw() {
                        writeln!(error, "Error: {err}")?;
                        continue;
                    }
                }
                Input::Wait => {}
            }
            break;
        }
    }
}
#[cfg(test)]
mod test {
    use sensorboard::coord;

    use crate::repl::{Input, ParseInputError};

    #[test]
    fn parse_commands() {
        assert_eq!("lift e2".parse(), Ok(Input::Lift(coord!("e2"))));
        assert_eq!("place  e4".parse(), Ok(Input::Place(coord!("e4"))));
        assert_eq!("h8".parse(), Ok(Input::Toggle(coord!("h8"))));
        assert_eq!("".parse(), Ok(Input::Wait));
        assert!(matches!(
            "push e2e4".parse::<Input>(),
            Ok(Input::Push(movement)) if movement.to_string() == "e2e4"
        ));
        assert!(matches!(
            "import 8/8 w".parse::<Input>(),
            Err(ParseInputError::Fen(_))
        ));
        assert!(matches!(
            "castle".parse::<Input>(),
            Err(ParseInputError::Unknown(_))
        ));
    }
}
