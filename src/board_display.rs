use std::fmt::{self, Display, Formatter};

use sensorboard::{
    board::Board,
    color::Color,
    coord::Coord,
    driver::{Highlight, MockBoard},
    piece::Piece,
};

const WHITE: &str = "\x1b[30;107m";
const BLACK: &str = "\x1b[30;47m";
const ORIGIN: &str = "\x1b[30;106m";
const LEGAL_MOVE: &str = "\x1b[30;103m";
const RED: &str = "\x1b[30;101m";
const AWAITING: &str = "\x1b[30;105m";
const CONFIRM: &str = "\x1b[30;102m";
const RESET: &str = "\x1b[0m";

/// Board and LEDs of the simulated sensor board side by side with info
/// lines. A piece held in hand shows as an empty square and an unexpected
/// piece as `?`.
pub struct BoardDisplay<'a> {
    pub board: &'a Board,
    pub driver: &'a MockBoard,
    pub view: Color,
    pub info: &'a str,
}
impl BoardDisplay<'_> {
    fn symbol(&self, square: Coord) -> char {
        match (self.board[square], self.driver.sensed().contains(square)) {
            (Some(piece), true) => Piece::figurine(piece),
            (None, true) => '?',
            (_, false) => ' ',
        }
    }
}
impl Display for BoardDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut lines = self.info.lines().fuse();
        for row in 0..8 {
            let row = match self.view {
                Color::White => row,
                Color::Black => 7 - row,
            };
            for col in 0..8 {
                let col = match self.view {
                    Color::White => col,
                    Color::Black => 7 - col,
                };
                let square = Coord::new(row, col);
                let color = match self.driver.highlight_at(square) {
                    Highlight::Origin => ORIGIN,
                    Highlight::LegalMove => LEGAL_MOVE,
                    Highlight::LegalCapture | Highlight::Error => RED,
                    Highlight::AwaitingPlacement => AWAITING,
                    Highlight::Confirm => CONFIRM,
                    Highlight::None => match square.color() {
                        Color::White => WHITE,
                        Color::Black => BLACK,
                    },
                };
                write!(f, "{color}{} {RESET}", self.symbol(square))?;
            }
            write!(f, "{}", 8 - row)?;
            if let Some(line) = lines.next() {
                write!(f, " {line}")?;
            }
            writeln!(f)?;
        }
        match self.view {
            Color::White => write!(f, "a b c d e f g h")?,
            Color::Black => write!(f, "h g f e d c b a")?,
        }
        if let Some(line) = lines.next() {
            write!(f, "   {line}")?;
        }
        writeln!(f)?;
        for line in lines {
            writeln!(f, "                  {line}")?;
        }
        Ok(())
    }
}
