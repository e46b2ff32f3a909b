use crate::{coord::Coord, square_set::Occupancy};

/// Role of a lit square. Each role maps to one LED color on the physical
/// board: cyan origin, white moves, red captures and errors, green
/// confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    Origin,
    LegalMove,
    LegalCapture,
    AwaitingPlacement,
    Confirm,
    Error,
    #[default]
    None,
}

/// Read/write contract of the sensor and LED hardware.
pub trait BoardDriver {
    /// Samples every sensor. The snapshot read by the previous call becomes
    /// [`BoardDriver::previous_occupancy`].
    fn read_sensors(&mut self);
    fn occupancy(&self) -> Occupancy;
    /// Move detection compares [`BoardDriver::occupancy`] against the board
    /// state and does not read this.
    fn previous_occupancy(&self) -> Occupancy;
    fn highlight(&mut self, square: Coord, role: Highlight);
    fn clear_highlights(&mut self) {
        for square in Coord::all() {
            self.highlight(square, Highlight::None);
        }
    }
}

/// In-memory board for tests and the simulator. Pieces are lifted and placed
/// by hand; [`BoardDriver::read_sensors`] latches what was set.
#[derive(Debug, Clone)]
pub struct MockBoard {
    sensed: Occupancy,
    current: Occupancy,
    previous: Occupancy,
    highlights: [Highlight; 64],
}
impl MockBoard {
    pub fn new(occupancy: Occupancy) -> Self {
        MockBoard {
            sensed: occupancy,
            current: occupancy,
            previous: occupancy,
            highlights: [Highlight::None; 64],
        }
    }
    pub fn lift(&mut self, square: Coord) {
        self.sensed.remove(square);
    }
    pub fn place(&mut self, square: Coord) {
        self.sensed.insert(square);
    }
    pub fn toggle(&mut self, square: Coord) {
        self.sensed.toggle(square);
    }
    /// Replaces the whole sensed occupancy, as after setting up a position.
    pub fn load(&mut self, occupancy: Occupancy) {
        self.sensed = occupancy;
    }
    pub fn sensed(&self) -> Occupancy {
        self.sensed
    }
    pub fn highlight_at(&self, square: Coord) -> Highlight {
        self.highlights[square.index()]
    }
    pub fn highlighted(&self, role: Highlight) -> Occupancy {
        Coord::all()
            .filter(|square| self.highlight_at(*square) == role)
            .collect()
    }
}
impl Default for MockBoard {
    fn default() -> Self {
        MockBoard::new(Occupancy::EMPTY)
    }
}
impl BoardDriver for MockBoard {
    fn read_sensors(&mut self) {
        self.previous = self.current;
        self.current = self.sensed;
    }
    fn occupancy(&self) -> Occupancy {
        self.current
    }
    fn previous_occupancy(&self) -> Occupancy {
        self.previous
    }
    fn highlight(&mut self, square: Coord, role: Highlight) {
        self.highlights[square.index()] = role;
    }
}
