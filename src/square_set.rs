use std::{
    fmt::{self, Display, Formatter},
    ops::{BitAnd, BitOr, BitOrAssign, BitXor, Not, Sub},
};

use crate::coord::Coord;

/// A set of squares, one bit per square in [`Coord::index`] order. Also used
/// as a raw occupancy snapshot read from the board sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SquareSet(u64);

pub type Occupancy = SquareSet;

impl SquareSet {
    pub const EMPTY: Self = SquareSet(0);
    pub const FULL: Self = SquareSet(u64::MAX);

    pub const fn from_bits(bits: u64) -> Self {
        SquareSet(bits)
    }
    pub const fn bits(self) -> u64 {
        self.0
    }
    pub fn single(square: Coord) -> Self {
        SquareSet(1_u64 << square.index())
    }
    pub fn contains(self, square: Coord) -> bool {
        (self.0 >> square.index()) & 1 == 1
    }
    pub fn insert(&mut self, square: Coord) {
        self.0 |= 1_u64 << square.index();
    }
    pub fn remove(&mut self, square: Coord) {
        self.0 &= !(1_u64 << square.index());
    }
    pub fn set(&mut self, square: Coord, present: bool) {
        if present {
            self.insert(square);
        } else {
            self.remove(square);
        }
    }
    pub fn toggle(&mut self, square: Coord) {
        self.0 ^= 1_u64 << square.index();
    }
    pub fn len(self) -> u32 {
        self.0.count_ones()
    }
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
    /// The only member, if there is exactly one.
    pub fn single_square(self) -> Option<Coord> {
        if self.len() == 1 {
            self.first()
        } else {
            None
        }
    }
    pub fn first(self) -> Option<Coord> {
        if self.0 == 0 {
            None
        } else {
            Coord::from_index(self.0.trailing_zeros() as usize)
        }
    }
    pub fn iter(self) -> Squares {
        Squares(self.0)
    }
}
impl IntoIterator for SquareSet {
    type Item = Coord;
    type IntoIter = Squares;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
impl FromIterator<Coord> for SquareSet {
    fn from_iter<T: IntoIterator<Item = Coord>>(iter: T) -> Self {
        let mut set = SquareSet::EMPTY;
        for square in iter {
            set.insert(square);
        }
        set
    }
}
impl Extend<Coord> for SquareSet {
    fn extend<T: IntoIterator<Item = Coord>>(&mut self, iter: T) {
        for square in iter {
            self.insert(square);
        }
    }
}
pub struct Squares(u64);

impl Iterator for Squares {
    type Item = Coord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Coord::from_index(index)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}
impl ExactSizeIterator for Squares {}

impl BitAnd for SquareSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 & rhs.0)
    }
}
impl BitOr for SquareSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 | rhs.0)
    }
}
impl BitOrAssign for SquareSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
impl BitXor for SquareSet {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 ^ rhs.0)
    }
}
impl Sub for SquareSet {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 & !rhs.0)
    }
}
impl Not for SquareSet {
    type Output = Self;

    fn not(self) -> Self::Output {
        SquareSet(!self.0)
    }
}
impl Display for SquareSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, square) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{square}")?;
        }
        write!(f, "]")?;
        Ok(())
    }
}
