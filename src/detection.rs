//! Reconciles sensor occupancy against the board state.
//!
//! The detector is polled with the current [`Board`] and a driver. Every
//! decision is made by comparing the sensed occupancy with the occupancy the
//! board says there should be, never by counting edges, so a transition that
//! is ambiguous on one poll can resolve on a later one.

use std::fmt::{self, Display, Formatter};

use tracing::{debug, info, warn};

use crate::{
    board::Board,
    color::Color,
    coord::Coord,
    driver::{BoardDriver, Highlight},
    moves::{AppliedMove, Move},
    piece::PieceKind,
    rules::{is_promotion, legal_moves},
    square_set::{Occupancy, SquareSet},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    WrongSide,
    NoLegalMoves,
    IllegalPlacement,
}
impl Display for RejectReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::WrongSide => write!(f, "not the side to move")?,
            RejectReason::NoLegalMoves => write!(f, "piece has no legal moves")?,
            RejectReason::IllegalPlacement => write!(f, "not a legal destination")?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Selected {
        origin: Coord,
        destinations: SquareSet,
    },
    CapturePending {
        origin: Coord,
        destinations: SquareSet,
        target: Coord,
    },
    AwaitRookMove {
        rook_origin: Coord,
        rook_destination: Coord,
    },
    AwaitPromotionSwap {
        square: Coord,
        removed: bool,
    },
    AwaitRemoteMove {
        applied: AppliedMove,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detection {
    Selected {
        origin: Coord,
        destinations: SquareSet,
    },
    Rejected {
        square: Coord,
        reason: RejectReason,
    },
    Cancelled {
        origin: Coord,
    },
    CaptureStarted {
        origin: Coord,
        target: Coord,
    },
    Confirmed(Move),
    RookPlaced {
        square: Coord,
    },
    PromotionSwapped {
        square: Coord,
    },
    RemoteMoveCompleted(Move),
}

#[derive(Debug, Clone)]
pub struct Detector {
    phase: Phase,
    // squares already reported as errors; they stay lit and are ignored until
    // the sensed occupancy agrees with the board again
    flagged: SquareSet,
    confirmed: Option<Coord>,
    promotion: PieceKind,
    remote: Option<Color>,
}
impl Detector {
    pub fn new(promotion: PieceKind) -> Self {
        Detector {
            phase: Phase::Idle,
            flagged: SquareSet::EMPTY,
            confirmed: None,
            promotion,
            remote: None,
        }
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn flagged(&self) -> SquareSet {
        self.flagged
    }
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
    /// Whether the detector waits for the physical side effects of a move
    /// the board already reflects.
    pub fn is_following_through(&self) -> bool {
        matches!(
            self.phase,
            Phase::AwaitRookMove { .. }
                | Phase::AwaitPromotionSwap { .. }
                | Phase::AwaitRemoteMove { .. }
        )
    }
    pub fn set_promotion(&mut self, promotion: PieceKind) {
        self.promotion = promotion;
    }
    /// Pieces of the remote color are moved on its behalf, never selected.
    pub fn set_remote(&mut self, remote: Option<Color>) {
        self.remote = remote;
    }
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.flagged = SquareSet::EMPTY;
        self.confirmed = None;
    }
    /// Advances on the driver's latest occupancy snapshot. At most one
    /// detection is produced per poll.
    pub fn poll<D: BoardDriver + ?Sized>(
        &mut self,
        board: &Board,
        driver: &mut D,
    ) -> Option<Detection> {
        let current = driver.occupancy();
        let expected = board.occupancy();
        let phase = self.phase;
        let flagged = self.flagged;
        self.flagged = self.flagged & (current ^ expected);

        let detection = match phase {
            Phase::Idle => self.poll_idle(board, current, expected),
            Phase::Selected {
                origin,
                destinations,
            } => self.poll_selected(board, current, expected, origin, destinations),
            Phase::CapturePending {
                origin,
                destinations: _,
                target,
            } => self.poll_capture_pending(board, current, expected, origin, target),
            Phase::AwaitRookMove {
                rook_origin,
                rook_destination,
            } => {
                if !current.contains(rook_origin) && current.contains(rook_destination) {
                    debug!(%rook_destination, "rook placed");
                    self.phase = Phase::Idle;
                    self.confirmed = Some(rook_destination);
                    Some(Detection::RookPlaced {
                        square: rook_destination,
                    })
                } else {
                    None
                }
            }
            Phase::AwaitPromotionSwap { square, removed } => {
                if !removed && !current.contains(square) {
                    debug!(%square, "pawn removed for promotion");
                    self.phase = Phase::AwaitPromotionSwap {
                        square,
                        removed: true,
                    };
                    None
                } else if removed && current.contains(square) {
                    debug!(%square, "promoted piece placed");
                    self.phase = Phase::Idle;
                    self.confirmed = Some(square);
                    Some(Detection::PromotionSwapped { square })
                } else {
                    None
                }
            }
            Phase::AwaitRemoteMove { applied } => (current == expected).then(|| {
                info!(movement = %applied.movement, "remote move executed");
                self.phase = Phase::Idle;
                self.confirmed = Some(applied.movement.destination);
                Detection::RemoteMoveCompleted(applied.movement)
            }),
        };
        if detection.is_some() || self.phase != phase || self.flagged != flagged {
            self.render(board, driver);
        }
        detection
    }
    fn reject(&mut self, square: Coord, reason: RejectReason) -> Option<Detection> {
        warn!(%square, %reason, "rejected");
        self.flagged.insert(square);
        Some(Detection::Rejected { square, reason })
    }
    fn poll_idle(
        &mut self,
        board: &Board,
        current: Occupancy,
        expected: Occupancy,
    ) -> Option<Detection> {
        let lifted = expected - current - self.flagged;
        let placed = current - expected - self.flagged;
        let origin = match lifted.len() {
            0 => {
                return placed
                    .first()
                    .and_then(|square| self.reject(square, RejectReason::IllegalPlacement));
            }
            1 => lifted.first()?,
            _ => {
                debug!(%lifted, "ambiguous lift");
                return None;
            }
        };
        let piece = board[origin]?;
        if piece.color != board.turn() || self.remote == Some(piece.color) {
            return self.reject(origin, RejectReason::WrongSide);
        }
        let destinations = legal_moves(board, origin);
        if destinations.is_empty() {
            return self.reject(origin, RejectReason::NoLegalMoves);
        }
        debug!(%origin, %destinations, "selected");
        self.confirmed = None;
        // a victim lifted before the attacker was already flagged; the
        // attacker may land there before the next poll
        let emptied = expected - current - SquareSet::single(origin);
        let captures = capture_targets(board, origin, destinations, emptied);
        self.phase = match captures.single_square() {
            Some(target) => {
                debug!(%origin, %target, "victim already removed");
                self.unflag_victim(board, origin, target);
                Phase::CapturePending {
                    origin,
                    destinations,
                    target,
                }
            }
            None => Phase::Selected {
                origin,
                destinations,
            },
        };
        Some(Detection::Selected {
            origin,
            destinations,
        })
    }
    fn poll_selected(
        &mut self,
        board: &Board,
        current: Occupancy,
        expected: Occupancy,
        origin: Coord,
        destinations: SquareSet,
    ) -> Option<Detection> {
        if current.contains(origin) {
            return Some(self.cancel(origin));
        }
        let placed = current - expected - self.flagged;
        let emptied = expected - current - SquareSet::single(origin);

        let confirms = placed & destinations;
        let captures = capture_targets(board, origin, destinations, emptied);
        match (confirms.len(), captures.len()) {
            (1, 0) => confirms
                .first()
                .map(|destination| self.confirm(board, origin, destination)),
            (0, 1) => {
                let target = captures.first()?;
                debug!(%origin, %target, "capture started");
                self.unflag_victim(board, origin, target);
                self.phase = Phase::CapturePending {
                    origin,
                    destinations,
                    target,
                };
                Some(Detection::CaptureStarted { origin, target })
            }
            (0, 0) => (placed - destinations)
                .first()
                .and_then(|square| self.reject(square, RejectReason::IllegalPlacement)),
            _ => {
                debug!(%confirms, %captures, "ambiguous placement");
                None
            }
        }
    }
    fn poll_capture_pending(
        &mut self,
        board: &Board,
        current: Occupancy,
        expected: Occupancy,
        origin: Coord,
        target: Coord,
    ) -> Option<Detection> {
        match (current.contains(origin), current.contains(target)) {
            (true, true) => {
                debug!(%origin, %target, "ambiguous capture");
                None
            }
            (true, false) => Some(self.cancel(origin)),
            (false, true) => Some(self.confirm(board, origin, target)),
            (false, false) => (current - expected - self.flagged)
                .first()
                .and_then(|square| self.reject(square, RejectReason::IllegalPlacement)),
        }
    }
    fn unflag_victim(&mut self, board: &Board, origin: Coord, target: Coord) {
        self.flagged.remove(victim_square(board, origin, target));
    }
    fn cancel(&mut self, origin: Coord) -> Detection {
        debug!(%origin, "selection cancelled");
        self.phase = Phase::Idle;
        Detection::Cancelled { origin }
    }
    fn confirm(&mut self, board: &Board, origin: Coord, destination: Coord) -> Detection {
        let mut movement = Move::new(origin, destination);
        if board[origin].is_some_and(|piece| is_promotion(piece, destination.row())) {
            movement = movement.with_promotion(self.promotion);
        }
        info!(%movement, "move confirmed");
        self.phase = Phase::Idle;
        self.confirmed = Some(destination);
        Detection::Confirmed(movement)
    }
    /// Enters the follow-through phase for a move the board now reflects:
    /// the rook hop of a castle or the piece swap of a promotion.
    pub fn follow_through<D: BoardDriver + ?Sized>(
        &mut self,
        applied: &AppliedMove,
        board: &Board,
        driver: &mut D,
    ) {
        self.confirmed = Some(applied.movement.destination);
        self.phase = if let Some(castling) = applied.castling {
            Phase::AwaitRookMove {
                rook_origin: castling.rook_origin,
                rook_destination: castling.rook_destination,
            }
        } else if applied.promotion.is_some() {
            Phase::AwaitPromotionSwap {
                square: applied.movement.destination,
                removed: false,
            }
        } else {
            Phase::Idle
        };
        debug!(phase = ?self.phase, "following through");
        self.render(board, driver);
    }
    /// Guides the player through physically executing a move that was
    /// applied to the board from elsewhere.
    /// Highlights are not refreshed until the next [`Detector::render`] or
    /// poll.
    pub fn guide(&mut self, applied: AppliedMove) {
        self.phase = Phase::AwaitRemoteMove { applied };
        self.flagged = SquareSet::EMPTY;
        self.confirmed = None;
        debug!(movement = %applied.movement, "awaiting remote move execution");
    }
    pub fn render<D: BoardDriver + ?Sized>(&self, board: &Board, driver: &mut D) {
        driver.clear_highlights();
        match self.phase {
            Phase::Idle => {
                if let Some(square) = self.confirmed {
                    driver.highlight(square, Highlight::Confirm);
                }
            }
            Phase::Selected {
                origin,
                destinations,
            } => {
                driver.highlight(origin, Highlight::Origin);
                for destination in destinations {
                    let role = if board[destination].is_some()
                        || board.is_en_passant(Move::new(origin, destination))
                    {
                        Highlight::LegalCapture
                    } else {
                        Highlight::LegalMove
                    };
                    driver.highlight(destination, role);
                }
            }
            Phase::CapturePending { origin, target, .. } => {
                driver.highlight(origin, Highlight::Origin);
                driver.highlight(target, Highlight::AwaitingPlacement);
            }
            Phase::AwaitRookMove {
                rook_origin,
                rook_destination,
            } => {
                if let Some(square) = self.confirmed {
                    driver.highlight(square, Highlight::Confirm);
                }
                driver.highlight(rook_origin, Highlight::Origin);
                driver.highlight(rook_destination, Highlight::LegalMove);
            }
            Phase::AwaitPromotionSwap { square, .. } => {
                driver.highlight(square, Highlight::AwaitingPlacement);
            }
            Phase::AwaitRemoteMove { applied } => {
                let Move {
                    origin,
                    destination,
                    ..
                } = applied.movement;
                driver.highlight(origin, Highlight::Origin);
                driver.highlight(destination, Highlight::LegalMove);
                if let Some((square, _)) = applied.captured {
                    driver.highlight(square, Highlight::LegalCapture);
                }
                if let Some(castling) = applied.castling {
                    driver.highlight(castling.rook_origin, Highlight::Origin);
                    driver.highlight(castling.rook_destination, Highlight::LegalMove);
                }
            }
        }
        for square in self.flagged {
            driver.highlight(square, Highlight::Error);
        }
    }
}
/// Square the captured piece stands on when `origin` takes on `target`.
fn victim_square(board: &Board, origin: Coord, target: Coord) -> Coord {
    if board.is_en_passant(Move::new(origin, target)) {
        target.with_row(origin.row())
    } else {
        target
    }
}
/// Capture destinations whose victim is off the board. Flagged squares count.
fn capture_targets(
    board: &Board,
    origin: Coord,
    destinations: SquareSet,
    emptied: SquareSet,
) -> SquareSet {
    destinations
        .iter()
        .filter(|target| {
            (board[*target].is_some() || board.is_en_passant(Move::new(origin, *target)))
                && emptied.contains(victim_square(board, origin, *target))
        })
        .collect()
}
impl Default for Detector {
    fn default() -> Self {
        Detector::new(PieceKind::Queen)
    }
}
