//! A game played on a sensor board.
//!
//! [`GameSession`] owns the authoritative [`Board`] and routes every change to
//! it: moves detected on the physical board, moves from a remote
//! [`Opponent`] and edits made through its methods. Outcomes are reported to a
//! [`GameObserver`] as [`GameEvent`]s.

use std::fmt::{self, Display, Formatter};

use tracing::{debug, info, warn};

use crate::{
    board::{Board, Grid},
    color::Color,
    config::SessionConfig,
    coord::Coord,
    detection::{Detection, Detector, Phase, RejectReason},
    driver::BoardDriver,
    end_state::{DrawReason, EndState},
    error::SessionError,
    fen::Fen,
    moves::{AppliedMove, CastlingMove, Move},
    opponent::Opponent,
    piece::{Piece, PieceKind},
    rules::{
        has_insufficient_material, is_checkmate, is_fifty_move_rule, is_in_check, is_legal,
        is_promotion, is_stalemate,
    },
    square_set::SquareSet,
    zobrist::PositionHistory,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
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
    /// A move made on the physical board was accepted.
    MoveConfirmed(AppliedMove),
    /// A move was applied on behalf of the remote side or through
    /// [`GameSession::apply_move`] and still has to be carried out on the
    /// physical board.
    RemoteMove(AppliedMove),
    Capture {
        square: Coord,
        piece: Piece,
    },
    EnPassant {
        captured: Coord,
    },
    Castle(CastlingMove),
    Promotion {
        square: Coord,
        kind: PieceKind,
    },
    RookPlaced {
        square: Coord,
    },
    PromotionSwapped {
        square: Coord,
    },
    RemoteMoveExecuted(Move),
    Check {
        color: Color,
        king: Coord,
    },
    Checkmate {
        winner: Color,
    },
    Stalemate,
    Draw(DrawReason),
    Resigned {
        color: Color,
    },
}

impl Display for GameEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::Selected {
                origin,
                destinations,
            } => write!(f, "{origin} selected, can go to {destinations}")?,
            GameEvent::Rejected { square, reason } => write!(f, "{square}: {reason}")?,
            GameEvent::Cancelled { origin } => write!(f, "{origin} put back")?,
            GameEvent::CaptureStarted { origin, target } => {
                write!(f, "{origin} is capturing on {target}")?;
            }
            GameEvent::MoveConfirmed(applied) => {
                write!(f, "{} plays {}", applied.piece, applied.movement)?;
            }
            GameEvent::RemoteMove(applied) => write!(
                f,
                "{} plays {}, move it on the board",
                applied.piece, applied.movement
            )?,
            GameEvent::Capture { square, piece } => write!(f, "{piece} on {square} captured")?,
            GameEvent::EnPassant { captured } => write!(f, "en passant, {captured} captured")?,
            GameEvent::Castle(castling) => write!(
                f,
                "castling, move the rook from {} to {}",
                castling.rook_origin, castling.rook_destination
            )?,
            GameEvent::Promotion { square, kind } => {
                write!(f, "promotion to {kind} on {square}, swap the pawn")?;
            }
            GameEvent::RookPlaced { square } => write!(f, "rook placed on {square}")?,
            GameEvent::PromotionSwapped { square } => write!(f, "promoted piece placed on {square}")?,
            GameEvent::RemoteMoveExecuted(movement) => write!(f, "{movement} done on the board")?,
            GameEvent::Check { color, .. } => write!(f, "{color} is in check")?,
            GameEvent::Checkmate { winner } => write!(f, "checkmate, {winner} wins")?,
            GameEvent::Stalemate => write!(f, "stalemate")?,
            GameEvent::Draw(reason) => write!(f, "draw by {reason}")?,
            GameEvent::Resigned { color } => write!(f, "{color} resigns, {} wins", !*color)?,
        }
        Ok(())
    }
}

/// Receiver of [`GameEvent`]s, such as a display, a sound player or a
/// network client.
pub trait GameObserver {
    fn notify(&mut self, event: &GameEvent);
}
impl GameObserver for Vec<GameEvent> {
    fn notify(&mut self, event: &GameEvent) {
        self.push(*event);
    }
}
impl GameObserver for () {
    fn notify(&mut self, _event: &GameEvent) {}
}
impl<F: FnMut(&GameEvent)> GameObserver for F {
    fn notify(&mut self, event: &GameEvent) {
        self(event);
    }
}

pub struct GameSession {
    board: Board,
    detector: Detector,
    history: PositionHistory,
    config: SessionConfig,
    opponent: Option<(Color, Box<dyn Opponent>)>,
    end_state: Option<EndState>,
    events: Vec<GameEvent>,
    stale_highlights: bool,
}
impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        let mut session = GameSession {
            board: Board::starting_position(),
            detector: Detector::new(config.promotion),
            history: PositionHistory::new(),
            config,
            opponent: None,
            end_state: None,
            events: Vec::new(),
            stale_highlights: true,
        };
        session.reset_to(Board::starting_position());
        session
    }
    /// Hands the moves of `color` to `opponent`. Pieces of that color can no
    /// longer be selected on the physical board.
    pub fn set_opponent(&mut self, color: Color, opponent: Box<dyn Opponent>) {
        info!(%color, "remote opponent attached");
        self.detector.set_remote(Some(color));
        self.opponent = Some((color, opponent));
    }
    pub fn remove_opponent(&mut self) {
        self.detector.set_remote(None);
        self.opponent = None;
    }
    pub fn remote_color(&self) -> Option<Color> {
        self.opponent.as_ref().map(|(color, _)| *color)
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn fen(&self) -> String {
        Fen(self.board).to_string()
    }
    pub fn detector(&self) -> &Detector {
        &self.detector
    }
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
    pub fn end_state(&self) -> Option<EndState> {
        self.end_state
    }
    pub fn is_over(&self) -> bool {
        self.end_state.is_some()
    }
    /// Runs one step of the game loop: samples the sensors, lets the remote
    /// opponent move when it is its turn, advances move detection and hands
    /// every resulting event to `observer`.
    pub fn poll<D, O>(&mut self, driver: &mut D, observer: &mut O)
    where
        D: BoardDriver + ?Sized,
        O: GameObserver + ?Sized,
    {
        driver.read_sensors();
        if self.end_state.is_none() {
            self.poll_opponent();
        }
        if self.stale_highlights {
            self.detector.render(&self.board, driver);
            self.stale_highlights = false;
        }
        if self.end_state.is_none()
            && let Some(detection) = self.detector.poll(&self.board, driver)
        {
            self.handle(detection, driver);
        }
        if self.stale_highlights {
            self.detector.render(&self.board, driver);
            self.stale_highlights = false;
        }
        for event in self.events.drain(..) {
            observer.notify(&event);
        }
    }
    fn poll_opponent(&mut self) {
        let Some((color, opponent)) = &mut self.opponent else {
            return;
        };
        if *color != self.board.turn() || !self.detector.is_idle() {
            return;
        }
        let Some(movement) = opponent.poll_move(&self.board) else {
            return;
        };
        if let Err(err) = self.apply_remote(movement) {
            warn!(%movement, %err, "opponent move refused");
        }
    }
    fn handle<D: BoardDriver + ?Sized>(&mut self, detection: Detection, driver: &mut D) {
        let event = match detection {
            Detection::Selected {
                origin,
                destinations,
            } => GameEvent::Selected {
                origin,
                destinations,
            },
            Detection::Rejected { square, reason } => GameEvent::Rejected { square, reason },
            Detection::Cancelled { origin } => GameEvent::Cancelled { origin },
            Detection::CaptureStarted { origin, target } => {
                GameEvent::CaptureStarted { origin, target }
            }
            Detection::Confirmed(movement) => {
                match self.play(movement, false) {
                    Ok(applied) => {
                        if self.end_state.is_none() {
                            self.detector
                                .follow_through(&applied, &self.board, driver);
                        }
                    }
                    Err(err) => {
                        warn!(%movement, %err, "confirmed move refused");
                        self.detector.reset();
                        self.stale_highlights = true;
                    }
                }
                return;
            }
            Detection::RookPlaced { square } => GameEvent::RookPlaced { square },
            Detection::PromotionSwapped { square } => GameEvent::PromotionSwapped { square },
            Detection::RemoteMoveCompleted(movement) => GameEvent::RemoteMoveExecuted(movement),
        };
        self.events.push(event);
    }
    /// Applies a move made outside the physical board, for example by a
    /// remote client. The player is then guided through carrying it out.
    ///
    /// Refused while the player is still completing a castle or promotion.
    pub fn apply_move(&mut self, movement: Move) -> Result<AppliedMove, SessionError> {
        if matches!(
            self.detector.phase(),
            Phase::AwaitRookMove { .. } | Phase::AwaitPromotionSwap { .. }
        ) {
            return Err(SessionError::FollowThroughPending);
        }
        self.apply_remote(movement)
    }
    /// [`GameSession::apply_move`] in coordinate notation.
    pub fn apply_notation(&mut self, notation: &str) -> Result<AppliedMove, SessionError> {
        self.apply_move(notation.parse()?)
    }
    fn apply_remote(&mut self, movement: Move) -> Result<AppliedMove, SessionError> {
        let applied = self.play(movement, true)?;
        if self.end_state.is_none() {
            self.detector.guide(applied);
            self.stale_highlights = true;
        }
        Ok(applied)
    }
    fn play(&mut self, mut movement: Move, remote: bool) -> Result<AppliedMove, SessionError> {
        if let Some(end_state) = self.end_state {
            return Err(SessionError::GameOver(end_state));
        }
        if !is_legal(&self.board, movement) {
            return Err(SessionError::IllegalMove(movement));
        }
        if movement.promotion.is_none()
            && self.board[movement.origin]
                .is_some_and(|piece| is_promotion(piece, movement.destination.row()))
        {
            movement = movement.with_promotion(self.config.promotion);
        }
        let applied = self
            .board
            .apply_move(movement)
            .ok_or(SessionError::IllegalMove(movement))?;
        info!(movement = %applied.movement, remote, fen = %Fen(self.board), "move played");
        let repetitions = self.history.record(&self.board);
        debug!(repetitions, "position recorded");
        if let Some((_, opponent)) = &mut self.opponent {
            opponent.observe(applied.movement, &self.board);
        }

        self.events.push(if remote {
            GameEvent::RemoteMove(applied)
        } else {
            GameEvent::MoveConfirmed(applied)
        });
        if let Some((square, piece)) = applied.captured {
            self.events.push(GameEvent::Capture { square, piece });
        }
        if applied.en_passant
            && let Some((captured, _)) = applied.captured
        {
            self.events.push(GameEvent::EnPassant { captured });
        }
        if let Some(castling) = applied.castling {
            self.events.push(GameEvent::Castle(castling));
        }
        if let Some(kind) = applied.promotion {
            self.events.push(GameEvent::Promotion {
                square: applied.movement.destination,
                kind,
            });
        }
        self.evaluate();
        Ok(applied)
    }
    fn evaluate(&mut self) {
        let board = &self.board;
        let turn = board.turn();
        let end_state = if is_checkmate(board, turn) {
            Some(EndState::Checkmate { winner: !turn })
        } else if is_stalemate(board, turn) {
            Some(EndState::Draw(DrawReason::Stalemate))
        } else if self.config.fifty_move_rule && is_fifty_move_rule(board) {
            Some(EndState::Draw(DrawReason::FiftyMoveRule))
        } else if self.config.threefold_repetition && self.history.is_threefold(board) {
            Some(EndState::Draw(DrawReason::ThreefoldRepetition))
        } else if self.config.insufficient_material && has_insufficient_material(board) {
            Some(EndState::Draw(DrawReason::InsufficientMaterial))
        } else {
            None
        };
        match end_state {
            Some(end_state) => self.finish(end_state),
            None => {
                if is_in_check(board, turn)
                    && let Some(king) = board.king(turn)
                {
                    debug!(color = %turn, %king, "check");
                    self.events.push(GameEvent::Check { color: turn, king });
                }
            }
        }
    }
    fn finish(&mut self, end_state: EndState) {
        info!(%end_state, "game over");
        self.end_state = Some(end_state);
        self.detector.reset();
        self.stale_highlights = true;
        self.events.push(match end_state {
            EndState::Checkmate { winner } => GameEvent::Checkmate { winner },
            EndState::Resignation { winner } => GameEvent::Resigned { color: !winner },
            EndState::Draw(DrawReason::Stalemate) => GameEvent::Stalemate,
            EndState::Draw(reason) => GameEvent::Draw(reason),
        });
    }
    pub fn resign(&mut self, color: Color) -> Result<(), SessionError> {
        if let Some(end_state) = self.end_state {
            return Err(SessionError::GameOver(end_state));
        }
        self.finish(EndState::Resignation { winner: !color });
        Ok(())
    }
    pub fn agree_draw(&mut self) -> Result<(), SessionError> {
        if let Some(end_state) = self.end_state {
            return Err(SessionError::GameOver(end_state));
        }
        self.finish(EndState::Draw(DrawReason::Agreement));
        Ok(())
    }
    /// Replaces the position. The board is left as it was when `fen` is
    /// invalid.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), SessionError> {
        let Fen(board) = fen.parse()?;
        self.set_board(board);
        Ok(())
    }
    pub fn set_board(&mut self, board: Board) {
        self.reset_to(board);
    }
    /// Replaces the placement, as when pieces are set up by hand. Castling
    /// rights are derived from where the kings and rooks stand.
    pub fn set_grid(&mut self, grid: Grid, turn: Color) {
        self.reset_to(Board::from_grid(grid, turn));
    }
    pub fn new_game(&mut self) {
        self.reset_to(Board::starting_position());
    }
    fn reset_to(&mut self, board: Board) {
        info!(fen = %Fen(board), "position set");
        self.board = board;
        self.history.clear();
        self.history.record(&self.board);
        self.end_state = None;
        self.detector.reset();
        self.stale_highlights = true;
        self.evaluate();
    }
}
impl Default for GameSession {
    fn default() -> Self {
        GameSession::new(SessionConfig::default())
    }
}
#[cfg(test)]
mod test {
    use crate::{
        board::Board,
        color::Color,
        config::SessionConfig,
        coord,
        coord::Coord,
        detection::{Phase, RejectReason},
        driver::{Highlight, MockBoard},
        end_state::{DrawReason, EndState},
        error::SessionError,
        fen::ParseFenError,
        opponent::QueuedOpponent,
        piece::{Piece, PieceKind},
        session::{GameEvent, GameSession},
    };

    fn session(fen: &str) -> (GameSession, MockBoard) {
        let mut session = GameSession::default();
        session.load_fen(fen).unwrap();
        let driver = MockBoard::new(session.board().occupancy());
        (session, driver)
    }
    fn poll(session: &mut GameSession, driver: &mut MockBoard) -> Vec<GameEvent> {
        let mut events = Vec::new();
        session.poll(driver, &mut events);
        events
    }
    fn physical_move(
        session: &mut GameSession,
        driver: &mut MockBoard,
        origin: Coord,
        destination: Coord,
    ) -> Vec<GameEvent> {
        driver.lift(origin);
        let mut events = poll(session, driver);
        driver.place(destination);
        events.extend(poll(session, driver));
        events
    }

    #[test]
    fn fools_mate_on_the_board() {
        let mut session = GameSession::default();
        let mut driver = MockBoard::new(session.board().occupancy());
        physical_move(&mut session, &mut driver, coord!("f2"), coord!("f3"));
        physical_move(&mut session, &mut driver, coord!("e7"), coord!("e5"));
        physical_move(&mut session, &mut driver, coord!("g2"), coord!("g4"));
        let events = physical_move(&mut session, &mut driver, coord!("d8"), coord!("h4"));

        assert!(matches!(events[0], GameEvent::Selected { .. }));
        assert!(matches!(events[1], GameEvent::MoveConfirmed(_)));
        assert_eq!(
            events[2],
            GameEvent::Checkmate {
                winner: Color::Black
            }
        );
        assert_eq!(
            session.end_state(),
            Some(EndState::Checkmate {
                winner: Color::Black
            })
        );

        driver.lift(coord!("e1"));
        assert!(poll(&mut session, &mut driver).is_empty());
        assert!(session.detector().is_idle());
        assert!(matches!(
            session.apply_notation("e1f2"),
            Err(SessionError::GameOver(_))
        ));
    }
    #[test]
    fn physical_double_advance_sets_en_passant_target() {
        let mut session = GameSession::default();
        let mut driver = MockBoard::new(session.board().occupancy());
        physical_move(&mut session, &mut driver, coord!("e2"), coord!("e4"));
        assert_eq!(session.board().en_passant_target(), Some(coord!("e3")));
        physical_move(&mut session, &mut driver, coord!("g8"), coord!("f6"));
        assert_eq!(session.board().en_passant_target(), None);
    }
    #[test]
    fn check_is_reported() {
        let (mut session, mut driver) = session("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let events = physical_move(&mut session, &mut driver, coord!("a1"), coord!("a8"));
        assert_eq!(
            events.last(),
            Some(&GameEvent::Check {
                color: Color::Black,
                king: coord!("e8"),
            })
        );
        assert!(!session.is_over());
    }
    #[test]
    fn capture_events() {
        let (mut session, mut driver) =
            session("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        driver.lift(coord!("e4"));
        poll(&mut session, &mut driver);
        driver.lift(coord!("d5"));
        assert_eq!(
            poll(&mut session, &mut driver),
            vec![GameEvent::CaptureStarted {
                origin: coord!("e4"),
                target: coord!("d5"),
            }]
        );
        driver.place(coord!("d5"));
        let events = poll(&mut session, &mut driver);
        assert!(matches!(events[0], GameEvent::MoveConfirmed(_)));
        assert_eq!(
            events[1],
            GameEvent::Capture {
                square: coord!("d5"),
                piece: Piece::new(Color::Black, PieceKind::Pawn),
            }
        );
        assert_eq!(
            session.fen(),
            "rnbqkbnr/ppp1pppp/8/3P4/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2"
        );
    }
    #[test]
    fn castling_waits_for_rook() {
        let (mut session, mut driver) = session("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        let events = physical_move(&mut session, &mut driver, coord!("e1"), coord!("g1"));
        assert!(events.iter().any(|event| matches!(event, GameEvent::Castle(_))));
        assert!(matches!(
            session.detector().phase(),
            Phase::AwaitRookMove { .. }
        ));
        assert_eq!(
            session.apply_notation("e8d8"),
            Err(SessionError::FollowThroughPending)
        );
        assert_eq!(driver.highlight_at(coord!("h1")), Highlight::Origin);

        let events = physical_move(&mut session, &mut driver, coord!("h1"), coord!("f1"));
        assert_eq!(
            events,
            vec![GameEvent::RookPlaced {
                square: coord!("f1")
            }]
        );
        assert!(session.detector().is_idle());
    }
    #[test]
    fn promotion_uses_configured_piece() {
        let mut session = GameSession::new(SessionConfig {
            promotion: PieceKind::Rook,
            ..SessionConfig::default()
        });
        session.load_fen("8/4P3/8/8/8/2k5/8/K7 w - - 0 1").unwrap();
        let mut driver = MockBoard::new(session.board().occupancy());
        let events = physical_move(&mut session, &mut driver, coord!("e7"), coord!("e8"));
        assert!(events.contains(&GameEvent::Promotion {
            square: coord!("e8"),
            kind: PieceKind::Rook,
        }));
        assert_eq!(
            session.board()[coord!("e8")],
            Some(Piece::new(Color::White, PieceKind::Rook))
        );

        driver.lift(coord!("e8"));
        assert!(poll(&mut session, &mut driver).is_empty());
        driver.place(coord!("e8"));
        assert_eq!(
            poll(&mut session, &mut driver),
            vec![GameEvent::PromotionSwapped {
                square: coord!("e8")
            }]
        );
    }
    #[test]
    fn illegal_move_leaves_board() {
        let mut session = GameSession::default();
        let fen = session.fen();
        assert_eq!(
            session.apply_notation("e2e5"),
            Err(SessionError::IllegalMove("e2e5".parse().unwrap()))
        );
        assert_eq!(session.fen(), fen);
    }
    #[test]
    fn applied_move_is_guided() {
        let mut session = GameSession::default();
        let mut driver = MockBoard::new(session.board().occupancy());
        session.apply_notation("g1f3").unwrap();
        assert!(matches!(
            poll(&mut session, &mut driver)[0],
            GameEvent::RemoteMove(_)
        ));
        assert_eq!(driver.highlight_at(coord!("g1")), Highlight::Origin);
        assert_eq!(driver.highlight_at(coord!("f3")), Highlight::LegalMove);

        driver.lift(coord!("g1"));
        assert!(poll(&mut session, &mut driver).is_empty());
        driver.place(coord!("f3"));
        assert_eq!(
            poll(&mut session, &mut driver),
            vec![GameEvent::RemoteMoveExecuted("g1f3".parse().unwrap())]
        );
    }
    #[test]
    fn remote_opponent_moves_on_its_turn() {
        let mut session = GameSession::default();
        let mut opponent = QueuedOpponent::new();
        opponent.push_notation("e7e5").unwrap();
        session.set_opponent(Color::Black, Box::new(opponent));
        let mut driver = MockBoard::new(session.board().occupancy());

        assert!(poll(&mut session, &mut driver).is_empty());
        physical_move(&mut session, &mut driver, coord!("e2"), coord!("e4"));
        let events = poll(&mut session, &mut driver);
        assert!(matches!(events[0], GameEvent::RemoteMove(_)));
        assert_eq!(session.board().turn(), Color::White);

        let events = physical_move(&mut session, &mut driver, coord!("e7"), coord!("e5"));
        assert_eq!(
            events,
            vec![GameEvent::RemoteMoveExecuted("e7e5".parse().unwrap())]
        );
        assert!(session.detector().is_idle());
    }
    #[test]
    fn remote_pieces_are_not_selectable() {
        let mut session = GameSession::default();
        session.set_opponent(Color::White, Box::new(QueuedOpponent::new()));
        let mut driver = MockBoard::new(session.board().occupancy());
        driver.lift(coord!("e2"));
        assert_eq!(
            poll(&mut session, &mut driver),
            vec![GameEvent::Rejected {
                square: coord!("e2"),
                reason: RejectReason::WrongSide,
            }]
        );
        assert_eq!(driver.highlight_at(coord!("e2")), Highlight::Error);
    }
    #[test]
    fn threefold_repetition() {
        let mut session = GameSession::default();
        let mut driver = MockBoard::default();
        for _ in 0..2 {
            for movement in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                session.apply_notation(movement).unwrap();
            }
        }
        assert_eq!(
            session.end_state(),
            Some(EndState::Draw(DrawReason::ThreefoldRepetition))
        );
        assert_eq!(
            poll(&mut session, &mut driver).last(),
            Some(&GameEvent::Draw(DrawReason::ThreefoldRepetition))
        );
    }
    #[test]
    fn threefold_can_be_disabled() {
        let mut session = GameSession::new(SessionConfig {
            threefold_repetition: false,
            ..SessionConfig::default()
        });
        for _ in 0..3 {
            for movement in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                session.apply_notation(movement).unwrap();
            }
        }
        assert!(!session.is_over());
    }
    #[test]
    fn fifty_move_rule() {
        let fen = "4k3/8/8/8/8/8/8/4K2R w - - 99 80";
        let (mut session, _) = session(fen);
        session.apply_notation("h1h2").unwrap();
        assert_eq!(
            session.end_state(),
            Some(EndState::Draw(DrawReason::FiftyMoveRule))
        );

        let mut session = GameSession::new(SessionConfig {
            fifty_move_rule: false,
            ..SessionConfig::default()
        });
        session.load_fen(fen).unwrap();
        session.apply_notation("h1h2").unwrap();
        assert!(!session.is_over());
    }
    #[test]
    fn insufficient_material_after_capture() {
        let (mut session, _) = session("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1");
        session.apply_notation("e1d2").unwrap();
        assert_eq!(
            session.end_state(),
            Some(EndState::Draw(DrawReason::InsufficientMaterial))
        );
    }
    #[test]
    fn stalemate() {
        let (mut session, _) = session("k7/8/1Q6/8/8/8/8/4K3 w - - 0 1");
        session.apply_notation("b6c7").unwrap();
        assert_eq!(
            session.end_state(),
            Some(EndState::Draw(DrawReason::Stalemate))
        );
    }
    #[test]
    fn resignation_and_agreement() {
        let mut session = GameSession::default();
        let mut driver = MockBoard::default();
        session.resign(Color::White).unwrap();
        assert_eq!(
            session.end_state(),
            Some(EndState::Resignation {
                winner: Color::Black
            })
        );
        assert_eq!(
            poll(&mut session, &mut driver),
            vec![GameEvent::Resigned {
                color: Color::White
            }]
        );
        assert!(session.agree_draw().is_err());

        session.new_game();
        assert!(!session.is_over());
        session.agree_draw().unwrap();
        assert_eq!(
            session.end_state(),
            Some(EndState::Draw(DrawReason::Agreement))
        );
    }
    #[test]
    fn invalid_fen_leaves_board() {
        let mut session = GameSession::default();
        session.apply_notation("e2e4").unwrap();
        let fen = session.fen();
        assert!(matches!(
            session.load_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1"),
            Err(SessionError::Fen(ParseFenError::WrongRowCount(7)))
        ));
        assert_eq!(session.fen(), fen);
    }
    #[test]
    fn loaded_position_clears_game_over() {
        let mut session = GameSession::default();
        session.resign(Color::Black).unwrap();
        session
            .load_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1")
            .unwrap();
        assert!(!session.is_over());
        assert_eq!(session.fen(), "4k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
    }
    #[test]
    fn grid_edit_recomputes_castling() {
        let mut session = GameSession::default();
        let mut grid = *Board::starting_position().grid();
        grid[7][7] = None;
        session.set_grid(grid, Color::White);
        assert_eq!(
            session.fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1 w Qkq - 0 1"
        );
    }
    #[test]
    fn closure_observer() {
        let mut session = GameSession::default();
        let mut driver = MockBoard::new(session.board().occupancy());
        let mut selections = 0;
        driver.lift(coord!("b1"));
        session.poll(&mut driver, &mut |event: &GameEvent| {
            if matches!(event, GameEvent::Selected { .. }) {
                selections += 1;
            }
        });
        assert_eq!(selections, 1);
    }
}
