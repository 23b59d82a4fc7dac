//! Authoritative state for one room: two player slots, their boards, the turn
//! and the lifecycle phase.
//!
//! Every operation validates against the current phase, the sender and the
//! payload before touching any state, so a rejected intent never mutates the
//! session. Accepted intents return the [`Outbound`] events the transport must
//! deliver.

use std::{fmt, time::SystemTime};

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::state::{
    board::{Board, BoardError, Number, parse_number},
    events::{ConnectionId, Outbound, RoomEvent, RoomId},
    state_machine::{InvalidTransition, SessionEvent, SessionPhase, SessionStateMachine, Snapshot},
};

/// Maximum number of players a room can hold.
pub const MAX_PLAYERS: usize = 2;

/// Player intents, used to describe what was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    JoinRoom,
    SubmitBoard,
    MakeMove,
    PlayAgain,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::JoinRoom => "join_room",
            Intent::SubmitBoard => "submit_board",
            Intent::MakeMove => "make_move",
            Intent::PlayAgain => "play_again",
        };
        f.write_str(name)
    }
}

/// Coarse classification of [`SessionError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed payload, out-of-turn move, duplicate call.
    Validation,
    /// Intent not allowed in the current phase or membership state.
    Protocol,
    RoomFull,
    RoomNotFound,
    /// Server-side limits reached.
    Capacity,
}

/// Reasons an intent is rejected. None of them mutate session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("{intent} is not allowed while the room is {phase}")]
    WrongPhase { intent: Intent, phase: SessionPhase },
    #[error("rematch already requested")]
    RematchAlreadyRequested,
    #[error("you are not in a room")]
    NotInRoom,
    #[error("you are already in room `{0}`")]
    AlreadyInRoom(RoomId),
    #[error("room `{0}` is full")]
    RoomFull(RoomId),
    #[error("room `{0}` not found")]
    RoomNotFound(RoomId),
    #[error("too many active rooms")]
    RoomLimitReached,
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Board(_) | SessionError::InvalidRequest(_) | SessionError::NotYourTurn => {
                ErrorKind::Validation
            }
            SessionError::WrongPhase { .. }
            | SessionError::RematchAlreadyRequested
            | SessionError::NotInRoom
            | SessionError::AlreadyInRoom(_)
            | SessionError::Transition(_) => ErrorKind::Protocol,
            SessionError::RoomFull(_) => ErrorKind::RoomFull,
            SessionError::RoomNotFound(_) => ErrorKind::RoomNotFound,
            SessionError::RoomLimitReached => ErrorKind::Capacity,
        }
    }
}

/// One seat in the room.
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    pub connection_id: ConnectionId,
    pub name: String,
    pub board: Board,
    pub ready: bool,
}

/// A room and everything it owns.
#[derive(Debug)]
pub struct Session {
    room_id: RoomId,
    players: IndexMap<ConnectionId, PlayerSlot>,
    machine: SessionStateMachine,
    turn: Option<ConnectionId>,
    winner: Option<String>,
    rematch_requests: IndexSet<ConnectionId>,
    history: Vec<Number>,
    closed: bool,
    created_at: SystemTime,
}

impl Session {
    /// Create an empty room in the waiting phase.
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        Self {
            room_id: room_id.into(),
            players: IndexMap::new(),
            machine: SessionStateMachine::new(),
            turn: None,
            winner: None,
            rematch_requests: IndexSet::new(),
            history: Vec::new(),
            closed: false,
            created_at: SystemTime::now(),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    /// Connection allowed to call next; only set while playing or finished.
    pub fn turn(&self) -> Option<ConnectionId> {
        self.turn
    }

    /// Display name of the winner; only set while finished.
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn rematch_requests(&self) -> &IndexSet<ConnectionId> {
        &self.rematch_requests
    }

    /// Numbers called in the current game instance, in call order.
    pub fn history(&self) -> &[Number] {
        &self.history
    }

    /// Players in join order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerSlot> {
        self.players.values()
    }

    pub fn player(&self, connection_id: &ConnectionId) -> Option<&PlayerSlot> {
        self.players.get(connection_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// A closed session has been dissolved and must not accept intents.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Mark the session as dissolved.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Seat a new player. The second seat moves the room into setup.
    pub fn add_player(
        &mut self,
        connection_id: ConnectionId,
        name: impl Into<String>,
    ) -> Result<Vec<Outbound>, SessionError> {
        if self.closed {
            return Err(SessionError::RoomNotFound(self.room_id.clone()));
        }
        if self.players.contains_key(&connection_id) {
            return Err(SessionError::AlreadyInRoom(self.room_id.clone()));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(SessionError::RoomFull(self.room_id.clone()));
        }
        if self.phase() != SessionPhase::Waiting {
            return Err(SessionError::WrongPhase {
                intent: Intent::JoinRoom,
                phase: self.phase(),
            });
        }

        let name = name.into();
        self.players.insert(
            connection_id,
            PlayerSlot {
                connection_id,
                name: name.clone(),
                board: Board::new(),
                ready: false,
            },
        );
        info!(room_id = %self.room_id, %connection_id, %name, "player joined room");

        if self.players.len() == MAX_PLAYERS {
            self.machine.apply(SessionEvent::OpponentJoined)?;
            info!(room_id = %self.room_id, "room is full; entering setup");
        }

        Ok(vec![self.broadcast(RoomEvent::PlayerJoined {
            count: self.players.len(),
            players: self.players.values().map(|p| p.name.clone()).collect(),
        })])
    }

    /// Store a player's arrangement and mark them ready.
    ///
    /// A ready player may resubmit until the other player is ready too. Play
    /// starts once both boards are in, with the first joiner calling first.
    pub fn submit_board(
        &mut self,
        connection_id: ConnectionId,
        cells: &[i64],
    ) -> Result<Vec<Outbound>, SessionError> {
        self.require_member(&connection_id)?;
        self.require_phase(Intent::SubmitBoard, SessionPhase::Setup)?;

        let mut board = Board::new();
        board.submit(cells)?;

        {
            let slot = self
                .players
                .get_mut(&connection_id)
                .ok_or(SessionError::NotInRoom)?;
            if slot.ready {
                debug!(room_id = %self.room_id, %connection_id, "replacing submitted board");
            }
            slot.board = board;
            slot.ready = true;
        }
        info!(room_id = %self.room_id, %connection_id, "board submitted");

        let all_ready = self.players.len() == MAX_PLAYERS
            && self
                .players
                .values()
                .all(|p| p.ready && p.board.is_complete());
        if !all_ready {
            let slot = self
                .players
                .get(&connection_id)
                .ok_or(SessionError::NotInRoom)?;
            return Ok(vec![Self::board_state(slot)]);
        }

        let first = *self
            .players
            .keys()
            .next()
            .ok_or(SessionError::NotInRoom)?;
        self.machine.apply(SessionEvent::BoardsReady)?;
        self.turn = Some(first);
        self.history.clear();
        info!(room_id = %self.room_id, turn = %first, "game started");

        let mut out = vec![self.broadcast(RoomEvent::GameStarted { turn: first })];
        out.extend(self.players.values().map(Self::board_state));
        Ok(out)
    }

    /// Call `number` for both boards on behalf of the player whose turn it is.
    ///
    /// The mover's own board is checked for a completed line first, so the
    /// mover wins when a single call completes lines on both boards.
    pub fn make_move(
        &mut self,
        connection_id: ConnectionId,
        number: i64,
    ) -> Result<Vec<Outbound>, SessionError> {
        self.require_member(&connection_id)?;
        self.require_phase(Intent::MakeMove, SessionPhase::Playing)?;
        if self.turn != Some(connection_id) {
            return Err(SessionError::NotYourTurn);
        }
        let number = parse_number(number)?;
        if self.history.contains(&number) {
            return Err(BoardError::InvalidMove(format!(
                "number {number} has already been called"
            ))
            .into());
        }
        let opponent = self
            .opponent_of(&connection_id)
            .ok_or(SessionError::NotInRoom)?;

        for slot in self.players.values_mut() {
            slot.board.call(number)?;
        }
        self.history.push(number);
        debug!(room_id = %self.room_id, %connection_id, number, "number called");

        let winner = [connection_id, opponent]
            .iter()
            .filter_map(|id| self.players.get(id))
            .find(|slot| slot.board.has_win())
            .map(|slot| slot.name.clone());

        let event = match winner {
            Some(name) => {
                self.machine.apply(SessionEvent::LineCompleted)?;
                self.rematch_requests.clear();
                self.winner = Some(name.clone());
                info!(room_id = %self.room_id, winner = %name, "game finished");
                RoomEvent::MoveMade {
                    number,
                    game_over: true,
                    winner: Some(name),
                    next_turn: None,
                }
            }
            None => {
                self.turn = Some(opponent);
                RoomEvent::MoveMade {
                    number,
                    game_over: false,
                    winner: None,
                    next_turn: Some(opponent),
                }
            }
        };

        let mut out = vec![self.broadcast(event)];
        out.extend(self.players.values().map(Self::board_state));
        Ok(out)
    }

    /// Record a rematch request; once both players asked, reset to setup.
    pub fn request_rematch(
        &mut self,
        connection_id: ConnectionId,
    ) -> Result<Vec<Outbound>, SessionError> {
        self.require_member(&connection_id)?;
        self.require_phase(Intent::PlayAgain, SessionPhase::Finished)?;
        if self.rematch_requests.contains(&connection_id) {
            return Err(SessionError::RematchAlreadyRequested);
        }

        self.rematch_requests.insert(connection_id);
        info!(
            room_id = %self.room_id,
            %connection_id,
            count = self.rematch_requests.len(),
            "rematch requested"
        );
        let mut out = vec![self.broadcast(RoomEvent::RematchStatus {
            count: self.rematch_requests.len(),
        })];

        let everyone_agreed = self.players.len() == MAX_PLAYERS
            && self
                .players
                .keys()
                .all(|id| self.rematch_requests.contains(id));
        if everyone_agreed {
            self.machine.apply(SessionEvent::RematchAgreed)?;
            self.reset_game();
            info!(room_id = %self.room_id, "rematch agreed; back to setup");
            out.push(self.broadcast(RoomEvent::GameReset));
        }

        Ok(out)
    }

    /// Remove a player and dissolve the room, notifying whoever remains.
    ///
    /// Returns no events when `connection_id` is not seated here.
    pub fn remove_player(&mut self, connection_id: &ConnectionId) -> Vec<Outbound> {
        if self.players.shift_remove(connection_id).is_none() {
            return Vec::new();
        }
        self.close();
        info!(room_id = %self.room_id, %connection_id, "player left; dissolving room");

        if self.players.is_empty() {
            Vec::new()
        } else {
            vec![self.broadcast(RoomEvent::OpponentLeft)]
        }
    }

    fn reset_game(&mut self) {
        for slot in self.players.values_mut() {
            slot.board.clear();
            slot.ready = false;
        }
        self.rematch_requests.clear();
        self.winner = None;
        self.turn = None;
        self.history.clear();
    }

    fn opponent_of(&self, connection_id: &ConnectionId) -> Option<ConnectionId> {
        self.players.keys().find(|id| *id != connection_id).copied()
    }

    fn require_member(&self, connection_id: &ConnectionId) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::RoomNotFound(self.room_id.clone()));
        }
        if self.players.contains_key(connection_id) {
            Ok(())
        } else {
            Err(SessionError::NotInRoom)
        }
    }

    fn require_phase(&self, intent: Intent, expected: SessionPhase) -> Result<(), SessionError> {
        let phase = self.phase();
        if phase == expected {
            Ok(())
        } else {
            Err(SessionError::WrongPhase { intent, phase })
        }
    }

    fn broadcast(&self, event: RoomEvent) -> Outbound {
        Outbound::new(self.players.keys().copied().collect(), event)
    }

    fn board_state(slot: &PlayerSlot) -> Outbound {
        Outbound::to(
            slot.connection_id,
            RoomEvent::BoardState {
                cells: slot.board.cells().to_vec(),
                called: slot.board.called().iter().copied().collect(),
                completed_lines: slot.board.completed_lines(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn ordered() -> Vec<i64> {
        (1..=25).collect()
    }

    /// Column-major layout: numbers 1..=5 fill column 0 instead of row 0.
    fn transposed() -> Vec<i64> {
        (0..25).map(|i| ((i % 5) * 5 + i / 5 + 1) as i64).collect()
    }

    fn setup_room() -> (Session, ConnectionId, ConnectionId) {
        let mut session = Session::new("42");
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        session.add_player(a, "A").unwrap();
        session.add_player(b, "B").unwrap();
        (session, a, b)
    }

    fn playing_room(board_a: &[i64], board_b: &[i64]) -> (Session, ConnectionId, ConnectionId) {
        let (mut session, a, b) = setup_room();
        session.submit_board(a, board_a).unwrap();
        session.submit_board(b, board_b).unwrap();
        (session, a, b)
    }

    fn move_made(out: &[Outbound]) -> &RoomEvent {
        out.iter()
            .map(|o| &o.event)
            .find(|e| matches!(e, RoomEvent::MoveMade { .. }))
            .expect("move_made event")
    }

    #[test]
    fn second_join_enters_setup() {
        let mut session = Session::new("room");
        let a = Uuid::new_v4();
        let out = session.add_player(a, "A").unwrap();
        assert_eq!(session.phase(), SessionPhase::Waiting);
        assert_eq!(
            out[0].event,
            RoomEvent::PlayerJoined {
                count: 1,
                players: vec!["A".into()]
            }
        );

        let b = Uuid::new_v4();
        let out = session.add_player(b, "B").unwrap();
        assert_eq!(session.phase(), SessionPhase::Setup);
        assert_eq!(out[0].recipients, vec![a, b]);
    }

    #[test]
    fn third_join_is_rejected() {
        let (mut session, _, _) = setup_room();
        let err = session.add_player(Uuid::new_v4(), "C").unwrap_err();
        assert_eq!(err, SessionError::RoomFull("42".into()));
        assert_eq!(err.kind(), ErrorKind::RoomFull);
        assert_eq!(session.player_count(), 2);
    }

    #[test]
    fn first_ready_player_waits() {
        let (mut session, a, _) = setup_room();
        let out = session.submit_board(a, &ordered()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Setup);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].recipients, vec![a]);
        assert!(session.player(&a).unwrap().ready);
        assert_eq!(session.turn(), None);
    }

    #[test]
    fn both_ready_starts_game_with_first_joiner() {
        let (session, a, _) = playing_room(&ordered(), &transposed());
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.turn(), Some(a));
    }

    #[test]
    fn game_start_is_broadcast_and_boards_are_private() {
        let (mut session, a, b) = setup_room();
        session.submit_board(a, &ordered()).unwrap();
        let out = session.submit_board(b, &transposed()).unwrap();

        assert_eq!(out[0].event, RoomEvent::GameStarted { turn: a });
        assert_eq!(out[0].recipients, vec![a, b]);
        let private: Vec<_> = out[1..].iter().map(|o| o.recipients.clone()).collect();
        assert_eq!(private, vec![vec![a], vec![b]]);
    }

    #[test]
    fn invalid_board_leaves_player_unready() {
        let (mut session, a, _) = setup_room();
        let err = session.submit_board(a, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!session.player(&a).unwrap().ready);
    }

    #[test]
    fn submit_rejected_outside_setup() {
        let mut session = Session::new("solo");
        let a = Uuid::new_v4();
        session.add_player(a, "A").unwrap();
        let err = session.submit_board(a, &ordered()).unwrap_err();
        assert_eq!(
            err,
            SessionError::WrongPhase {
                intent: Intent::SubmitBoard,
                phase: SessionPhase::Waiting
            }
        );

        let (mut session, a, _) = playing_room(&ordered(), &transposed());
        let err = session.submit_board(a, &ordered()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn outsiders_cannot_act() {
        let (mut session, _, _) = playing_room(&ordered(), &transposed());
        let stranger = Uuid::new_v4();
        assert_eq!(
            session.make_move(stranger, 1).unwrap_err(),
            SessionError::NotInRoom
        );
    }

    #[test]
    fn turns_alternate() {
        let (mut session, a, b) = playing_room(&ordered(), &transposed());
        session.make_move(a, 13).unwrap();
        assert_eq!(session.turn(), Some(b));
        session.make_move(b, 7).unwrap();
        assert_eq!(session.turn(), Some(a));
        assert_eq!(session.history(), &[13, 7]);
    }

    #[test]
    fn out_of_turn_move_is_rejected_without_mutation() {
        let (mut session, _, b) = playing_room(&ordered(), &transposed());
        let err = session.make_move(b, 1).unwrap_err();
        assert_eq!(err, SessionError::NotYourTurn);
        assert!(session.history().is_empty());
        assert!(session.players().all(|p| p.board.called().is_empty()));
    }

    #[test]
    fn duplicate_call_is_rejected() {
        let (mut session, a, b) = playing_room(&ordered(), &transposed());
        session.make_move(a, 9).unwrap();
        session.make_move(b, 10).unwrap();

        let err = session.make_move(a, 9).unwrap_err();
        assert!(matches!(err, SessionError::Board(BoardError::InvalidMove(_))));
        assert_eq!(session.turn(), Some(a));
        assert_eq!(session.phase(), SessionPhase::Playing);
    }

    #[test]
    fn out_of_range_call_is_rejected() {
        let (mut session, a, _) = playing_room(&ordered(), &transposed());
        assert!(session.make_move(a, 0).is_err());
        assert!(session.make_move(a, 26).is_err());
        assert_eq!(session.turn(), Some(a));
    }

    #[test]
    fn calls_mark_both_boards() {
        let (mut session, a, b) = playing_room(&ordered(), &transposed());
        session.make_move(a, 4).unwrap();
        assert!(session.player(&a).unwrap().board.called().contains(&4));
        assert!(session.player(&b).unwrap().board.called().contains(&4));
    }

    #[test]
    fn completing_a_row_finishes_the_game() {
        let (mut session, a, b) = playing_room(&ordered(), &transposed());
        // A calls 1,3,5 and B calls 2,4: A's row 0 completes on A's third call.
        for (player, number) in [(a, 1), (b, 2), (a, 3), (b, 4)] {
            session.make_move(player, number).unwrap();
        }
        let out = session.make_move(a, 5).unwrap();

        assert_eq!(session.phase(), SessionPhase::Finished);
        assert_eq!(session.winner(), Some("A"));
        assert_eq!(
            move_made(&out),
            &RoomEvent::MoveMade {
                number: 5,
                game_over: true,
                winner: Some("A".into()),
                next_turn: None,
            }
        );
        assert_eq!(session.turn(), Some(a));
        assert!(matches!(
            session.make_move(b, 6),
            Err(SessionError::WrongPhase { .. })
        ));
    }

    #[test]
    fn mover_wins_when_both_boards_complete_a_line() {
        // 1..=5 fill column 0 on A's board and row 0 on B's board.
        let (mut session, a, b) = playing_room(&transposed(), &ordered());
        for (player, number) in [(a, 1), (b, 2), (a, 3), (b, 4)] {
            session.make_move(player, number).unwrap();
        }
        session.make_move(a, 5).unwrap();
        assert_eq!(session.winner(), Some("A"));

        let (mut session, a, b) = playing_room(&transposed(), &ordered());
        for (player, number) in [(a, 1), (b, 2), (a, 3), (b, 6), (a, 4)] {
            session.make_move(player, number).unwrap();
        }
        session.make_move(b, 5).unwrap();
        assert_eq!(session.winner(), Some("B"));
    }

    #[test]
    fn non_mover_wins_when_only_their_line_completes() {
        let mut spread = ordered();
        // Swap 5 and 25 so A's row 0 needs 25 instead of 5.
        spread.swap(4, 24);
        let (mut session, a, b) = playing_room(&spread, &ordered());
        for (player, number) in [(a, 1), (b, 2), (a, 3), (b, 4)] {
            session.make_move(player, number).unwrap();
        }
        let out = session.make_move(a, 5).unwrap();
        assert_eq!(session.winner(), Some("B"));
        assert!(matches!(
            move_made(&out),
            RoomEvent::MoveMade { game_over: true, winner: Some(w), .. } if w == "B"
        ));
    }

    #[test]
    fn board_state_reports_completed_lines() {
        let (mut session, a, b) = playing_room(&ordered(), &transposed());
        for (player, number) in [(a, 1), (b, 2), (a, 3), (b, 4)] {
            session.make_move(player, number).unwrap();
        }
        let out = session.make_move(a, 5).unwrap();
        let lines_for = |id: ConnectionId| {
            out.iter()
                .find_map(|o| match &o.event {
                    RoomEvent::BoardState {
                        completed_lines, ..
                    } if o.recipients == vec![id] => Some(*completed_lines),
                    _ => None,
                })
                .unwrap()
        };
        assert_eq!(lines_for(a), 1);
        assert_eq!(lines_for(b), 1);
    }

    fn finished_room() -> (Session, ConnectionId, ConnectionId) {
        let (mut session, a, b) = playing_room(&ordered(), &transposed());
        for (player, number) in [(a, 1), (b, 2), (a, 3), (b, 4), (a, 5)] {
            session.make_move(player, number).unwrap();
        }
        (session, a, b)
    }

    #[test]
    fn rematch_needs_both_players() {
        let (mut session, a, b) = finished_room();

        let out = session.request_rematch(a).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].event, RoomEvent::RematchStatus { count: 1 });
        assert_eq!(session.phase(), SessionPhase::Finished);
        assert_eq!(
            session.request_rematch(a).unwrap_err(),
            SessionError::RematchAlreadyRequested
        );

        let out = session.request_rematch(b).unwrap();
        assert_eq!(out[0].event, RoomEvent::RematchStatus { count: 2 });
        assert_eq!(out[1].event, RoomEvent::GameReset);
        assert_eq!(session.phase(), SessionPhase::Setup);
    }

    #[test]
    fn reset_clears_every_game_field() {
        let (mut session, a, b) = finished_room();
        session.request_rematch(b).unwrap();
        session.request_rematch(a).unwrap();

        assert_eq!(session.winner(), None);
        assert_eq!(session.turn(), None);
        assert!(session.history().is_empty());
        assert!(session.rematch_requests().is_empty());
        for player in session.players() {
            assert!(!player.ready);
            assert!(!player.board.is_complete());
            assert!(player.board.called().is_empty());
        }
    }

    #[test]
    fn reset_after_second_joiner_won() {
        let mut spread = ordered();
        spread.swap(4, 24);
        let (mut session, a, b) = playing_room(&spread, &ordered());
        for (player, number) in [(a, 1), (b, 2), (a, 3), (b, 4), (a, 5)] {
            session.make_move(player, number).unwrap();
        }
        assert_eq!(session.winner(), Some("B"));

        session.request_rematch(a).unwrap();
        let out = session.request_rematch(b).unwrap();
        assert!(out.iter().any(|o| o.event == RoomEvent::GameReset));
        assert_eq!(session.phase(), SessionPhase::Setup);
        assert_eq!(session.winner(), None);
        assert!(session.history().is_empty());
        assert!(session.rematch_requests().is_empty());
        assert!(session.players().all(|p| !p.ready && p.board.called().is_empty()));

        session.submit_board(b, &ordered()).unwrap();
        session.submit_board(a, &spread).unwrap();
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.turn(), Some(a));
    }

    #[test]
    fn second_game_after_rematch_is_independent() {
        let (mut session, a, b) = finished_room();
        session.request_rematch(a).unwrap();
        session.request_rematch(b).unwrap();

        session.submit_board(a, &transposed()).unwrap();
        session.submit_board(b, &ordered()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Playing);
        // Numbers from the previous game are callable again.
        session.make_move(a, 1).unwrap();
        assert_eq!(session.history(), &[1]);
    }

    #[test]
    fn rematch_rejected_while_playing() {
        let (mut session, a, _) = playing_room(&ordered(), &transposed());
        assert!(matches!(
            session.request_rematch(a),
            Err(SessionError::WrongPhase {
                intent: Intent::PlayAgain,
                ..
            })
        ));
    }

    #[test]
    fn leaving_notifies_remaining_player_and_closes() {
        let (mut session, a, b) = playing_room(&ordered(), &transposed());
        let out = session.remove_player(&b);
        assert_eq!(out, vec![Outbound::to(a, RoomEvent::OpponentLeft)]);
        assert!(session.is_closed());
        assert!(matches!(
            session.make_move(a, 1),
            Err(SessionError::RoomNotFound(_))
        ));
        assert!(matches!(
            session.add_player(Uuid::new_v4(), "C"),
            Err(SessionError::RoomNotFound(_))
        ));
    }

    #[test]
    fn removing_unknown_player_is_a_no_op() {
        let (mut session, _, _) = setup_room();
        assert!(session.remove_player(&Uuid::new_v4()).is_empty());
        assert!(!session.is_closed());
    }
}
