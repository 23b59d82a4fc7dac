//! Room lookup keyed by caller-provided identifiers.
//!
//! The room map and the membership index are the only structures shared across
//! rooms. Each [`Session`] sits behind its own mutex so intents for one room are
//! applied one at a time without blocking other rooms.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::state::{
    events::{ConnectionId, Outbound, RoomId},
    session::{Session, SessionError},
};

type SharedSession = Arc<Mutex<Session>>;

/// Registry of active rooms and which connection sits in which room.
pub struct SessionRegistry {
    rooms: DashMap<RoomId, SharedSession>,
    memberships: DashMap<ConnectionId, RoomId>,
    /// Rooms counted against `max_rooms`; reserved before a room is inserted.
    reserved_rooms: AtomicUsize,
    max_rooms: usize,
}

impl SessionRegistry {
    /// Create an empty registry holding at most `max_rooms` rooms.
    pub fn new(max_rooms: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
            reserved_rooms: AtomicUsize::new(0),
            max_rooms,
        }
    }

    /// Seat `connection_id` in `room_id`, creating the room on first join.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        room_id: &str,
        name: &str,
    ) -> Result<Vec<Outbound>, SessionError> {
        if let Some(current) = self.room_of(&connection_id) {
            return Err(SessionError::AlreadyInRoom(current));
        }

        loop {
            let session = self.get_or_create(room_id)?;
            let mut guard = session.lock().await;
            if guard.is_closed() {
                // Dissolved between lookup and lock; the map already points elsewhere.
                debug!(room_id, "room closed while joining; retrying");
                continue;
            }

            return match guard.add_player(connection_id, name) {
                Ok(out) => {
                    self.memberships.insert(connection_id, room_id.to_string());
                    Ok(out)
                }
                Err(err) => {
                    if guard.is_empty() {
                        guard.close();
                        self.remove_room(room_id, &session);
                    }
                    Err(err)
                }
            };
        }
    }

    /// Submit a board on behalf of a seated player.
    pub async fn submit_board(
        &self,
        connection_id: ConnectionId,
        room_id: &str,
        cells: &[i64],
    ) -> Result<Vec<Outbound>, SessionError> {
        self.with_member_session(connection_id, room_id, |session| {
            session.submit_board(connection_id, cells)
        })
        .await
    }

    /// Call a number on behalf of a seated player.
    pub async fn make_move(
        &self,
        connection_id: ConnectionId,
        room_id: &str,
        number: i64,
    ) -> Result<Vec<Outbound>, SessionError> {
        self.with_member_session(connection_id, room_id, |session| {
            session.make_move(connection_id, number)
        })
        .await
    }

    /// Record a rematch request on behalf of a seated player.
    pub async fn request_rematch(
        &self,
        connection_id: ConnectionId,
        room_id: &str,
    ) -> Result<Vec<Outbound>, SessionError> {
        self.with_member_session(connection_id, room_id, |session| {
            session.request_rematch(connection_id)
        })
        .await
    }

    /// Dissolve the room `connection_id` sits in, if any.
    ///
    /// Every member is released so they can join again; the remaining player
    /// receives `OpponentLeft`.
    pub async fn leave(&self, connection_id: ConnectionId) -> Vec<Outbound> {
        let Some((_, room_id)) = self.memberships.remove(&connection_id) else {
            return Vec::new();
        };
        let Some(session) = self.lookup(&room_id) else {
            return Vec::new();
        };

        let mut guard = session.lock().await;
        if guard.player(&connection_id).is_none() {
            // The room was dissolved and recreated under the same id meanwhile.
            debug!(%connection_id, %room_id, "stale leave ignored");
            return Vec::new();
        }
        let out = guard.remove_player(&connection_id);
        for remaining in guard.players() {
            self.memberships.remove(&remaining.connection_id);
        }
        // Removing while the session lock is held keeps concurrent joins from
        // finding this closed session again.
        self.remove_room(&room_id, &session);
        info!(%room_id, "room dissolved");
        out
    }

    /// Room the connection currently sits in.
    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        self.memberships
            .get(connection_id)
            .map(|entry| entry.value().clone())
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Read a single room under its lock.
    pub async fn inspect<T>(&self, room_id: &str, read: impl FnOnce(&Session) -> T) -> Option<T> {
        let session = self.lookup(room_id)?;
        let guard = session.lock().await;
        if guard.is_closed() {
            return None;
        }
        Some(read(&guard))
    }

    /// Read every room, ordered by room identifier.
    pub async fn inspect_all<T>(&self, read: impl Fn(&Session) -> T) -> Vec<T> {
        let mut sessions: Vec<(RoomId, SharedSession)> = self
            .rooms
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        sessions.sort_by(|(left, _), (right, _)| left.cmp(right));

        let mut out = Vec::with_capacity(sessions.len());
        for (_, session) in sessions {
            let guard = session.lock().await;
            if !guard.is_closed() {
                out.push(read(&guard));
            }
        }
        out
    }

    fn lookup(&self, room_id: &str) -> Option<SharedSession> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    fn get_or_create(&self, room_id: &str) -> Result<SharedSession, SessionError> {
        if let Some(existing) = self.lookup(room_id) {
            return Ok(existing);
        }

        match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                self.reserve_room()?;
                info!(room_id, "room created");
                let session = Arc::new(Mutex::new(Session::new(room_id)));
                Ok(entry.insert(session).value().clone())
            }
        }
    }

    fn reserve_room(&self) -> Result<(), SessionError> {
        self.reserved_rooms
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |reserved| {
                (reserved < self.max_rooms).then_some(reserved + 1)
            })
            .map(|_| ())
            .map_err(|_| SessionError::RoomLimitReached)
    }

    /// Drop `room_id` only while it still maps to `session`.
    fn remove_room(&self, room_id: &str, session: &SharedSession) {
        if self
            .rooms
            .remove_if(room_id, |_, existing| Arc::ptr_eq(existing, session))
            .is_some()
        {
            self.reserved_rooms.fetch_sub(1, Ordering::AcqRel);
        }
    }

    async fn with_member_session<F>(
        &self,
        connection_id: ConnectionId,
        room_id: &str,
        apply: F,
    ) -> Result<Vec<Outbound>, SessionError>
    where
        F: FnOnce(&mut Session) -> Result<Vec<Outbound>, SessionError>,
    {
        let current = self
            .room_of(&connection_id)
            .ok_or(SessionError::NotInRoom)?;
        if current != room_id {
            return Err(SessionError::RoomNotFound(room_id.to_string()));
        }
        let session = self
            .lookup(&current)
            .ok_or_else(|| SessionError::RoomNotFound(current.clone()))?;

        let mut guard = session.lock().await;
        apply(&mut guard)
    }
}
