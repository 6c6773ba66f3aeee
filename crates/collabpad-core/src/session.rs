//! Local join-by-code session roster.
//!
//! Nothing here touches the network. A session is a code plus the list of
//! participants this client knows about, kept only for display.

use crate::elements::SerializableColor;
use crate::poll::UserId;
use kurbo::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbols a session code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_LENGTH: usize = 6;

/// Colors handed out to participants.
pub const PARTICIPANT_COLORS: [SerializableColor; 8] = [
    SerializableColor::rgb(0x10, 0xB9, 0x81),
    SerializableColor::rgb(0x3B, 0x82, 0xF6),
    SerializableColor::rgb(0xF5, 0x9E, 0x0B),
    SerializableColor::rgb(0xEF, 0x44, 0x44),
    SerializableColor::rgb(0x8B, 0x5C, 0xF6),
    SerializableColor::rgb(0xEC, 0x48, 0x99),
    SerializableColor::rgb(0x14, 0xB8, 0xA6),
    SerializableColor::rgb(0xF9, 0x73, 0x16),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid session code: {0:?}")]
    InvalidCode(String),
    #[error("not in a session")]
    NotInSession,
}

/// Generate a random join code.
pub fn generate_session_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Trim and uppercase a code typed by the user.
///
/// Only the length is checked: any six characters name a session.
pub fn normalize_code(code: &str) -> Result<String, SessionError> {
    let normalized = code.trim().to_uppercase();
    if normalized.chars().count() == CODE_LENGTH {
        Ok(normalized)
    } else {
        Err(SessionError::InvalidCode(code.to_string()))
    }
}

fn random_color() -> SerializableColor {
    PARTICIPANT_COLORS[rand::rng().random_range(0..PARTICIPANT_COLORS.len())]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: UserId,
    pub name: String,
    pub color: SerializableColor,
    /// Last known pointer, canvas space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub code: String,
    pub participants: Vec<Participant>,
}

impl Session {
    pub fn participant(&self, id: UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    fn upsert(&mut self, id: UserId, name: &str) {
        self.participants.retain(|p| p.id != id);
        self.participants.push(Participant {
            id,
            name: name.to_string(),
            color: random_color(),
            cursor: None,
        });
    }
}

/// Holds the session this client is in, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    session: Option<Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn code(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.code.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start a new session with the local user as its only participant.
    pub fn create(&mut self, user: UserId, name: &str) -> String {
        let code = generate_session_code();
        let mut session = Session {
            code: code.clone(),
            participants: Vec::new(),
        };
        session.upsert(user, name);
        self.session = Some(session);
        log::info!("created session {code}");
        code
    }

    /// Join a session by code. Any well-formed code is accepted.
    pub fn join(&mut self, code: &str, user: UserId, name: &str) -> Result<String, SessionError> {
        let code = normalize_code(code)?;
        let session = match self.session.take() {
            Some(session) if session.code == code => session,
            _ => Session {
                code: code.clone(),
                participants: Vec::new(),
            },
        };
        let session = self.session.insert(session);
        session.upsert(user, name);
        log::info!("joined session {code}");
        Ok(code)
    }

    /// Drop the local participant and forget the code.
    pub fn leave(&mut self, user: UserId) -> Result<(), SessionError> {
        let mut session = self.session.take().ok_or(SessionError::NotInSession)?;
        session.participants.retain(|p| p.id != user);
        log::info!("left session {}", session.code);
        Ok(())
    }

    /// Record the local participant's pointer.
    pub fn update_cursor(&mut self, user: UserId, position: Point) -> bool {
        self.participant_mut(user)
            .map(|p| p.cursor = Some(position))
            .is_some()
    }

    pub fn rename(&mut self, user: UserId, name: &str) -> bool {
        self.participant_mut(user)
            .map(|p| p.name = name.to_string())
            .is_some()
    }

    fn participant_mut(&mut self, user: UserId) -> Option<&mut Participant> {
        self.session
            .as_mut()?
            .participants
            .iter_mut()
            .find(|p| p.id == user)
    }
}
