//! Transaction id allocation and session state

use bytes::Bytes;

use super::SessionState;
use crate::protocol::{Container, Error, Result};

/// Stamps outgoing containers with transaction ids.
///
/// Ids start at 0 and advance by one for every command container. A data
/// container reuses the id of the command it belongs to.
#[derive(Debug, Default)]
pub struct TransactionManager {
    next_id: u32,
    wrapped: bool,
    state: SessionState,
}

impl TransactionManager {
    /// Fresh manager, session closed, next id 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next command will carry
    #[must_use]
    pub const fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Session state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a session is open
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open)
    }

    /// Build a command container and advance the id
    ///
    /// The id is only consumed once the container has been built.
    pub fn command(&mut self, code: u16, parameters: &[u32]) -> Result<Container> {
        let container = Container::command(code, self.next_id, parameters)?;
        self.advance();
        Ok(container)
    }

    /// Build a command and its outbound data container under one id
    ///
    /// Both containers are built before the id is consumed, so an oversized
    /// payload leaves the sequence untouched.
    pub fn command_with_data(
        &mut self,
        code: u16,
        parameters: &[u32],
        payload: impl Into<Bytes>,
    ) -> Result<(Container, Container)> {
        let command = Container::command(code, self.next_id, parameters)?;
        let data = Container::data(code, self.next_id, payload)?;
        self.advance();
        Ok((command, data))
    }

    /// Whether `id` has already been handed out
    ///
    /// Before the counter wraps this is every id below the next one. After a
    /// wrap, ids within half the id space behind the last issued id count.
    #[must_use]
    pub const fn is_issued(&self, id: u32) -> bool {
        if self.wrapped {
            self.next_id.wrapping_sub(1).wrapping_sub(id) < 1 << 31
        } else {
            id < self.next_id
        }
    }

    /// Check an id echoed by the device against the transaction in flight
    ///
    /// Returns `true` for `current`, `false` for an earlier transaction, and
    /// `TransactionMismatch` for an id this session never issued.
    pub fn check_echo(&self, current: u32, echoed: u32) -> Result<bool> {
        if echoed == current {
            Ok(true)
        } else if self.is_issued(echoed) {
            Ok(false)
        } else {
            Err(Error::TransactionMismatch {
                expected: current,
                found: echoed,
            })
        }
    }

    fn advance(&mut self) {
        self.next_id = self.next_id.wrapping_add(1);
        if self.next_id == 0 {
            self.wrapped = true;
        }
    }

    pub(crate) fn mark_open(&mut self) {
        self.state = SessionState::Open;
    }

    pub(crate) fn mark_closed(&mut self) {
        self.state = SessionState::Closed;
    }
}
