//! Password gate.
//!
//! A plaintext equality check against the configured password. There is no hashing and no rate
//! limiting; a deployment exposed to untrusted users would need both.

/// Message shown after a failed attempt.
pub const ACCESS_DENIED: &str = "ACCESS DENIED";

/// Gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// The editing UI is hidden.
    Locked,
    /// The editing UI is available.
    Unlocked,
}

/// The lock screen's logic.
#[derive(Debug, Clone)]
pub struct PasswordGate {
    password: String,
    state: GateState,
    message: Option<&'static str>,
}

impl PasswordGate {
    /// A locked gate expecting `password`.
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            state: GateState::Locked,
            message: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Returns `true` once unlocked.
    pub fn is_unlocked(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Message to show on the lock screen, if any.
    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// Compare `input` with the password; unlock on match.
    pub fn try_unlock(&mut self, input: &str) -> bool {
        if input == self.password {
            self.open();
            true
        } else {
            self.message = Some(ACCESS_DENIED);
            false
        }
    }

    /// Unlock without a password (the demo entry point).
    pub fn open(&mut self) {
        self.state = GateState::Unlocked;
        self.message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        let mut gate = PasswordGate::new("ADMIN");
        assert!(!gate.try_unlock("admin"));
        assert!(!gate.try_unlock("ADMIN "));
        assert_eq!(gate.state(), GateState::Locked);
        assert_eq!(gate.message(), Some(ACCESS_DENIED));

        assert!(gate.try_unlock("ADMIN"));
        assert!(gate.is_unlocked());
        assert_eq!(gate.message(), None);
    }
}
