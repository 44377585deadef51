//! The lifecycle of a single user-initiated contract operation.
//!
//! Every control that triggers an operation owns one [`Control`] slot. The slot
//! is a `watch` channel, so a UI can subscribe to it and render the current
//! [`Operation`] (spinner, transaction link, error message) without holding
//! any state of its own.

use {
    crate::domain::{eth, wallet},
    tokio::sync::watch,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Read,
    Write,
}

/// The state of the last operation started from a control.
///
/// `Confirmed` and `Failed` are terminal. A new operation may only start from
/// a terminal or idle state.
#[derive(Clone, Debug, Default)]
pub enum Operation {
    #[default]
    Idle,
    InFlight {
        kind: Kind,
        /// Set as soon as a write has been broadcast, before it is confirmed.
        tx: Option<eth::TxHash>,
    },
    Confirmed {
        kind: Kind,
        tx: Option<eth::TxHash>,
    },
    Failed {
        kind: Kind,
        tx: Option<eth::TxHash>,
        error: wallet::Error,
    },
}

impl Operation {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Operation::InFlight { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Operation::Confirmed { .. } | Operation::Failed { .. })
    }

    pub fn tx(&self) -> Option<eth::TxHash> {
        match self {
            Operation::Idle => None,
            Operation::InFlight { tx, .. }
            | Operation::Confirmed { tx, .. }
            | Operation::Failed { tx, .. } => *tx,
        }
    }

    pub fn error(&self) -> Option<&wallet::Error> {
        match self {
            Operation::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// A single operation slot. Starting an operation while another one is in
/// flight is refused, which is what keeps a button from submitting twice.
#[derive(Debug)]
pub struct Control {
    state: watch::Sender<Operation>,
}

impl Default for Control {
    fn default() -> Self {
        Self::new()
    }
}

impl Control {
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(Operation::Idle),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Operation> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Operation {
        self.state.borrow().clone()
    }

    /// Moves the slot into flight. Fails with [`wallet::Error::Busy`] if an
    /// operation is already in flight.
    pub fn begin(&self, kind: Kind) -> Result<Pending<'_>, wallet::Error> {
        let mut busy = false;
        self.state.send_if_modified(|operation| {
            if operation.is_in_flight() {
                busy = true;
                return false;
            }
            *operation = Operation::InFlight { kind, tx: None };
            true
        });
        if busy {
            return Err(wallet::Error::Busy);
        }
        Ok(Pending {
            control: self,
            kind,
            tx: None,
            done: false,
        })
    }
}

/// An in-flight operation. Dropping it without finishing (e.g. because the
/// future driving it was cancelled) marks the operation as failed so the slot
/// does not stay busy forever.
#[derive(Debug)]
pub struct Pending<'a> {
    control: &'a Control,
    kind: Kind,
    tx: Option<eth::TxHash>,
    done: bool,
}

impl Pending<'_> {
    /// Publishes the transaction hash of a broadcast write.
    pub fn broadcast(&mut self, tx: eth::TxHash) {
        self.tx = Some(tx);
        self.control.state.send_replace(Operation::InFlight {
            kind: self.kind,
            tx: Some(tx),
        });
    }

    pub fn confirm(mut self) {
        self.done = true;
        self.control.state.send_replace(Operation::Confirmed {
            kind: self.kind,
            tx: self.tx,
        });
    }

    pub fn fail(mut self, error: wallet::Error) {
        self.done = true;
        self.control.state.send_replace(Operation::Failed {
            kind: self.kind,
            tx: self.tx,
            error,
        });
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.control.state.send_replace(Operation::Failed {
                kind: self.kind,
                tx: self.tx,
                error: wallet::Error::Other("operation was abandoned".into()),
            });
        }
    }
}
