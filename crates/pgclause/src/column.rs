//! A column slot in a [`Table`](crate::Table).

use crate::receiver::Receiver;
use crate::value::ValueKind;

/// Expected kind plus the currently bound receiver.
///
/// The kind is fixed at construction so the column can type-check every
/// receiver and filter value bound to it.
#[derive(Debug, Clone)]
pub struct Column {
    kind: ValueKind,
    receiver: Option<Receiver>,
}

impl Column {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            receiver: None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn receiver(&self) -> Option<&Receiver> {
        self.receiver.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.receiver.is_some()
    }

    /// Replace the bound receiver. Kind checks happen in the table.
    pub(crate) fn set_receiver(&mut self, receiver: Receiver) {
        self.receiver = Some(receiver);
    }

    pub(crate) fn clear_receiver(&mut self) {
        self.receiver = None;
    }
}
