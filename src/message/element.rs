//! The unit of storage inside a mailbox: an erased payload plus routing metadata.

use std::fmt;

use crate::message::traits::AnyMessage;
use crate::util::{ActorAddress, MessageId};

/// One entry in a mailbox queue or cache segment.
///
/// Carries everything the classifier and dispatch loop need without knowing the
/// payload's concrete type: the request/response id (`MessageId::NONE` for plain
/// casts), and the sender's address (`None` for messages sent by non-actor code,
/// e.g. from outside the runtime).
pub struct MailboxElement {
    payload: Box<dyn AnyMessage>,
    mid: MessageId,
    sender: Option<ActorAddress>,
}

impl MailboxElement {
    /// Build a new element. `mid` is `MessageId::NONE` for a fire-and-forget cast,
    /// a request id for an outgoing request, or a response id for an incoming reply.
    pub fn new(payload: Box<dyn AnyMessage>, mid: MessageId, sender: Option<ActorAddress>) -> Self {
        Self {
            payload,
            mid,
            sender,
        }
    }

    /// Borrow the erased payload.
    pub fn payload(&self) -> &dyn AnyMessage {
        self.payload.as_ref()
    }

    /// Consume the element, taking ownership of the payload.
    pub fn into_payload(self) -> Box<dyn AnyMessage> {
        self.payload
    }

    /// The element's request/response id.
    pub fn mid(&self) -> MessageId {
        self.mid
    }

    /// The sender's address, if the message came from another actor.
    pub fn sender(&self) -> Option<&ActorAddress> {
        self.sender.as_ref()
    }

    /// True if either the id's priority bit or the payload's own declared
    /// priority route this element to the mailbox's high-priority queue.
    pub fn is_high_priority(&self) -> bool {
        self.mid.is_high_priority() || self.payload.dyn_priority().is_high()
    }
}

impl fmt::Debug for MailboxElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxElement")
            .field("mid", &self.mid)
            .field("sender", &self.sender)
            .field("message_type", &self.payload.message_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::traits::{Message, MessagePriority};

    #[derive(Debug)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    #[derive(Debug)]
    struct Urgent;
    impl Message for Urgent {
        const MESSAGE_TYPE: &'static str = "urgent";
        fn priority(&self) -> MessagePriority {
            MessagePriority::Critical
        }
    }

    #[test]
    fn element_with_none_id_is_not_high_priority_by_default() {
        let elem = MailboxElement::new(Box::new(Ping), MessageId::NONE, None);
        assert!(!elem.is_high_priority());
        assert_eq!(elem.mid(), MessageId::NONE);
    }

    #[test]
    fn element_is_high_priority_when_payload_declares_it() {
        let elem = MailboxElement::new(Box::new(Urgent), MessageId::NONE, None);
        assert!(elem.is_high_priority());
    }

    #[test]
    fn element_is_high_priority_when_id_carries_the_bit() {
        let mid = MessageId::new_request(1, true);
        let elem = MailboxElement::new(Box::new(Ping), mid, None);
        assert!(elem.is_high_priority());
    }

    #[test]
    fn into_payload_recovers_the_concrete_type() {
        let elem = MailboxElement::new(Box::new(Ping), MessageId::NONE, None);
        let payload = elem.into_payload();
        assert!(payload.downcast_ref::<Ping>().is_some());
    }
}
