pub mod inbox;
pub(crate) mod objects;
pub mod outbox;
