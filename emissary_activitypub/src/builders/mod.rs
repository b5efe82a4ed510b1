pub mod accept_follow;
pub mod actor;
pub mod block;
pub mod collection;
pub mod follow;
pub mod key_package;
pub mod undo;
