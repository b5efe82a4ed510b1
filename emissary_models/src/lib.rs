pub mod actors;
pub mod background_jobs;
pub mod database;
pub mod followers;
pub mod following;
pub mod messages;
pub mod mls;
pub mod objects;
pub mod outbox;
pub mod responses;
pub mod rules;
pub mod searches;
pub mod streams;
pub mod users;
