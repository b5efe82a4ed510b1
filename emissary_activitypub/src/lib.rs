pub mod actors;
pub mod authentication;
pub mod builders;
pub mod cache;
pub mod collections;
pub mod constants;
pub mod contexts;
pub mod deliverer;
pub mod deserialization;
pub mod document;
pub mod errors;
pub mod factory;
pub mod fetch;
pub mod filter;
pub mod handlers;
pub mod http_signatures;
pub mod identifiers;
pub mod queues;
pub mod router;
pub mod scopes;
pub mod validators;
pub mod vocabulary;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
