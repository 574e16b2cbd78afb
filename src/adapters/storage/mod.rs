//! Session store adapters: in-memory, file-backed, and PostgreSQL.

mod file_session_store;
mod in_memory_session_store;
mod postgres_session_store;

pub use file_session_store::FileSessionStore;
pub use in_memory_session_store::InMemorySessionStore;
pub use postgres_session_store::PostgresSessionStore;
