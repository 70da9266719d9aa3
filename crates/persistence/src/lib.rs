//! Jifeng Persistence - Credential storage and encryption

pub mod encryption;
pub mod sqlite;
pub mod store;

pub use encryption::{derive_machine_key, CredentialEncryptor, EncryptedCredential};
pub use sqlite::{Database, SqliteCredentialStore};
pub use store::{CredentialStore, MemoryCredentialStore};
