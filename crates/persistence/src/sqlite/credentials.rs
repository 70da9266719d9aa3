//! Encrypted credential rows and the SQLite-backed `CredentialStore`

use crate::encryption::{CredentialEncryptor, EncryptedCredential};
use crate::sqlite::Database;
use crate::store::CredentialStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jifeng_core::{Error, Result};
use sqlx::SqlitePool;
use tracing::{debug, warn};

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    ciphertext: Vec<u8>,
    iv: Vec<u8>,
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

/// Insert or replace the credential stored under `key`
pub async fn put_credential(
    pool: &SqlitePool,
    key: &str,
    encrypted: &EncryptedCredential,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO credentials (key, ciphertext, iv, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
            ciphertext = excluded.ciphertext,
            iv = excluded.iv,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(&encrypted.ciphertext)
    .bind(&encrypted.iv[..])
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| Error::StorageError(e.to_string()))?;

    Ok(())
}

pub async fn get_credential(pool: &SqlitePool, key: &str) -> Result<Option<EncryptedCredential>> {
    let row: Option<CredentialRow> = sqlx::query_as(
        r#"
        SELECT ciphertext, iv, updated_at
        FROM credentials
        WHERE key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::StorageError(e.to_string()))?;

    row.map(|r| EncryptedCredential::from_parts(r.ciphertext, &r.iv))
        .transpose()
}

/// Delete the credential under `key`; returns whether a row existed
pub async fn delete_credential(pool: &SqlitePool, key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM credentials WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await
        .map_err(|e| Error::StorageError(e.to_string()))?;

    Ok(result.rows_affected() > 0)
}

/// Credential store that keeps values encrypted at rest
pub struct SqliteCredentialStore {
    db: Database,
    encryptor: CredentialEncryptor,
}

impl SqliteCredentialStore {
    pub fn new(db: Database, encryptor: CredentialEncryptor) -> Self {
        Self { db, encryptor }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(encrypted) = get_credential(self.db.pool(), key).await? else {
            return Ok(None);
        };

        match self.encryptor.decrypt(&encrypted) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // Written under another machine key; unusable here.
                warn!("Discarding unreadable credential '{}': {}", key, e);
                delete_credential(self.db.pool(), key).await?;
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let encrypted = self.encryptor.encrypt(value)?;
        put_credential(self.db.pool(), key, &encrypted).await?;
        debug!("Stored credential '{}'", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if delete_credential(self.db.pool(), key).await? {
            debug!("Removed credential '{}'", key);
        }
        Ok(())
    }
}
