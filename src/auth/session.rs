use rand::Rng;
use rusqlite::{params, OptionalExtension};

use crate::db::models::{Account, Session};
use crate::error::AppResult;
use crate::state::DbPool;

/// Create a new session for an account. Returns the session token.
pub fn create_session(pool: &DbPool, account_id: &str, hours: u64) -> AppResult<String> {
    let conn = pool.get()?;

    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO sessions (id, account_id, token, expires_at) VALUES (?1, ?2, ?3, datetime('now', ?4))",
        params![id, account_id, token, format!("+{} hours", hours)],
    )?;

    Ok(token)
}

/// Delete a session by token.
pub fn delete_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

pub fn delete_account_sessions(pool: &DbPool, account_id: &str) -> AppResult<usize> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM sessions WHERE account_id = ?1",
        params![account_id],
    )?;
    Ok(rows)
}

/// Live (unexpired) session for `token`.
pub fn find_session(pool: &DbPool, token: &str) -> AppResult<Option<Session>> {
    let conn = pool.get()?;
    let session = conn
        .query_row(
            "SELECT id, account_id, token, expires_at, created_at FROM sessions
             WHERE token = ?1 AND expires_at > datetime('now')",
            params![token],
            |row| {
                Ok(Session {
                    id: row.get(0)?,
                    account_id: row.get(1)?,
                    token: row.get(2)?,
                    expires_at: row.get(3)?,
                    created_at: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(session)
}

/// The account behind a live session token.
pub fn account_for_token(pool: &DbPool, token: &str) -> AppResult<Option<Account>> {
    let conn = pool.get()?;
    let account = conn
        .query_row(
            "SELECT a.id, a.email, a.password_hash, a.created_at, a.last_sign_in_at
             FROM sessions s JOIN accounts a ON a.id = s.account_id
             WHERE s.token = ?1 AND s.expires_at > datetime('now')",
            params![token],
            |row| {
                Ok(Account {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    created_at: row.get(3)?,
                    last_sign_in_at: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(account)
}

/// Generate a cryptographically random 32-byte hex token.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::accounts;
    use crate::db;
    use tempfile::TempDir;

    fn pool_with_account() -> (DbPool, String, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = db::create_pool(&temp_dir.path().join("test.db")).unwrap();
        db::run_migrations(&pool).unwrap();
        let account = accounts::create_account(&pool, "owner@example.tn", "secret1", 4).unwrap();
        (pool, account.id, temp_dir)
    }

    #[test]
    fn generate_token_is_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_token_is_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn session_resolves_to_account() {
        let (pool, account_id, _tmp) = pool_with_account();
        let token = create_session(&pool, &account_id, 1).unwrap();

        let account = account_for_token(&pool, &token).unwrap().unwrap();
        assert_eq!(account.id, account_id);
        let session = find_session(&pool, &token).unwrap().unwrap();
        assert_eq!(session.account_id, account_id);

        delete_session(&pool, &token).unwrap();
        assert!(account_for_token(&pool, &token).unwrap().is_none());
    }

    #[test]
    fn expired_session_is_ignored() {
        let (pool, account_id, _tmp) = pool_with_account();
        let token = create_session(&pool, &account_id, 0).unwrap();
        // zero-hour sessions expire at creation time
        assert!(account_for_token(&pool, &token).unwrap().is_none());
        assert!(find_session(&pool, &token).unwrap().is_none());
    }

    #[test]
    fn delete_account_sessions_signs_out_everywhere() {
        let (pool, account_id, _tmp) = pool_with_account();
        let first = create_session(&pool, &account_id, 1).unwrap();
        let second = create_session(&pool, &account_id, 1).unwrap();

        assert_eq!(delete_account_sessions(&pool, &account_id).unwrap(), 2);
        assert!(account_for_token(&pool, &first).unwrap().is_none());
        assert!(account_for_token(&pool, &second).unwrap().is_none());
    }
}
