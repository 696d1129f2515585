use rusqlite::{params, OptionalExtension, Row};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::generate_token;
use crate::auth::{is_valid_email, validate_password, AuthError};
use crate::db::models::Account;
use crate::error::AppResult;
use crate::state::DbPool;

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, created_at, last_sign_in_at";

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
        last_sign_in_at: row.get(4)?,
    })
}

pub fn find_by_email(pool: &DbPool, email: &str) -> AppResult<Option<Account>> {
    let conn = pool.get()?;
    let account = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
            params![email.trim()],
            account_from_row,
        )
        .optional()?;
    Ok(account)
}

pub fn find_by_id(pool: &DbPool, id: &str) -> AppResult<Option<Account>> {
    let conn = pool.get()?;
    let account = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
            params![id],
            account_from_row,
        )
        .optional()?;
    Ok(account)
}

/// Register a new email/password account.
pub fn create_account(
    pool: &DbPool,
    email: &str,
    password: &str,
    cost: u32,
) -> AppResult<Account> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail.into());
    }
    validate_password(password)?;

    if find_by_email(pool, email)?.is_some() {
        return Err(AuthError::EmailAlreadyInUse.into());
    }

    let id = uuid::Uuid::now_v7().to_string();
    let password_hash = hash_password(password, cost)?;

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO accounts (id, email, password_hash) VALUES (?1, ?2, ?3)",
        params![id, email, password_hash],
    )?;
    tracing::info!(account_id = %id, "Account created");

    find_by_id(pool, &id)?
        .ok_or_else(|| crate::error::AppError::Internal("account vanished after insert".into()))
}

/// Check an email/password pair. Nothing is recorded; callers stamp the
/// sign-in with `record_sign_in` once every other check has passed.
pub fn verify_credentials(pool: &DbPool, email: &str, password: &str) -> AppResult<Account> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail.into());
    }

    let account = find_by_email(pool, email)?.ok_or(AuthError::UserNotFound)?;
    if !verify_password(password, &account.password_hash) {
        tracing::warn!(account_id = %account.id, "Sign-in with wrong password");
        return Err(AuthError::WrongPassword.into());
    }

    Ok(account)
}

pub fn record_sign_in(pool: &DbPool, account_id: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE accounts SET last_sign_in_at = datetime('now') WHERE id = ?1",
        params![account_id],
    )?;
    Ok(())
}

/// Replace the password of a signed-in account after re-checking the
/// current one. Every other session of the account is revoked; the one
/// identified by `keep_token` stays valid.
pub fn change_password(
    pool: &DbPool,
    account_id: &str,
    current_password: &str,
    new_password: &str,
    cost: u32,
    keep_token: &str,
) -> AppResult<()> {
    validate_password(new_password)?;
    let account = find_by_id(pool, account_id)?.ok_or(AuthError::UserNotFound)?;
    if !verify_password(current_password, &account.password_hash) {
        tracing::warn!(account_id = %account.id, "Password change with wrong current password");
        return Err(AuthError::WrongPassword.into());
    }
    let password_hash = hash_password(new_password, cost)?;

    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE accounts SET password_hash = ?2 WHERE id = ?1",
        params![account_id, password_hash],
    )?;
    tx.execute(
        "DELETE FROM sessions WHERE account_id = ?1 AND token != ?2",
        params![account_id, keep_token],
    )?;
    tx.commit()?;

    tracing::info!(account_id = %account_id, "Password changed");
    Ok(())
}

/// Change the sign-in email of an account.
pub fn update_email(pool: &DbPool, account_id: &str, new_email: &str) -> AppResult<Account> {
    let email = new_email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail.into());
    }
    if let Some(existing) = find_by_email(pool, email)? {
        if existing.id != account_id {
            return Err(AuthError::EmailAlreadyInUse.into());
        }
    }

    let conn = pool.get()?;
    let rows = conn.execute(
        "UPDATE accounts SET email = ?2 WHERE id = ?1",
        params![account_id, email],
    )?;
    if rows == 0 {
        return Err(AuthError::UserNotFound.into());
    }
    tracing::info!(account_id = %account_id, "Account email updated");

    find_by_id(pool, account_id)?.ok_or_else(|| AuthError::UserNotFound.into())
}

/// Issue a single-use reset token for `email`, valid for `minutes`.
pub fn create_reset_token(pool: &DbPool, email: &str, minutes: u64) -> AppResult<String> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail.into());
    }
    let account = find_by_email(pool, email)?.ok_or(AuthError::UserNotFound)?;

    let token = generate_token();
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO password_resets (token, account_id, expires_at)
         VALUES (?1, ?2, datetime('now', ?3))",
        params![token, account.id, format!("+{} minutes", minutes)],
    )?;

    Ok(token)
}

/// Consume a reset token and replace the password. Existing sessions of the
/// account are revoked.
pub fn reset_password(
    pool: &DbPool,
    token: &str,
    new_password: &str,
    cost: u32,
) -> AppResult<Account> {
    validate_password(new_password)?;
    let password_hash = hash_password(new_password, cost)?;

    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    let account_id: Option<String> = tx
        .query_row(
            "SELECT account_id FROM password_resets
             WHERE token = ?1 AND expires_at > datetime('now')",
            params![token],
            |row| row.get(0),
        )
        .optional()?;
    let account_id = account_id.ok_or(AuthError::InvalidActionCode)?;

    tx.execute(
        "DELETE FROM password_resets WHERE account_id = ?1",
        params![account_id],
    )?;
    tx.execute(
        "UPDATE accounts SET password_hash = ?2 WHERE id = ?1",
        params![account_id, password_hash],
    )?;
    tx.execute(
        "DELETE FROM sessions WHERE account_id = ?1",
        params![account_id],
    )?;
    tx.commit()?;

    tracing::info!(account_id = %account_id, "Password reset completed");
    find_by_id(pool, &account_id)?.ok_or_else(|| AuthError::UserNotFound.into())
}
