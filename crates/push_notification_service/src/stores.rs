/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use async_trait::async_trait;
use tracing::warn;

use crate::common::types::{DeviceToken, HistoryEntry, UserId};
use crate::redis::{keys::*, types::RedisConnectionPool};
use crate::tools::error::AppError;

/// Storage of device push token registrations, one token per user.
///
/// A registration may hold a null token (stored as an empty string) when the
/// user's token was invalidated, such registrations are skipped when resolving
/// recipients but the user id remains known to the store.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Upserts the token registration for a user.
    async fn register_token(&self, user_id: &UserId, token: &DeviceToken)
        -> Result<(), AppError>;

    /// All non-null registered tokens.
    async fn active_tokens(&self) -> Result<Vec<DeviceToken>, AppError>;

    /// Non-null tokens registered for the given users. Unknown users and
    /// users with a null token are skipped.
    async fn tokens_for_users(&self, user_ids: &[UserId]) -> Result<Vec<DeviceToken>, AppError>;

    /// Nulls out every registration holding the given token. Idempotent,
    /// nulling an already-null or unknown token is a no-op.
    async fn invalidate_token(&self, token: &DeviceToken) -> Result<(), AppError>;
}

/// Append-only log of dispatch outcomes.
#[async_trait]
pub trait DispatchHistory: Send + Sync {
    async fn record(&self, entry: HistoryEntry) -> Result<(), AppError>;

    /// Up to `limit` most recent entries, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, AppError>;
}

#[async_trait]
impl TokenStore for RedisConnectionPool {
    async fn register_token(
        &self,
        UserId(user_id): &UserId,
        DeviceToken(token): &DeviceToken,
    ) -> Result<(), AppError> {
        self.set_hash_field(&device_tokens_key(), user_id, token.to_owned())
            .await
    }

    async fn active_tokens(&self) -> Result<Vec<DeviceToken>, AppError> {
        let registrations = self.get_all_hash_fields(&device_tokens_key()).await?;

        Ok(registrations
            .into_values()
            .filter(|token| !token.is_empty())
            .map(DeviceToken)
            .collect())
    }

    async fn tokens_for_users(&self, user_ids: &[UserId]) -> Result<Vec<DeviceToken>, AppError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let fields = user_ids
            .iter()
            .map(|UserId(user_id)| user_id.to_owned())
            .collect();

        let tokens = self.get_hash_fields(&device_tokens_key(), fields).await?;

        Ok(tokens
            .into_iter()
            .flatten()
            .filter(|token| !token.is_empty())
            .map(DeviceToken)
            .collect())
    }

    async fn invalidate_token(&self, DeviceToken(token): &DeviceToken) -> Result<(), AppError> {
        let registrations = self.get_all_hash_fields(&device_tokens_key()).await?;

        for (user_id, registered_token) in registrations {
            if &registered_token == token {
                self.set_hash_field(&device_tokens_key(), &user_id, "")
                    .await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DispatchHistory for RedisConnectionPool {
    async fn record(&self, entry: HistoryEntry) -> Result<(), AppError> {
        let entry = serde_json::to_string(&entry)
            .map_err(|err| AppError::SerializationError(err.to_string()))?;

        self.rpush(&dispatch_history_key(), vec![entry]).await?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let raw_entries = self
            .lrange(&dispatch_history_key(), -(limit as i64), -1)
            .await?;

        // Unparseable entries are skipped rather than failing the whole read
        let mut entries: Vec<HistoryEntry> = raw_entries
            .iter()
            .filter_map(|raw_entry| match serde_json::from_str(raw_entry) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping malformed dispatch history entry : {}", err);
                    None
                }
            })
            .collect();

        entries.reverse();

        Ok(entries)
    }
}
