/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::redis::types::RedisConnectionPool;
use crate::tools::error::AppError;
use crate::tools::logger::instrument;
use fred::{
    interfaces::{HashesInterface, KeysInterface, ListInterface},
    types::{Expiration, RedisValue},
};
use std::collections::HashMap;
use std::fmt::Debug;

impl RedisConnectionPool {
    // SET with the pool-wide default TTL
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn set_key<V>(&self, key: &str, value: V) -> Result<(), AppError>
    where
        V: TryInto<RedisValue> + Debug + Send + Sync,
        V::Error: Into<fred::error::RedisError> + Send + Sync,
    {
        self.set_with_expiry(key, value, self.default_ttl).await
    }

    // SET with an explicit expiry in seconds
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn set_with_expiry<V>(&self, key: &str, value: V, expiry: u32) -> Result<(), AppError>
    where
        V: TryInto<RedisValue> + Debug + Send + Sync,
        V::Error: Into<fred::error::RedisError> + Send + Sync,
    {
        let output: Result<(), _> = self
            .pool
            .set(key, value, Some(Expiration::EX(expiry.into())), None, false)
            .await;

        if output.is_err() {
            return Err(AppError::SetFailed);
        }

        Ok(())
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub async fn set_expiry(&self, key: &str, seconds: i64) -> Result<(), AppError> {
        let output: Result<(), _> = self.pool.expire(key, seconds).await;

        if output.is_err() {
            return Err(AppError::SetExpiryFailed);
        }

        Ok(())
    }

    // GET
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn get_key(&self, key: &str) -> Result<Option<String>, AppError> {
        let output: Result<RedisValue, _> = self.pool.get(key).await;

        match output {
            Ok(RedisValue::String(val)) => Ok(Some(val.to_string())),
            Ok(RedisValue::Null) => Ok(None),
            _ => Err(AppError::GetFailed),
        }
    }

    // HSET a single field, the hash key never expires
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn set_hash_field<V>(&self, key: &str, field: &str, value: V) -> Result<(), AppError>
    where
        V: TryInto<RedisValue> + Debug + Send + Sync,
        V::Error: Into<fred::error::RedisError> + Send + Sync,
    {
        let output: Result<(), _> = self.pool.hset(key, (field, value)).await;

        if output.is_err() {
            return Err(AppError::SetHashFieldFailed);
        }

        Ok(())
    }

    // HGETALL
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn get_all_hash_fields(&self, key: &str) -> Result<HashMap<String, String>, AppError> {
        let output: Result<HashMap<String, String>, _> = self.pool.hgetall(key).await;

        output.map_err(|_| AppError::GetHashFieldFailed)
    }

    // HMGET, preserving the order of the requested fields
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn get_hash_fields(
        &self,
        key: &str,
        fields: Vec<String>,
    ) -> Result<Vec<Option<String>>, AppError> {
        let output: Result<RedisValue, _> = self.pool.hmget(key, fields).await;

        match output {
            Ok(RedisValue::Array(values)) => Ok(values
                .into_iter()
                .map(|value| match value {
                    RedisValue::Null => None,
                    value => value.into_string(),
                })
                .collect()),
            Ok(RedisValue::Null) => Ok(Vec::new()),
            _ => Err(AppError::GetHashFieldFailed),
        }
    }

    // RPUSH
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn rpush<V>(&self, key: &str, values: Vec<V>) -> Result<i64, AppError>
    where
        V: TryInto<RedisValue> + Debug + Send + Sync,
        V::Error: Into<fred::error::RedisError> + Send + Sync,
    {
        let output: Result<RedisValue, _> = self.pool.rpush(key, values).await;

        if let Ok(RedisValue::Integer(length)) = output {
            Ok(length)
        } else {
            Err(AppError::RPushFailed)
        }
    }

    // LRANGE
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn lrange(&self, key: &str, min: i64, max: i64) -> Result<Vec<String>, AppError> {
        let output: Result<RedisValue, _> = self.pool.lrange(key, min, max).await;

        match output {
            Ok(RedisValue::Array(val)) => {
                let mut values = Vec::new();
                for value in val {
                    if let Some(value) = value.into_string() {
                        values.push(value)
                    }
                }
                Ok(values)
            }
            _ => Err(AppError::LRangeFailed),
        }
    }
}
