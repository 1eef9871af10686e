/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;

use crate::outbound::external::ExpoPushGateway;
use crate::outbound::PushGateway;
use crate::redis::types::{RedisConnectionPool, RedisSettings};
use crate::stores::{DispatchHistory, TokenStore};
use crate::tools::logger::LoggerConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub redis_cfg: RedisConfig,
    pub auth_url: String,
    pub auth_api_key: String,
    pub auth_token_expiry: u32,
    pub push_gateway_url: String,
    pub push_batch_size: usize,
    pub history_fetch_limit: usize,
    pub request_timeout: u64,
    pub log_unprocessible_req_body: Vec<String>,
    pub max_allowed_req_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_pool_size: usize,
    pub redis_partition: usize,
    pub reconnect_max_attempts: u32,
    pub reconnect_delay: u32,
    pub default_ttl: u32,
    pub default_hash_ttl: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub redis_pool: Arc<RedisConnectionPool>,
    pub token_store: Arc<dyn TokenStore>,
    pub dispatch_history: Arc<dyn DispatchHistory>,
    pub push_gateway: Arc<dyn PushGateway>,
    pub auth_url: Url,
    pub auth_api_key: String,
    pub auth_token_expiry: u32,
    pub push_batch_size: usize,
    pub history_fetch_limit: usize,
    pub max_allowed_req_size: usize,
    pub log_unprocessible_req_body: Vec<String>,
    pub request_timeout: u64,
}

impl AppState {
    pub async fn new(app_config: AppConfig) -> AppState {
        let redis_pool = Arc::new(
            RedisConnectionPool::new(&RedisSettings::new(
                app_config.redis_cfg.redis_host,
                app_config.redis_cfg.redis_port,
                app_config.redis_cfg.redis_pool_size,
                app_config.redis_cfg.redis_partition,
                app_config.redis_cfg.reconnect_max_attempts,
                app_config.redis_cfg.reconnect_delay,
                app_config.redis_cfg.default_ttl,
                app_config.redis_cfg.default_hash_ttl,
            ))
            .await
            .expect("Failed to create Redis connection pool"),
        );

        let push_gateway = Arc::new(ExpoPushGateway::new(
            Url::parse(app_config.push_gateway_url.as_str())
                .expect("Failed to parse push_gateway_url"),
        ));

        AppState {
            token_store: redis_pool.to_owned() as Arc<dyn TokenStore>,
            dispatch_history: redis_pool.to_owned() as Arc<dyn DispatchHistory>,
            redis_pool,
            push_gateway,
            auth_url: Url::parse(app_config.auth_url.as_str()).expect("Failed to parse auth_url"),
            auth_api_key: app_config.auth_api_key,
            auth_token_expiry: app_config.auth_token_expiry,
            push_batch_size: app_config.push_batch_size,
            history_fetch_limit: app_config.history_fetch_limit,
            max_allowed_req_size: app_config.max_allowed_req_size,
            log_unprocessible_req_body: app_config.log_unprocessible_req_body,
            request_timeout: app_config.request_timeout,
        }
    }
}
