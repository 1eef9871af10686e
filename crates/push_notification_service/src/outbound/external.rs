/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use async_trait::async_trait;
use reqwest::{Method, Url};

use crate::common::types::DeviceToken;
use crate::outbound::types::{AuthResponseData, DeliveryTicket, PushMessage, PushTicketResponse};
use crate::outbound::PushGateway;
use crate::tools::callapi::call_api;
use crate::tools::error::AppError;

/// Expo-compatible push gateway speaking the `/--/api/v2/push/send` protocol.
pub struct ExpoPushGateway {
    url: Url,
}

impl ExpoPushGateway {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

#[async_trait]
impl PushGateway for ExpoPushGateway {
    fn is_valid_token(&self, DeviceToken(token): &DeviceToken) -> bool {
        (token.starts_with("ExponentPushToken[") || token.starts_with("ExpoPushToken["))
            && token.ends_with(']')
    }

    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<DeliveryTicket>, AppError> {
        // One attempt per batch, retries are the caller's accounting problem
        let response: PushTicketResponse = call_api(
            Method::POST,
            &self.url,
            vec![("accept", "application/json")],
            Some(messages),
        )
        .await?;

        Ok(response.data)
    }
}

/// Resolves the caller's identity against the auth service.
pub async fn authenticate(
    auth_url: &Url,
    token: &str,
    auth_api_key: &str,
) -> Result<AuthResponseData, AppError> {
    call_api::<AuthResponseData, String>(
        Method::GET,
        auth_url,
        vec![("token", token), ("api-key", auth_api_key)],
        None,
    )
    .await
}
