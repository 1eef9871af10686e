/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::web::Data;
use chrono::Utc;
use tracing::{error, warn};

use crate::common::types::*;
use crate::domain::types::ui::push_notification::*;
use crate::environment::AppState;
use crate::outbound::external::authenticate;
use crate::outbound::types::{DeliveryTicket, PushMessage, TicketDetails, TicketErrorReason};
use crate::outbound::PushGateway;
use crate::redis::keys::auth_token_key;
use crate::stores::{DispatchHistory, TokenStore};
use crate::tools::error::AppError;
use crate::tools::prometheus::{PUSH_DELIVERY, TOKENS_INVALIDATED};

fn validate_request(request: &PushNotificationRequest) -> Result<(), AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidRequest("Title is empty".to_string()));
    }

    if request.body.trim().is_empty() {
        return Err(AppError::InvalidRequest("Body is empty".to_string()));
    }

    match request.target_type {
        TargetType::SpecificUsers => match &request.target_users {
            Some(target_users) if !target_users.is_empty() => Ok(()),
            _ => Err(AppError::InvalidRequest(
                "target_users must be non-empty for target_type specific_users".to_string(),
            )),
        },
        TargetType::All => match &request.target_users {
            None => Ok(()),
            Some(_) => Err(AppError::InvalidRequest(
                "target_users must be absent for target_type all".to_string(),
            )),
        },
    }
}

async fn resolve_recipients(
    token_store: &dyn TokenStore,
    request: &PushNotificationRequest,
) -> Result<Vec<DeviceToken>, AppError> {
    match request.target_type {
        TargetType::All => token_store.active_tokens().await,
        TargetType::SpecificUsers => {
            let target_users = request.target_users.as_deref().unwrap_or(&[]);
            token_store.tokens_for_users(target_users).await
        }
    }
}

fn is_device_not_registered(details: &Option<TicketDetails>) -> bool {
    matches!(
        details,
        Some(TicketDetails {
            error: Some(TicketErrorReason::DeviceNotRegistered),
        })
    )
}

/// Sends one notification to the resolved recipients and records the outcome.
///
/// Recipients failing the gateway's local token format check are dropped
/// before any network call. The remainder is sent in batches of at most
/// `batch_size` messages, one gateway call per batch, with no retries. Each
/// returned ticket is paired with the message it was issued for, so a short
/// ticket list cannot shift blame onto the wrong recipient. A failed batch
/// call counts every message of that batch as failed, which keeps
/// `successful + failed` equal to the number of locally valid recipients.
///
/// Tokens the gateway reports as `DeviceNotRegistered` are invalidated in the
/// token store on a best-effort basis, as is the history write at the end.
pub async fn dispatch(
    gateway: &dyn PushGateway,
    token_store: &dyn TokenStore,
    history: &dyn DispatchHistory,
    batch_size: usize,
    request: PushNotificationRequest,
    sent_by: SentBy,
) -> Result<PushNotificationResponse, AppError> {
    validate_request(&request)?;

    let recipients = resolve_recipients(token_store, &request).await?;

    let valid_recipients: Vec<DeviceToken> = recipients
        .into_iter()
        .filter(|token| {
            let valid = gateway.is_valid_token(token);
            if !valid {
                warn!("Dropping malformed device token : {:?}", token);
            }
            valid
        })
        .collect();

    if valid_recipients.is_empty() {
        return Err(AppError::NoValidPushTokens);
    }

    let mut successful: u32 = 0;
    let mut failed: u32 = 0;

    for batch in valid_recipients.chunks(batch_size.max(1)) {
        let messages: Vec<PushMessage> = batch
            .iter()
            .map(|token| PushMessage {
                to: token.to_owned(),
                title: request.title.to_owned(),
                body: request.body.to_owned(),
                data: request.data.to_owned(),
                sound: "default".to_string(),
            })
            .collect();

        match gateway.send(&messages).await {
            Ok(tickets) => {
                if tickets.len() != messages.len() {
                    warn!(
                        "Push gateway returned {} tickets for {} messages",
                        tickets.len(),
                        messages.len()
                    );
                }

                let mut tickets = tickets.into_iter();

                for outbound in &messages {
                    match tickets.next() {
                        Some(DeliveryTicket::Ok { .. }) => successful += 1,
                        Some(DeliveryTicket::Error { message, details }) => {
                            failed += 1;
                            error!(
                                "Push delivery failed for {:?} : {:?}",
                                outbound.to, message
                            );

                            if is_device_not_registered(&details) {
                                match token_store.invalidate_token(&outbound.to).await {
                                    Ok(()) => TOKENS_INVALIDATED.inc(),
                                    Err(err) => warn!(
                                        "Failed to invalidate device token {:?} : {}",
                                        outbound.to, err
                                    ),
                                }
                            }
                        }
                        // No ticket issued for this message
                        None => failed += 1,
                    }
                }
            }
            Err(err) => {
                error!("Push gateway batch call failed : {}", err);
                failed += messages.len() as u32;
            }
        }
    }

    PUSH_DELIVERY
        .with_label_values(&["successful"])
        .inc_by(successful.into());
    PUSH_DELIVERY
        .with_label_values(&["failed"])
        .inc_by(failed.into());

    let entry = HistoryEntry {
        title: request.title,
        body: request.body,
        data: request.data,
        sent_at: Utc::now(),
        sent_by,
        target_type: request.target_type,
        target_users: request.target_users,
        success_count: successful,
        failure_count: failed,
    };

    // The dispatch already happened, a failed audit write must not undo it
    if let Err(err) = history.record(entry).await {
        error!("Failed to record dispatch history : {}", err);
    }

    Ok(PushNotificationResponse { successful, failed })
}

pub async fn send_push_notification(
    data: Data<AppState>,
    request: PushNotificationRequest,
    sent_by: SentBy,
) -> Result<PushNotificationResponse, AppError> {
    dispatch(
        data.push_gateway.as_ref(),
        data.token_store.as_ref(),
        data.dispatch_history.as_ref(),
        data.push_batch_size,
        request,
        sent_by,
    )
    .await
}

async fn authenticate_caller(data: &Data<AppState>, token: &str) -> Result<UserId, AppError> {
    if let Ok(Some(user_id)) = data.redis_pool.get_key(&auth_token_key(token)).await {
        return Ok(UserId(user_id));
    }

    let response = authenticate(&data.auth_url, token, &data.auth_api_key).await?;

    if let Err(err) = data
        .redis_pool
        .set_with_expiry(
            &auth_token_key(token),
            response.user_id.to_owned(),
            data.auth_token_expiry,
        )
        .await
    {
        warn!("Failed to cache auth token : {}", err);
    }

    Ok(UserId(response.user_id))
}

/// Identifies the caller for audit purposes. Dispatch proceeds as the
/// "system" principal when no token is given or authentication fails.
pub async fn resolve_principal(data: &Data<AppState>, token: Option<String>) -> SentBy {
    match token {
        Some(token) => match authenticate_caller(data, &token).await {
            Ok(UserId(user_id)) => SentBy(user_id),
            Err(err) => {
                warn!("Authentication failed, recording sender as system : {}", err);
                SentBy::system()
            }
        },
        None => SentBy::system(),
    }
}

/// Identifies the caller for operations that must reject anonymous access.
pub async fn authenticate_principal(
    data: &Data<AppState>,
    token: &str,
) -> Result<UserId, AppError> {
    authenticate_caller(data, token)
        .await
        .map_err(|_| AppError::AuthFailed)
}

pub async fn register_device_token(
    data: Data<AppState>,
    user_id: UserId,
    request: DeviceTokenRegistrationRequest,
) -> Result<APISuccess, AppError> {
    if !data.push_gateway.is_valid_token(&request.token) {
        return Err(AppError::InvalidRequest(
            "Device token is not in the push gateway's format".to_string(),
        ));
    }

    data.token_store
        .register_token(&user_id, &request.token)
        .await?;

    Ok(APISuccess::default())
}

pub async fn dispatch_history(data: Data<AppState>) -> Result<Vec<HistoryEntry>, AppError> {
    data.dispatch_history
        .recent(data.history_fetch_limit)
        .await
}
