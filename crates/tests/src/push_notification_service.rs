/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use async_trait::async_trait;
use serde_json::Map;
use std::collections::HashMap;
use std::sync::Mutex;

use push_notification_service::common::types::*;
use push_notification_service::domain::action::ui::push_notification::dispatch;
use push_notification_service::domain::types::ui::push_notification::*;
use push_notification_service::outbound::types::*;
use push_notification_service::outbound::PushGateway;
use push_notification_service::stores::{DispatchHistory, TokenStore};
use push_notification_service::tools::error::AppError;

/// In-memory collaborators mirroring the Redis-backed ones, dispatch runs
/// against them through the same trait objects the service wires up.
struct InMemoryTokenStore {
    tokens: Mutex<HashMap<String, String>>,
}

impl InMemoryTokenStore {
    fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    fn token_of(&self, user_id: &str) -> Option<String> {
        self.tokens.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn register_token(
        &self,
        UserId(user_id): &UserId,
        DeviceToken(token): &DeviceToken,
    ) -> Result<(), AppError> {
        self.tokens
            .lock()
            .unwrap()
            .insert(user_id.to_owned(), token.to_owned());
        Ok(())
    }

    async fn active_tokens(&self) -> Result<Vec<DeviceToken>, AppError> {
        let mut tokens: Vec<String> = self
            .tokens
            .lock()
            .unwrap()
            .values()
            .filter(|token| !token.is_empty())
            .cloned()
            .collect();
        tokens.sort();
        Ok(tokens.into_iter().map(DeviceToken).collect())
    }

    async fn tokens_for_users(&self, user_ids: &[UserId]) -> Result<Vec<DeviceToken>, AppError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter_map(|UserId(user_id)| tokens.get(user_id))
            .filter(|token| !token.is_empty())
            .map(|token| DeviceToken(token.to_owned()))
            .collect())
    }

    async fn invalidate_token(&self, DeviceToken(token): &DeviceToken) -> Result<(), AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        for registered_token in tokens.values_mut() {
            if registered_token == token {
                registered_token.clear();
            }
        }
        Ok(())
    }
}

struct InMemoryHistory {
    entries: Mutex<Vec<String>>,
}

impl InMemoryHistory {
    fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DispatchHistory for InMemoryHistory {
    async fn record(&self, entry: HistoryEntry) -> Result<(), AppError> {
        // Entries go through JSON, like the list-backed store
        let entry = serde_json::to_string(&entry)
            .map_err(|err| AppError::SerializationError(err.to_string()))?;
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, AppError> {
        let raw_entries = self.entries.lock().unwrap();
        let mut entries: Vec<HistoryEntry> = raw_entries
            .iter()
            .rev()
            .take(limit)
            .filter_map(|raw_entry| serde_json::from_str(raw_entry).ok())
            .collect();
        entries.truncate(limit);
        Ok(entries)
    }
}

struct ScriptedGateway {
    responses: Mutex<Vec<Result<Vec<DeliveryTicket>, AppError>>>,
}

impl ScriptedGateway {
    fn all_ok() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
        }
    }

    fn scripted(responses: Vec<Result<Vec<DeliveryTicket>, AppError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl PushGateway for ScriptedGateway {
    fn is_valid_token(&self, DeviceToken(token): &DeviceToken) -> bool {
        token.starts_with("ExponentPushToken[") && token.ends_with(']')
    }

    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<DeliveryTicket>, AppError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(messages
                .iter()
                .map(|_| DeliveryTicket::Ok {
                    id: "ticket".to_string(),
                })
                .collect())
        } else {
            responses.remove(0)
        }
    }
}

fn token(n: usize) -> DeviceToken {
    DeviceToken(format!("ExponentPushToken[token-{n}]"))
}

async fn seed_store(store: &InMemoryTokenStore, count: usize) {
    for n in 1..=count {
        store
            .register_token(&UserId(format!("user-{n}")), &token(n))
            .await
            .unwrap();
    }
}

fn broadcast(title: &str, body: &str) -> PushNotificationRequest {
    PushNotificationRequest {
        title: title.to_string(),
        body: body.to_string(),
        target_type: TargetType::All,
        target_users: None,
        data: Map::new(),
    }
}

#[tokio::test]
async fn broadcast_reaches_every_registered_device() {
    let store = InMemoryTokenStore::new();
    seed_store(&store, 4).await;
    let gateway = ScriptedGateway::all_ok();
    let history = InMemoryHistory::new();

    let response = dispatch(
        &gateway,
        &store,
        &history,
        100,
        broadcast("Lunch", "Served in hall B"),
        SentBy::system(),
    )
    .await
    .unwrap();

    assert_eq!(response.successful, 4);
    assert_eq!(response.failed, 0);
}

#[tokio::test]
async fn invalidation_is_idempotent_across_dispatches() {
    let store = InMemoryTokenStore::new();
    seed_store(&store, 1).await;

    let rejected = DeliveryTicket::Error {
        message: Some("not registered".to_string()),
        details: Some(TicketDetails {
            error: Some(TicketErrorReason::DeviceNotRegistered),
        }),
    };

    let gateway = ScriptedGateway::scripted(vec![Ok(vec![rejected])]);
    let history = InMemoryHistory::new();

    dispatch(
        &gateway,
        &store,
        &history,
        100,
        broadcast("First", "dispatch"),
        SentBy::system(),
    )
    .await
    .unwrap();

    assert_eq!(store.token_of("user-1"), Some(String::new()));

    // The token is already null, invalidating it again must not fail or
    // resurrect it
    store.invalidate_token(&token(1)).await.unwrap();
    assert_eq!(store.token_of("user-1"), Some(String::new()));

    // A second broadcast now has no recipients left
    let response = dispatch(
        &gateway,
        &store,
        &history,
        100,
        broadcast("Second", "dispatch"),
        SentBy::system(),
    )
    .await;

    assert!(matches!(response, Err(AppError::NoValidPushTokens)));
}

#[tokio::test]
async fn re_registration_replaces_an_invalidated_token() {
    let store = InMemoryTokenStore::new();
    seed_store(&store, 1).await;

    store.invalidate_token(&token(1)).await.unwrap();
    assert!(store.active_tokens().await.unwrap().is_empty());

    store
        .register_token(&UserId("user-1".to_string()), &token(7))
        .await
        .unwrap();

    assert_eq!(store.active_tokens().await.unwrap(), vec![token(7)]);
}

#[tokio::test]
async fn history_returns_newest_entries_first() {
    let store = InMemoryTokenStore::new();
    seed_store(&store, 1).await;
    let gateway = ScriptedGateway::all_ok();
    let history = InMemoryHistory::new();

    for title in ["first", "second", "third"] {
        dispatch(
            &gateway,
            &store,
            &history,
            100,
            broadcast(title, "body"),
            SentBy::system(),
        )
        .await
        .unwrap();
    }

    let entries = history.recent(2).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title, "third");
    assert_eq!(entries[1].title, "second");
}

#[tokio::test]
async fn history_survives_the_json_round_trip_with_payload_data() {
    let store = InMemoryTokenStore::new();
    seed_store(&store, 1).await;
    let gateway = ScriptedGateway::all_ok();
    let history = InMemoryHistory::new();

    let mut data = Map::new();
    data.insert("screen".to_string(), serde_json::json!("agenda"));
    data.insert("session_id".to_string(), serde_json::json!(42));

    let request = PushNotificationRequest {
        data: data.to_owned(),
        ..broadcast("Agenda updated", "Two talks swapped")
    };

    dispatch(
        &gateway,
        &store,
        &history,
        100,
        request,
        SentBy("admin-1".to_string()),
    )
    .await
    .unwrap();

    let entries = history.recent(10).await.unwrap();
    assert_eq!(entries[0].data, data);
    assert_eq!(entries[0].sent_by, SentBy("admin-1".to_string()));
    assert_eq!(entries[0].success_count, 1);
    assert_eq!(entries[0].failure_count, 0);
}

#[tokio::test]
async fn partial_gateway_outage_still_delivers_the_healthy_batches() {
    let store = InMemoryTokenStore::new();
    seed_store(&store, 6).await;
    let history = InMemoryHistory::new();

    let gateway = ScriptedGateway::scripted(vec![
        Ok(vec![
            DeliveryTicket::Ok {
                id: "a".to_string(),
            },
            DeliveryTicket::Ok {
                id: "b".to_string(),
            },
        ]),
        Err(AppError::ExternalAPICallError("502 Bad Gateway".to_string())),
        Ok(vec![
            DeliveryTicket::Ok {
                id: "c".to_string(),
            },
            DeliveryTicket::Ok {
                id: "d".to_string(),
            },
        ]),
    ]);

    let response = dispatch(
        &gateway,
        &store,
        &history,
        2,
        broadcast("Venue change", "Track 2 moved"),
        SentBy::system(),
    )
    .await
    .unwrap();

    assert_eq!(response.successful, 4);
    assert_eq!(response.failed, 2);

    let entries = history.recent(1).await.unwrap();
    assert_eq!(entries[0].success_count, 4);
    assert_eq!(entries[0].failure_count, 2);
}
