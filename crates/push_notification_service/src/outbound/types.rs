/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::types::DeviceToken;

/// A single message in the provider's wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushMessage {
    pub to: DeviceToken,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    pub sound: String,
}

/// Per-message delivery outcome as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryTicket {
    Ok {
        id: String,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<TicketDetails>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TicketErrorReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TicketErrorReason {
    DeviceNotRegistered,
    MessageTooBig,
    MessageRateExceeded,
    MismatchSenderId,
    InvalidCredentials,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PushTicketResponse {
    pub data: Vec<DeliveryTicket>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseData {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_ticket_ok_from_provider_json() {
        let ticket: DeliveryTicket =
            serde_json::from_str(r#"{"status":"ok","id":"0162cb4e-aa83-4e52-a21e-35027e6b0ad5"}"#)
                .unwrap();

        assert_eq!(
            ticket,
            DeliveryTicket::Ok {
                id: "0162cb4e-aa83-4e52-a21e-35027e6b0ad5".to_string()
            }
        );
    }

    #[test]
    fn delivery_ticket_error_with_reason() {
        let ticket: DeliveryTicket = serde_json::from_str(
            r#"{"status":"error","message":"the token is not registered","details":{"error":"DeviceNotRegistered"}}"#,
        )
        .unwrap();

        match ticket {
            DeliveryTicket::Error { details, .. } => {
                assert_eq!(
                    details.and_then(|details| details.error),
                    Some(TicketErrorReason::DeviceNotRegistered)
                );
            }
            _ => panic!("expected an error ticket"),
        }
    }

    #[test]
    fn unknown_error_reason_does_not_fail_parsing() {
        let ticket: DeliveryTicket = serde_json::from_str(
            r#"{"status":"error","details":{"error":"SomeFutureReason"}}"#,
        )
        .unwrap();

        match ticket {
            DeliveryTicket::Error { details, .. } => {
                assert_eq!(
                    details.and_then(|details| details.error),
                    Some(TicketErrorReason::Unknown)
                );
            }
            _ => panic!("expected an error ticket"),
        }
    }

    #[test]
    fn push_message_omits_empty_data() {
        let message = PushMessage {
            to: DeviceToken("ExponentPushToken[xxx]".to_string()),
            title: "Title".to_string(),
            body: "Body".to_string(),
            data: Map::new(),
            sound: "default".to_string(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert!(json.get("data").is_none());
    }
}
