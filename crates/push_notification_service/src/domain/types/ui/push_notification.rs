/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::types::{DeviceToken, TargetType, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushNotificationRequest {
    pub title: String,
    pub body: String,
    pub target_type: TargetType,
    /// Required when `target_type` is `specific_users`, must be absent for `all`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_users: Option<Vec<UserId>>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushNotificationResponse {
    pub successful: u32,
    pub failed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceTokenRegistrationRequest {
    pub token: DeviceToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_snake_case_target_type() {
        let request: PushNotificationRequest = serde_json::from_str(
            r#"{"title":"Schedule change","body":"Keynote moved to 10am","target_type":"specific_users","target_users":["user-1","user-2"]}"#,
        )
        .unwrap();

        assert!(matches!(request.target_type, TargetType::SpecificUsers));
        assert_eq!(
            request.target_users,
            Some(vec![
                UserId("user-1".to_string()),
                UserId("user-2".to_string())
            ])
        );
        assert!(request.data.is_empty());
    }

    #[test]
    fn request_rejects_unknown_target_type() {
        let request: Result<PushNotificationRequest, _> = serde_json::from_str(
            r#"{"title":"t","body":"b","target_type":"everyone"}"#,
        );

        assert!(request.is_err());
    }
}
