/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{Display, EnumString};

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct UserId(pub String);

/// Push gateway address of one device installation. A record whose token is
/// null (stored as an empty string) belongs to a device the gateway has
/// reported as permanently unreachable.
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct DeviceToken(pub String);

#[derive(Deserialize, Serialize, Clone, Debug, Eq, PartialEq)]
pub struct SentBy(pub String);

impl SentBy {
    /// Fallback principal recorded when the auth collaborator cannot be
    /// reached or rejects the caller's token.
    pub fn system() -> Self {
        SentBy("system".to_string())
    }
}

#[derive(
    Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[strum(serialize = "all")]
    All,
    #[strum(serialize = "specific_users")]
    SpecificUsers,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct APISuccess {
    pub result: String,
}

impl Default for APISuccess {
    fn default() -> Self {
        APISuccess {
            result: "Success".to_string(),
        }
    }
}

/// Append-only audit row describing one dispatch call's aggregate outcome.
/// Written exactly once per completed dispatch, after all batches finish.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HistoryEntry {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub sent_at: DateTime<Utc>,
    pub sent_by: SentBy,
    pub target_type: TargetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_users: Option<Vec<UserId>>,
    pub success_count: u32,
    pub failure_count: u32,
}
