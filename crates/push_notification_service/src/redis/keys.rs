/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

// Hash of user id -> device token, empty value marks an invalidated token
pub fn device_tokens_key() -> String {
    "pns:device_tokens".to_string()
}

// List of JSON-encoded dispatch history entries, oldest first
pub fn dispatch_history_key() -> String {
    "pns:dispatch_history".to_string()
}

pub fn auth_token_key(token: &str) -> String {
    format!("pns:auth:{token}")
}

pub fn health_check_key() -> String {
    "pns:health_check".to_string()
}
