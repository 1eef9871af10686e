/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

pub mod external;
pub mod types;

use async_trait::async_trait;

use crate::common::types::DeviceToken;
use crate::outbound::types::{DeliveryTicket, PushMessage};
use crate::tools::error::AppError;

/// Upstream push delivery provider.
///
/// Implementations are injected through `AppState` so the dispatch logic can
/// run against a test double as easily as against the real provider.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Whether the token has the provider's expected shape. Tokens failing
    /// this check are dropped locally without contacting the provider.
    fn is_valid_token(&self, token: &DeviceToken) -> bool;

    /// Delivers one batch of messages, returning one ticket per message in
    /// the same order the messages were given.
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<DeliveryTicket>, AppError>;
}
