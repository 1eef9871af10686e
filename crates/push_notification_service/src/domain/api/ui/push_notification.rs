/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    get, post,
    web::{Data, Json},
    HttpRequest,
};

use crate::{
    common::types::*,
    domain::{action::ui::push_notification, types::ui::push_notification::*},
    environment::AppState,
    tools::error::AppError,
};

fn token_header(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("token")
        .and_then(|header_value| header_value.to_str().ok())
        .map(|token| token.to_string())
}

#[post("/push-notifications")]
pub async fn send_push_notification(
    data: Data<AppState>,
    param_obj: Json<PushNotificationRequest>,
    req: HttpRequest,
) -> Result<Json<PushNotificationResponse>, AppError> {
    let request_body = param_obj.into_inner();

    // An absent or stale token degrades the audit trail, not the dispatch
    let sent_by = push_notification::resolve_principal(&data, token_header(&req)).await;

    Ok(Json(
        push_notification::send_push_notification(data, request_body, sent_by).await?,
    ))
}

#[get("/push-notifications/history")]
pub async fn dispatch_history(data: Data<AppState>) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    Ok(Json(push_notification::dispatch_history(data).await?))
}

#[post("/ui/device/token")]
pub async fn register_device_token(
    data: Data<AppState>,
    param_obj: Json<DeviceTokenRegistrationRequest>,
    req: HttpRequest,
) -> Result<Json<APISuccess>, AppError> {
    let request_body = param_obj.into_inner();

    let token = token_header(&req).ok_or(AppError::AuthFailed)?;
    let user_id = push_notification::authenticate_principal(&data, &token).await?;

    Ok(Json(
        push_notification::register_device_token(data, user_id, request_body).await?,
    ))
}
