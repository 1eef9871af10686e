#[cfg(test)]
mod push_notification_service;
