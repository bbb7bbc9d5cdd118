//! Webhook Tools
//!
//! Registration of webhook URLs and delivery of saved records to them.

use std::time::Duration;

use serde::Serialize;

use crate::db::Database;
use crate::models::{Webhook, EVENT_INGREDIENTS, EVENT_RECIPES};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Response for list_webhooks
#[derive(Debug, Serialize)]
pub struct ListWebhooksResponse {
    pub webhooks: Vec<Webhook>,
    pub total: usize,
}

/// Response for delete_webhook
#[derive(Debug, Serialize)]
pub struct DeleteWebhookResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Outcome of delivering one event
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
}

pub fn add_webhook(db: &Database, event: &str, url: &str) -> Result<Webhook, String> {
    let event = event.trim().to_lowercase();
    if event != EVENT_INGREDIENTS && event != EVENT_RECIPES {
        return Err(format!(
            "Event must be '{}' or '{}'",
            EVENT_INGREDIENTS, EVENT_RECIPES
        ));
    }

    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err("Webhook URL must start with http:// or https://".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let hook = Webhook::create(&conn, &event, url)
        .map_err(|e| format!("Failed to save webhook: {}", e))?;

    tracing::info!("Registered webhook {} for {}", hook.url, hook.event);
    Ok(hook)
}

pub fn list_webhooks(db: &Database) -> Result<ListWebhooksResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let webhooks = Webhook::list(&conn).map_err(|e| format!("Failed to list webhooks: {}", e))?;

    Ok(ListWebhooksResponse {
        total: webhooks.len(),
        webhooks,
    })
}

pub fn delete_webhook(db: &Database, id: i64) -> Result<DeleteWebhookResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = Webhook::delete(&conn, id).map_err(|e| format!("Failed to delete webhook: {}", e))?;
    if !deleted {
        return Err(format!("Webhook {} not found", id));
    }

    Ok(DeleteWebhookResponse {
        success: true,
        deleted_id: id,
    })
}

/// POST `payload` as JSON to every webhook registered for `event`.
///
/// One attempt per hook. Failures are logged and counted, never returned:
/// the record that triggered the event is already saved.
pub fn dispatch<T: Serialize>(db: &Database, event: &str, payload: &T) -> DispatchReport {
    let hooks = match db.with_conn(|conn| Webhook::list_for_event(conn, event)) {
        Ok(hooks) => hooks,
        Err(e) => {
            tracing::warn!("Could not read webhooks for {}: {}", event, e);
            return DispatchReport::default();
        }
    };

    let mut report = DispatchReport {
        attempted: hooks.len(),
        delivered: 0,
    };
    if hooks.is_empty() {
        return report;
    }

    let client = match reqwest::blocking::Client::builder()
        .timeout(DELIVERY_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Could not build webhook client: {}", e);
            return report;
        }
    };

    for hook in &hooks {
        tracing::debug!("Invoking webhook {} for {}", hook.url, event);
        match client.post(&hook.url).json(payload).send() {
            Ok(resp) if resp.status().is_success() => report.delivered += 1,
            Ok(resp) => tracing::warn!("Webhook {} answered {}", hook.url, resp.status()),
            Err(e) => tracing::warn!("Webhook {} failed: {}", hook.url, e),
        }
    }

    report
}
