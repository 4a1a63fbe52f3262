//! Terminal output.

use serde_json::{json, Value};

use bedrock_core::{status_color, Notification, ResourceKind};
use bedrock_store::Store;

/// Session summary shown by `status` and after `login`.
pub fn status(store: &Store) -> Value {
    let auth = store.auth_state();
    json!({
        "status": auth.status(),
        "user": auth.user,
        "api": store.config().api.base_url,
        "dark_theme": store.theme().is_dark().unwrap_or(false),
    })
}

pub fn print_notification(notification: &Notification) {
    eprintln!(
        "[{}] {}",
        notification.severity.color(),
        notification.message
    );
}

/// One line per record: id, name, then status with its badge colour.
pub fn print_table(kind: ResourceKind, records: &[Value]) {
    if records.is_empty() {
        println!("no {} records", kind);
        return;
    }

    for record in records {
        let id = record.get("id").map(cell).unwrap_or_default();
        let name = record.get("name").map(cell).unwrap_or_default();
        match record.get("status").and_then(Value::as_str) {
            Some(status) => println!(
                "{:<8} {:<32} {} ({})",
                id,
                name,
                status,
                status_color(status)
            ),
            None => println!("{:<8} {}", id, name),
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
