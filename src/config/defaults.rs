use serde_json::{json, Value};

/// The built-in configuration every override document is merged onto. Sections other than
/// `calendar` and `display` are kept for the fetchers that read them.
pub fn builtin_defaults() -> Value {
    json!({
        "calendar": {
            "enabled": true,
            "id": "primary",
            "lookaheadDays": 1,
            "showFocusTime": true,
            "workStartHour": 9,
            "workEndHour": 18,
            "minFocusMinutes": 30,
            "maxFocusBlocks": 3,
            "countInProgressEvents": true,
            "sources": [],
            "timeoutSeconds": 10
        },
        "weather": {
            "enabled": false,
            "location": "",
            "units": "metric"
        },
        "email": {
            "enabled": false,
            "maxMessages": 5
        },
        "tasks": {
            "enabled": false,
            "maxTasks": 10
        },
        "display": {
            "color": true,
            "compact": false,
            "maxEvents": 10
        }
    })
}
