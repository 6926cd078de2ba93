//! Directory-user export records (Graph API shape) → flat user records.

use serde_json::{Map, Value};
use uuid::Uuid;

use super::Transform;
use crate::Record;
use crate::error::{TransformError, json_type_name};

/// Output key ← input key, in output order. `external_id` and `signInActivity` are handled apart.
const RENAMES: [(&str, &str); 6] = [
    ("mail", "mail"),
    ("type", "userType"),
    ("location", "usageLocation"),
    ("is_enabled", "accountEnabled"),
    ("first_name", "givenName"),
    ("last_name", "surname"),
];

/// `(output group, input dateTime key, input requestId key)`.
const SIGN_IN_GROUPS: [(&str, &str, &str); 3] = [
    ("lastSignIn", "lastSignInDateTime", "lastSignInRequestId"),
    (
        "lastNonInteractiveSignIn",
        "lastNonInteractiveSignInDateTime",
        "lastNonInteractiveSignInRequestId",
    ),
    (
        "lastSuccessfulSignIn",
        "lastSuccessfulSignInDateTime",
        "lastSuccessfulSignInRequestId",
    ),
];

#[derive(Clone, Copy, Debug, Default)]
pub struct UserTransform;

impl Transform for UserTransform {
    fn name(&self) -> &str {
        "user"
    }

    fn transform(&self, record: &Record) -> Result<Record, TransformError> {
        let user = record
            .as_object()
            .ok_or_else(|| TransformError::NotAnObject(json_type_name(record)))?;

        let mut out = Map::with_capacity(RENAMES.len() + 3);
        out.insert("Id".into(), field(user, "id"));
        // Only an absent key gets a fresh id; an explicit null is kept.
        let external_id = match user.get("external_id") {
            Some(v) => v.clone(),
            None => Value::String(Uuid::new_v4().to_string()),
        };
        out.insert("external_id".into(), external_id);
        for (to, from) in RENAMES {
            out.insert(to.into(), field(user, from));
        }
        out.insert(
            "signInActivity".into(),
            sign_in_activity(user.get("signInActivity"))?,
        );
        Ok(Value::Object(out))
    }
}

fn field(user: &Map<String, Value>, key: &str) -> Value {
    user.get(key).cloned().unwrap_or(Value::Null)
}

fn sign_in_activity(activity: Option<&Value>) -> Result<Value, TransformError> {
    let Some(activity) = activity.filter(|v| !is_empty_value(v)) else {
        return Ok(Value::Null);
    };
    let activity = activity
        .as_object()
        .ok_or_else(|| TransformError::InvalidField {
            field: "signInActivity",
            found: json_type_name(activity),
        })?;

    let mut out = Map::with_capacity(SIGN_IN_GROUPS.len());
    for (group, date_key, request_key) in SIGN_IN_GROUPS {
        let mut entry = Map::with_capacity(2);
        entry.insert("dateTime".into(), field(activity, date_key));
        entry.insert("requestId".into(), field(activity, request_key));
        out.insert(group.into(), Value::Object(entry));
    }
    Ok(Value::Object(out))
}

/// null, false, 0, "", [] and {} carry no sign-in data.
fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
