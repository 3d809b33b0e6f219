//! Response wrapping for the plugin shim.
//!
//! The shim expects every result in the form `{success: bool, ...data}`.
//! Handlers return raw data; this module shapes it per method.

use serde_json::{json, Value};

/// Wrap handler results in the shape the plugin shim expects.
pub fn wrap_response(method: &str, result: Value) -> Value {
    match method {
        "get_settings" => {
            json!({
                "success": true,
                "settings": if result.is_null() { json!({}) } else { result }
            })
        }

        // Bool methods
        "forget_document" => {
            json!({
                "success": result.as_bool().unwrap_or(false)
            })
        }

        // Validation reports its own outcome
        "validate_settings" => result,

        // Dict methods get `success` merged in
        _ => match result {
            Value::Object(mut map) => {
                map.entry("success").or_insert(json!(true));
                Value::Object(map)
            }
            Value::Null => json!({ "success": true }),
            other => other,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_settings() {
        let wrapped = wrap_response("get_settings", json!({"numberOfImages": 10}));
        assert_eq!(wrapped["success"], true);
        assert_eq!(wrapped["settings"]["numberOfImages"], 10);

        let wrapped = wrap_response("get_settings", Value::Null);
        assert_eq!(wrapped["settings"], json!({}));
    }

    #[test]
    fn test_wrap_bool_method() {
        assert_eq!(wrap_response("forget_document", json!(true))["success"], true);
        assert_eq!(wrap_response("forget_document", json!(false))["success"], false);
    }

    #[test]
    fn test_dict_methods_get_success_merged() {
        let wrapped = wrap_response("lifecycle_event", json!({"phase": "resolved"}));
        assert_eq!(wrapped, json!({"phase": "resolved", "success": true}));
    }

    #[test]
    fn test_validate_passthrough() {
        let data = json!({"valid": false, "error": "bad"});
        assert_eq!(wrap_response("validate_settings", data.clone()), data);
    }
}
