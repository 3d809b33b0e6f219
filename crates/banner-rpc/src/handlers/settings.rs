//! Settings handlers.

use crate::server::AppState;
use banner_core::{BannerError, Settings};
use serde_json::{json, Value};
use tracing::info;

/// Settings may be sent under a `settings` key or as the params object itself.
fn settings_from_params(params: &Value) -> banner_core::Result<Settings> {
    let raw = params.get("settings").unwrap_or(params);
    serde_json::from_value(raw.clone()).map_err(|e| BannerError::InvalidParams {
        message: format!("Invalid settings: {}", e),
    })
}

pub async fn get_settings(state: &AppState, _params: &Value) -> banner_core::Result<Value> {
    Ok(serde_json::to_value(&*state.engine.settings())?)
}

pub async fn save_settings(state: &AppState, params: &Value) -> banner_core::Result<Value> {
    let settings = settings_from_params(params)?;
    state.settings_store.save(&settings)?;
    info!("Settings saved, refreshing banners");

    let instruction = state.engine.settings_changed(settings).await;
    Ok(json!({ "instruction": instruction }))
}

pub async fn validate_settings(_state: &AppState, params: &Value) -> banner_core::Result<Value> {
    let settings = settings_from_params(params)?;
    match settings.validate() {
        Ok(()) => Ok(json!({ "valid": true })),
        Err(e) => Ok(json!({
            "valid": false,
            "error": e.to_string(),
            "code": e.to_rpc_error_code(),
        })),
    }
}
