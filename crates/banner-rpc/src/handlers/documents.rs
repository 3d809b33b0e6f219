//! Document lifecycle handlers.

use super::{get_bool_param, get_typed_param, require_str_param};
use crate::server::AppState;
use banner_core::{
    classify_reference as classify, BannerError, BannerReference, Frontmatter, LifecycleEvent,
    LifecycleEventKind, MetadataProvider, ReferenceKind, Vault, ViewMode,
};
use serde_json::{json, Value};

/// Build an event from request params.
///
/// `kind` may be omitted; `isContentChange` then picks between a metadata
/// change and a view switch. Frontmatter not sent by the caller is read
/// from the vault.
async fn event_from_params(
    state: &AppState,
    params: &Value,
    default_kind: LifecycleEventKind,
) -> banner_core::Result<LifecycleEvent> {
    let path = require_str_param(params, "path", "path")?;
    let kind = match get_typed_param::<LifecycleEventKind>(params, "kind", "kind")? {
        Some(kind) => kind,
        None => match get_bool_param(params, "is_content_change", "isContentChange") {
            Some(true) => LifecycleEventKind::MetadataChanged,
            Some(false) => LifecycleEventKind::ActiveViewChanged,
            None => default_kind,
        },
    };

    let frontmatter = match get_typed_param::<Frontmatter>(params, "frontmatter", "frontmatter")? {
        Some(frontmatter) => Some(frontmatter),
        None => state.vault.frontmatter(&path).await,
    };

    let mut event = LifecycleEvent::new(path, kind);
    if let Some(frontmatter) = frontmatter {
        event = event.with_frontmatter(frontmatter);
    }
    if let Some(view_mode) = get_typed_param::<ViewMode>(params, "view_mode", "viewMode")? {
        event = event.with_view_mode(view_mode);
    }
    Ok(event)
}

pub async fn lifecycle_event(state: &AppState, params: &Value) -> banner_core::Result<Value> {
    let event = event_from_params(state, params, LifecycleEventKind::ActiveViewChanged).await?;
    let path = event.path.clone();
    let instruction = state.engine.on_lifecycle_event(event).await;
    Ok(json!({
        "instruction": instruction,
        "phase": state.engine.phase(&path),
    }))
}

/// Debounced per path: only the last change in a burst is processed.
pub async fn metadata_changed(state: &AppState, params: &Value) -> banner_core::Result<Value> {
    let event = event_from_params(state, params, LifecycleEventKind::MetadataChanged).await?;
    let path = event.path.clone();

    let delivered = state
        .debouncer
        .debounce(path.clone(), || state.engine.on_lifecycle_event(event))
        .await;

    match delivered {
        Some(instruction) => Ok(json!({
            "superseded": false,
            "instruction": instruction,
            "phase": state.engine.phase(&path),
        })),
        None => Ok(json!({ "superseded": true })),
    }
}

pub async fn get_document_state(state: &AppState, params: &Value) -> banner_core::Result<Value> {
    let path = require_str_param(params, "path", "path")?;
    let memo = state.engine.state().get(&path).unwrap_or_default();
    Ok(json!({
        "path": path,
        "phase": state.engine.phase(&path),
        "imageHandle": memo.resolved_image_handle,
        "reference": memo.last_reference.map(|r| r.to_string()),
        "yPosition": memo.last_effective_position,
    }))
}

pub async fn forget_document(state: &AppState, params: &Value) -> banner_core::Result<Value> {
    let path = require_str_param(params, "path", "path")?;
    state.engine.forget(&path);
    Ok(json!(true))
}

pub async fn classify_reference(state: &AppState, params: &Value) -> banner_core::Result<Value> {
    let raw = params
        .get("reference")
        .ok_or_else(|| BannerError::InvalidParams {
            message: "Missing required parameter: reference".into(),
        })?;

    let kind = match BannerReference::from_value(raw) {
        Some(reference) => classify(&reference, |path| state.vault.entry(path)),
        None => ReferenceKind::Invalid,
    };
    Ok(json!({ "kind": kind }))
}
