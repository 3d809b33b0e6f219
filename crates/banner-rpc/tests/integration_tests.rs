//! Integration tests for the banner-rpc JSON-RPC server.
//!
//! These tests start the real binary against a temporary vault and verify
//! that responses have the shapes the plugin shim relies on.

use futures::future::join_all;
use serde_json::{json, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncBufReadExt;

/// Create a temporary vault with a couple of notes and one image.
fn create_test_vault() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join("Blog")).unwrap();
    std::fs::create_dir_all(root.join("Journal")).unwrap();
    std::fs::create_dir_all(root.join("attachments")).unwrap();
    std::fs::write(root.join("attachments/cover.jpg"), b"jpg").unwrap();
    std::fs::write(
        root.join("Blog/first.md"),
        "---\nbanner: attachments/cover.jpg\nbanner-height: 200\n---\n# First\n",
    )
    .unwrap();
    std::fs::write(root.join("Journal/today.md"), "# Today\n").unwrap();

    temp_dir
}

/// A running `banner-rpc` process bound to an ephemeral port.
struct TestServer {
    _child: tokio::process::Child,
    port: u16,
    client: reqwest::Client,
}

impl TestServer {
    /// Spawn the binary for `vault_root` and wait for the port handshake and
    /// a healthy `/health`.
    async fn spawn(vault_root: &Path) -> Result<Self, String> {
        let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_banner-rpc"))
            .args(["--host", "127.0.0.1", "--port", "0", "--vault"])
            .arg(vault_root)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to spawn banner-rpc: {e}"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| "stdout not captured".to_string())?;
        let mut lines = tokio::io::BufReader::new(stdout).lines();

        let port = tokio::time::timeout(Duration::from_secs(20), async {
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(port) = line.strip_prefix("RPC_PORT=") {
                    return port.trim().parse::<u16>().ok();
                }
            }
            None
        })
        .await
        .ok()
        .flatten()
        .ok_or_else(|| "no RPC_PORT handshake from banner-rpc".to_string())?;

        // Keep the pipe drained so the server never blocks on stdout.
        tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });

        let server = Self {
            _child: child,
            port,
            client: reqwest::Client::new(),
        };
        server.wait_healthy(Duration::from_secs(15)).await?;
        Ok(server)
    }

    async fn wait_healthy(&self, limit: Duration) -> Result<(), String> {
        let deadline = tokio::time::Instant::now() + limit;
        while tokio::time::Instant::now() < deadline {
            let health = self
                .client
                .get(format!("http://127.0.0.1:{}/health", self.port))
                .timeout(Duration::from_secs(2))
                .send()
                .await;
            if let Ok(response) = health {
                if let Ok(body) = response.json::<Value>().await {
                    if body["status"] == "ok" {
                        return Ok(());
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Err(format!("banner-rpc on port {} never became healthy", self.port))
    }

    /// Full JSON-RPC envelope for one call.
    async fn call_raw(&self, method: &str, params: Value) -> Value {
        self.client
            .post(format!("http://127.0.0.1:{}/rpc", self.port))
            .json(&json!({"jsonrpc": "2.0", "method": method, "params": params, "id": 7}))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .expect("rpc request failed")
            .json::<Value>()
            .await
            .expect("rpc response was not JSON")
    }

    /// The `result` of one call; panics on a JSON-RPC error.
    async fn call(&self, method: &str, params: Value) -> Value {
        let envelope = self.call_raw(method, params).await;
        assert!(envelope.get("error").is_none(), "{} failed: {}", method, envelope);
        envelope["result"].clone()
    }
}

// =============================================================================
// Response Structure Validators
// =============================================================================

/// Validate BaseResponse structure: { success: bool }
fn validate_base_response(response: &Value) -> Result<(), String> {
    if response.get("success").and_then(|v| v.as_bool()).is_none() {
        return Err("Missing 'success' field".into());
    }
    Ok(())
}

/// Validate a render instruction: { action: "show", imageHandle, ... } or { action: "remove" }
fn validate_instruction(instruction: &Value) -> Result<(), String> {
    match instruction.get("action").and_then(|v| v.as_str()) {
        Some("remove") => Ok(()),
        Some("show") => {
            let required_fields = [
                "imageHandle",
                "yPosition",
                "contentStartPosition",
                "imageDisplay",
                "imageRepeat",
                "bannerHeight",
                "fade",
            ];
            for field in required_fields {
                if instruction.get(field).is_none() {
                    return Err(format!("Missing field: {}", field));
                }
            }
            Ok(())
        }
        other => Err(format!("Unexpected action: {:?}", other)),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_health_and_unknown_method() {
    let vault = create_test_vault();
    let server = TestServer::spawn(vault.path()).await.unwrap();

    let result = server.call("health_check", json!({})).await;
    assert_eq!(result["status"], "ok");

    let envelope = server.call_raw("not_a_method", json!({})).await;
    assert_eq!(envelope["error"]["code"], -32601);
    assert_eq!(envelope["jsonrpc"], "2.0");
    assert_eq!(envelope["id"], 7);
}

#[tokio::test]
async fn test_lifecycle_event_shapes() {
    let vault = create_test_vault();
    let server = TestServer::spawn(vault.path()).await.unwrap();

    let result = server
        .call(
            "lifecycle_event",
            json!({"path": "Blog/first.md", "kind": "activeViewChanged"}),
        )
        .await;
    validate_base_response(&result).unwrap();
    validate_instruction(&result["instruction"]).unwrap();
    assert_eq!(result["instruction"]["imageHandle"], "data:image/jpeg;base64,anBn");
    assert_eq!(result["instruction"]["bannerHeight"], 200.0);

    let result = server
        .call(
            "lifecycle_event",
            json!({"path": "Journal/today.md", "kind": "activeViewChanged"}),
        )
        .await;
    validate_instruction(&result["instruction"]).unwrap();
    assert_eq!(result["instruction"]["action"], "remove");
}

#[tokio::test]
async fn test_metadata_burst_is_coalesced() {
    let vault = create_test_vault();
    let server = TestServer::spawn(vault.path()).await.unwrap();

    let calls = (0..4u64).map(|i| {
        let server = &server;
        async move {
            tokio::time::sleep(Duration::from_millis(i * 40)).await;
            server
                .call(
                    "metadata_changed",
                    json!({
                        "path": "Journal/today.md",
                        "frontmatter": {"banner": format!("https://example.com/{}.jpg", i)}
                    }),
                )
                .await
        }
    });
    let results = join_all(calls).await;

    let delivered: Vec<&Value> = results
        .iter()
        .filter(|r| r["superseded"] == false)
        .collect();
    assert_eq!(delivered.len(), 1);
    assert_eq!(
        delivered[0]["instruction"]["imageHandle"],
        "https://example.com/3.jpg"
    );
}

#[tokio::test]
async fn test_settings_persist_across_restarts() {
    let vault = create_test_vault();
    let server = TestServer::spawn(vault.path()).await.unwrap();

    let mut settings = server.call("get_settings", json!({})).await["settings"].clone();
    settings["folderImages"] = json!([{
        "folder": "Journal",
        "image": "attachments/cover.jpg",
        "yPosition": 10
    }]);

    let result = server
        .call("save_settings", json!({"settings": settings}))
        .await;
    validate_base_response(&result).unwrap();
    drop(server);

    let server = TestServer::spawn(vault.path()).await.unwrap();
    let result = server
        .call(
            "lifecycle_event",
            json!({"path": "Journal/today.md", "kind": "activeViewChanged"}),
        )
        .await;
    assert_eq!(result["instruction"]["action"], "show");
    assert_eq!(result["instruction"]["yPosition"], 10.0);
}
