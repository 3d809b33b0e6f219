//! Engine wired to a real on-disk vault, a settings file and a mock Pexels
//! server.

use banner_core::{
    BannerEngine, FsVault, HttpClient, ImageProvider, LifecycleEvent, LifecycleEventKind,
    MetadataProvider, NoopPreloader, PexelsProvider, RenderInstruction, Settings, SettingsStore,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a vault with a couple of notes and an image.
fn create_vault() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join("Blog")).unwrap();
    std::fs::create_dir_all(root.join("attachments")).unwrap();
    std::fs::write(root.join("attachments/hero.png"), b"png").unwrap();
    std::fs::write(
        root.join("Blog/linked.md"),
        "---\nbanner: \"[[hero|Hero image]]\"\nbanner-y: \"30\"\nbanner-repeat: \"true\"\n---\nBody\n",
    )
    .unwrap();
    std::fs::write(
        root.join("Blog/keyword.md"),
        "---\nbanner: mountains\n---\nBody\n",
    )
    .unwrap();

    temp_dir
}

async fn event_from_disk(vault: &FsVault, path: &str) -> LifecycleEvent {
    let mut event = LifecycleEvent::new(path, LifecycleEventKind::ActiveViewChanged);
    event.frontmatter = vault.frontmatter(path).await;
    event
}

#[tokio::test]
async fn test_internal_link_from_disk_frontmatter() {
    let temp_dir = create_vault();
    let vault = Arc::new(FsVault::new(temp_dir.path()));
    let engine = BannerEngine::builder(vault.clone(), vault.clone())
        .preloader(Arc::new(NoopPreloader))
        .build()
        .unwrap();

    let instruction = engine
        .on_lifecycle_event(event_from_disk(&vault, "Blog/linked.md").await)
        .await;

    match instruction {
        RenderInstruction::Show(display) => {
            assert_eq!(display.image_handle.as_str(), "data:image/png;base64,cG5n");
            assert_eq!(display.y_position, 30.0);
            assert!(display.image_repeat);
        }
        RenderInstruction::Remove => panic!("expected a banner"),
    }
}

#[tokio::test]
async fn test_keyword_through_pexels_and_saved_settings() {
    let temp_dir = create_vault();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("query", "mountains"))
        .and(query_param("per_page", "5"))
        .and(header("Authorization", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"photos": [{"src": {"original": "https://images.pexels.com/m.jpg"}}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let store = SettingsStore::for_vault(temp_dir.path());
    let settings = Settings {
        pexels_api_key: "test-key".into(),
        number_of_images: 5,
        ..Default::default()
    };
    store.save(&settings).unwrap();
    let settings = store.load().unwrap();

    let base_url = server.uri();
    let http = Arc::new(HttpClient::new().unwrap());
    let vault = Arc::new(FsVault::new(temp_dir.path()));
    let engine = BannerEngine::builder(vault.clone(), vault.clone())
        .settings(settings)
        .provider_factory(move |s: &Settings| -> Arc<dyn ImageProvider> {
            Arc::new(
                PexelsProvider::new(http.clone(), s.pexels_api_key.clone())
                    .with_base_url(base_url.clone()),
            )
        })
        .preloader(Arc::new(NoopPreloader))
        .rate_limit_interval(Duration::from_millis(10))
        .build()
        .unwrap();

    let first = engine
        .on_lifecycle_event(event_from_disk(&vault, "Blog/keyword.md").await)
        .await;
    let second = engine
        .on_lifecycle_event(event_from_disk(&vault, "Blog/keyword.md").await)
        .await;

    assert_eq!(
        first.image_handle().map(|h| h.as_str()),
        Some("https://images.pexels.com/m.jpg")
    );
    assert_eq!(first, second);
}
