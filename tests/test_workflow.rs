use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use image::{ImageFormat, Rgb, RgbImage};
use meme_crypt::config::{Config, setup_logging};
use meme_crypt::error::MemeError;
use meme_crypt::llm::ChatModel;
use meme_crypt::transport::Transport;
use meme_crypt::workflow::{RunOutcome, run};
use serde_json::json;

const CATALOG_URL: &str = "https://api.imgflip.com/get_memes";

struct FakeTransport {
    bodies: HashMap<String, Vec<u8>>,
    requested: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn new(bodies: Vec<(&str, Vec<u8>)>) -> Self {
        Self {
            bodies: bodies
                .into_iter()
                .map(|(url, body)| (url.to_string(), body))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requests_for(&self, url: &str) -> usize {
        self.requested
            .lock()
            .map(|requested| requested.iter().filter(|u| *u == url).count())
            .unwrap_or(0)
    }
}

impl Transport for FakeTransport {
    async fn get_bytes(&self, url: &str, _timeout: Option<Duration>) -> Result<Vec<u8>, MemeError> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| MemeError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Answers by what the prompt is asking for, two fragments at a time.
struct ScriptedModel {
    key: &'static str,
    choice: &'static str,
    caption: &'static str,
    calls: AtomicUsize,
}

impl ChatModel for ScriptedModel {
    async fn stream_chat(
        &self,
        prompt: &str,
        on_fragment: &mut dyn FnMut(&str),
    ) -> Result<(), MemeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = if prompt.contains("Available Meme Templates") {
            self.choice
        } else if prompt.contains("Create a meme caption") {
            self.caption
        } else {
            self.key
        };
        // scripted answers are ASCII, any byte offset is a char boundary
        let (head, tail) = answer.split_at(answer.len() / 2);
        for fragment in [head, tail] {
            if !fragment.is_empty() {
                on_fragment(fragment);
            }
        }
        Ok(())
    }
}

fn drake_png() -> Vec<u8> {
    let image = RgbImage::from_pixel(40, 30, Rgb([10, 200, 10]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn drake_catalog() -> Vec<u8> {
    json!({
        "success": true,
        "data": {
            "memes": [{"name": "Drake Hotline Bling", "url": "http://x/drake.jpg"}]
        }
    })
    .to_string()
    .into_bytes()
}

fn scripted() -> ScriptedModel {
    ScriptedModel {
        key: "career setbacks",
        choice: "Drake Hotline Bling",
        caption: "Still grinding",
        calls: AtomicUsize::new(0),
    }
}

fn test_config(dir: &Path) -> Config {
    Config::with_dirs(
        "sk-test",
        dir.join("templates"),
        dir.join("generated_memes"),
    )
    .expect("config")
}

#[tokio::test]
async fn test_end_to_end() {
    let _ = setup_logging(true);
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let transport = FakeTransport::new(vec![
        (CATALOG_URL, drake_catalog()),
        ("http://x/drake.jpg", drake_png()),
    ]);
    let model = scripted();

    let outcome = run(&config, &transport, &model, "promotion denied again").await;

    let RunOutcome::Completed {
        key,
        template_name,
        caption,
        folder,
    } = outcome
    else {
        panic!("run did not complete");
    };
    assert_eq!(key, "career setbacks");
    assert_eq!(template_name, "Drake Hotline Bling");
    assert_eq!(caption, "Still grinding");
    assert_eq!(model.calls.load(Ordering::SeqCst), 3);

    // named after the raw message, not the key
    assert_eq!(
        folder,
        dir.path()
            .join("generated_memes")
            .join("promotion denied aga")
    );
    let written = std::fs::read_to_string(folder.join("caption.txt")).expect("read caption");
    assert_eq!(written, "Still grinding");
    let image = image::open(folder.join("image.jpg")).expect("open image");
    assert_eq!((image.width(), image.height()), (40, 30));

    let cached = dir.path().join("templates").join("drake_hotline_bling.jpg");
    assert!(cached.is_file());
    assert_eq!(transport.requests_for("http://x/drake.jpg"), 1);
}

#[tokio::test]
async fn test_second_run_uses_cached_template() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let transport = FakeTransport::new(vec![
        (CATALOG_URL, drake_catalog()),
        ("http://x/drake.jpg", drake_png()),
    ]);
    let model = scripted();

    run(&config, &transport, &model, "first message").await;
    run(&config, &transport, &model, "second message").await;

    assert_eq!(transport.requests_for(CATALOG_URL), 2);
    assert_eq!(transport.requests_for("http://x/drake.jpg"), 1);
}

#[tokio::test]
async fn test_failed_download_writes_placeholder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let transport = FakeTransport::new(vec![(CATALOG_URL, drake_catalog())]);
    let model = scripted();

    let outcome = run(&config, &transport, &model, "promotion denied again").await;
    let RunOutcome::Completed { folder, .. } = outcome else {
        panic!("run did not complete");
    };
    let image = image::open(folder.join("image.jpg")).expect("open image");
    assert_eq!((image.width(), image.height()), (500, 500));
    // chosen once, then once more by the random fallback
    assert_eq!(transport.requests_for("http://x/drake.jpg"), 2);
}

#[tokio::test]
async fn test_dot_dot_message_stays_in_output_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("a");
    let config = test_config(&root);
    let transport = FakeTransport::new(vec![
        (CATALOG_URL, drake_catalog()),
        ("http://x/drake.jpg", drake_png()),
    ]);
    let model = scripted();

    let outcome = run(&config, &transport, &model, "..").await;
    let RunOutcome::Completed { folder, .. } = outcome else {
        panic!("run did not complete");
    };
    assert_eq!(folder, config.output_dir.join("__"));
    assert!(folder.join("caption.txt").is_file());
    assert!(!config.output_dir.join("caption.txt").exists());
    assert!(!root.join("caption.txt").exists());
}

#[tokio::test]
async fn test_empty_message_aborts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let transport = FakeTransport::new(vec![(CATALOG_URL, drake_catalog())]);
    let model = scripted();

    assert_eq!(
        run(&config, &transport, &model, "").await,
        RunOutcome::NoMessage
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert_eq!(transport.requests_for(CATALOG_URL), 0);
}

#[tokio::test]
async fn test_empty_catalog_aborts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());
    let catalog = json!({"success": true, "data": {"memes": []}});
    let transport = FakeTransport::new(vec![(CATALOG_URL, catalog.to_string().into_bytes())]);
    let model = scripted();

    assert_eq!(
        run(&config, &transport, &model, "promotion denied again").await,
        RunOutcome::NoTemplates
    );
    // only the key was generated
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    assert!(!config.output_dir.join("promotion denied aga").exists());
}
