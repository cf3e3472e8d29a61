use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};

#[derive(Debug, Deserialize)]
struct Label {
    month: String,
    day: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    link: String,
    img_source: String,
    text_content: String,
}

#[derive(Debug, Deserialize)]
struct DayResponse {
    date: String,
    key: String,
    label: Label,
    event: Option<Event>,
}

#[derive(Debug, Deserialize)]
struct ViewsResponse {
    count: u64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn seeded_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("this_day_news_http_{}_{}.json", std::process::id(), nanos));

    let seed = serde_json::json!({
        "documents": {
            "days/1492024": {
                "link": "https://www.rte.ie/news/2024/0914/first-story/",
                "imgSource": "https://img.rte.ie/first.jpg",
                "textContent": "First story in the archive"
            },
            "days/1102024": {
                "link": "https://www.rte.ie/news/2024/1001/budget/",
                "imgSource": "https://img.rte.ie/budget.jpg",
                "textContent": "Budget <2025> announced"
            }
        }
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&seed).unwrap()).expect("write seed data");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/views")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = seeded_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_this_day_news"))
        .env("PORT", port.to_string())
        .env("NEWS_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn current_views(client: &Client, base_url: &str) -> u64 {
    let views: ViewsResponse = client
        .get(format!("{base_url}/api/views"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    views.count
}

#[tokio::test]
async fn http_day_lookup_returns_stored_story() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let day: DayResponse = client
        .get(format!("{}/api/days/2024-09-14", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(day.date, "2024-09-14");
    assert_eq!(day.key, "1492024");
    assert_eq!(day.label.month, "September");
    assert_eq!(day.label.day, 14);
    let event = day.event.expect("missing event");
    assert_eq!(event.link, "https://www.rte.ie/news/2024/0914/first-story/");
    assert_eq!(event.img_source, "https://img.rte.ie/first.jpg");
    assert_eq!(event.text_content, "First story in the archive");
}

#[tokio::test]
async fn http_day_without_story_has_null_event() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let day: DayResponse = client
        .get(format!("{}/api/days/2024-09-15", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(day.key, "1592024");
    assert!(day.event.is_none());
}

#[tokio::test]
async fn http_day_rejects_bad_and_early_dates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for date in ["2024-09-13", "14-09-2024", "2024-02-30"] {
        let response = client
            .get(format!("{}/api/days/{date}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "date {date}");
    }
}

#[tokio::test]
async fn http_index_renders_story_and_no_information() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/?date=2024-10-01", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("October 1"));
    assert!(html.contains("Budget &lt;2025&gt; announced"));

    let html = client
        .get(format!("{}/?date=2024-10-02", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(r#"<p id="no-info" class="no-info">Unfortunately we don't have information for this day.</p>"#));

    let response = client
        .get(format!("{}/?date=2024-01-01", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_record_view_increments_counter() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = current_views(&client, &server.base_url).await;
    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/views", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    assert_eq!(current_views(&client, &server.base_url).await, before + 2);
}

#[tokio::test]
async fn http_view_stream_pushes_new_counts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = current_views(&client, &server.base_url).await;
    let mut stream = client
        .get(format!("{}/api/views/stream", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(stream.status().is_success());

    client
        .post(format!("{}/api/views", server.base_url))
        .send()
        .await
        .unwrap();

    let expected = format!("\"count\":{}", before + 1);
    let seen = timeout(Duration::from_secs(3), async {
        let mut body = String::new();
        while let Some(chunk) = stream.chunk().await.unwrap() {
            body.push_str(&String::from_utf8_lossy(&chunk));
            if body.contains(&expected) {
                return body;
            }
        }
        body
    })
    .await
    .expect("no count pushed");

    assert!(seen.contains("event: count"));
    assert!(seen.contains(&expected));
}
