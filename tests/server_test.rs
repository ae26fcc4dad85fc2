use static_scaffold::server::{serve_on, JAVASCRIPT_MIME};
use static_scaffold::SiteConfig;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio::net::TcpListener;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Starts the static server on an ephemeral port and returns its base URL.
async fn start_server(root: &Path) -> String {
    let mut config = SiteConfig::default();
    config.server.root = root.to_str().unwrap().to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve_on(listener, &config).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_static_roots_are_tried_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(&root.join("includes/nav.html"), "<nav>from includes</nav>");
    write(&root.join("public/nav.html"), "<nav>from public</nav>");
    write(&root.join("public/index.html"), "<h1>public index</h1>");
    write(&root.join("src/index.html"), "<h1>src index</h1>");
    write(&root.join("src/css/site.css"), "body {}");

    let base = start_server(root).await;
    let client = reqwest::Client::new();

    let nav = client.get(format!("{}/nav.html", base)).send().await.unwrap();
    assert_eq!(nav.status(), 200);
    assert_eq!(nav.text().await.unwrap(), "<nav>from includes</nav>");

    let index = client.get(format!("{}/index.html", base)).send().await.unwrap();
    assert_eq!(index.text().await.unwrap(), "<h1>public index</h1>");

    let css = client.get(format!("{}/css/site.css", base)).send().await.unwrap();
    assert_eq!(css.status(), 200);
    assert_eq!(css.text().await.unwrap(), "body {}");

    let missing = client.get(format!("{}/nope.html", base)).send().await.unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_javascript_served_with_module_mime() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(&root.join("src/controller/index.js"), "export default () => {};");
    write(&root.join("src/css/site.css"), "body {}");

    let base = start_server(root).await;
    let client = reqwest::Client::new();

    let script = client
        .get(format!("{}/controller/index.js", base))
        .send()
        .await
        .unwrap();
    assert_eq!(script.status(), 200);
    assert_eq!(
        script.headers().get("content-type").unwrap().to_str().unwrap(),
        JAVASCRIPT_MIME
    );
    assert_eq!(script.text().await.unwrap(), "export default () => {};");

    let css = client.get(format!("{}/css/site.css", base)).send().await.unwrap();
    assert!(css
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/css"));
}
