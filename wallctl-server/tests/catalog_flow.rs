//! End-to-end flows through the router: login, upload, search, collections
//! and ownership-aware deletion.

use std::io::Cursor;
use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wallctl_core::models::{Password, SearchTerms};
use wallctl_server::auth::ensure_default_admin;
use wallctl_server::{bootstrap, build_router, create_memory_pool, AppState, ServerConfig, UploadStore};

const BOUNDARY: &str = "catalog-flow-boundary";

struct Harness {
    router: Router,
    uploads: TempDir,
}

impl Harness {
    async fn start() -> Self {
        let pool = create_memory_pool().await.unwrap();
        bootstrap(&pool).await.unwrap();
        ensure_default_admin(&pool, &Password::new("admin123").unwrap())
            .await
            .unwrap();

        let uploads = tempfile::tempdir().unwrap();
        let state = AppState {
            pool,
            uploads: UploadStore::new(uploads.path()),
            session_ttl_secs: 3600,
        };
        Self {
            router: build_router(state, &ServerConfig::default()),
            uploads,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, cookie: &str) -> Response {
        self.send(
            Request::get(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn post(&self, uri: &str, cookie: &str, body: Value) -> Response {
        self.send(
            Request::post(uri)
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Log in and return the `name=value` part of the session cookie.
    async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/login", "", json!({ "username": username, "password": password }))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_owned()
    }

    async fn create_user(&self, admin: &str, username: &str) -> String {
        let response = self
            .post(
                "/admin/create_user",
                admin,
                json!({ "username": username, "password": "pw" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        self.login(username, "pw").await
    }

    async fn upload(&self, cookie: &str, name: &str, tags: &str, colors: &str, file: (&str, Vec<u8>)) -> Response {
        let mut body = Vec::new();
        for (field, value) in [("name", name), ("device", "desktop"), ("tags", tags), ("colors", colors)] {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n")
                    .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\r\n",
                file.0
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.1);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        self.send(
            Request::post("/upload_wallpaper")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    fn stored_file(&self, relative: &str) -> PathBuf {
        self.uploads.path().join(relative)
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([250, 120, 40]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

fn names(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["name"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn shared_wallpaper_survives_owner_delete_until_unlinked() {
    let app = Harness::start().await;
    let admin = app.login("admin", "admin123").await;
    let a = app.create_user(&admin, "ania").await;
    let b = app.create_user(&admin, "bartek").await;

    // A uploads
    let response = app
        .upload(&a, "Sunset", "nature, warm", "orange", ("Sunset.jpg", jpeg(32, 18)))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let id = created["wallpaper"]["id"].as_i64().unwrap();
    let path = created["wallpaper"]["path"].as_str().unwrap().to_owned();
    assert!(path.starts_with("permanent/") && path.ends_with(".jpg"));
    assert!(app.stored_file(&path).exists());

    // anyone can find it
    let page = json_body(app.get("/wallpapers?search=warm", &b).await).await;
    assert_eq!(names(&page), ["Sunset"]);

    // B cannot delete it
    let denied = app.post(&format!("/delete_wallpaper/{id}"), &b, json!({})).await;
    assert_eq!(denied.status(), StatusCode::SEE_OTHER);
    assert_eq!(denied.headers()[header::LOCATION], "/dashboard");

    // B collects it
    let collection = json_body(app.post("/create_collection", &b, json!({"name": "Warm things"})).await).await;
    let cid = collection["id"].as_i64().unwrap();
    let added = app
        .post(&format!("/add_to_collection/{id}"), &b, json!({ "collection_id": cid }))
        .await;
    assert_eq!(added.status(), StatusCode::OK);

    // A's delete only unlinks
    let outcome = json_body(app.post(&format!("/delete_wallpaper/{id}"), &a, json!({})).await).await;
    assert_eq!(outcome["outcome"], "unlinked");
    assert!(app.stored_file(&path).exists());
    let still_there = json_body(app.get(&format!("/collection/{cid}"), &b).await).await;
    assert_eq!(names(&still_there["wallpapers"]), ["Sunset"]);

    // B lets go, A deletes for real
    let removed = app
        .post(&format!("/remove_wallpaper_from_collection/{cid}/{id}"), &b, json!({}))
        .await;
    assert_eq!(removed.status(), StatusCode::OK);
    let outcome = json_body(app.post(&format!("/delete_wallpaper/{id}"), &a, json!({})).await).await;
    assert_eq!(outcome["outcome"], "deleted");
    assert!(!app.stored_file(&path).exists());

    let page = json_body(app.get("/wallpapers", &a).await).await;
    assert_eq!(page["total"], 0);
    let gone = app.get(&format!("/download_wallpaper/{id}"), &a).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_matches_names_tags_and_colors() {
    let app = Harness::start().await;
    let admin = app.login("admin", "admin123").await;
    let user = app.create_user(&admin, "ania").await;

    let library = [
        ("Sunset Beach", "nature, warm", "Orange"),
        ("Night City", "urban, neon", "purple, Black"),
        ("Forest", "nature, green", "green"),
        ("Ocean Blue", "water", "blue, teal"),
        ("Desert", "sand, WARM", "beige"),
        ("Zachód Słońca", "Wieczór, ciepło", "Żółty"),
        ("Église", "Été", "Écru, Złoty"),
    ];
    for (name, tags, colors) in library {
        let response = app.upload(&user, name, tags, colors, ("w.jpg", jpeg(40, 30))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    for search in [
        "warm", "NATURE", "blue", "e", "bla, sand", "city", "zzz", " , ", "zachód", "ŻÓŁTY", "Été",
        "église", "ZŁ, neon", "ó",
    ] {
        let terms = SearchTerms::parse(Some(search));
        let mut expected: Vec<String> = library
            .iter()
            .rev()
            .filter(|(name, tags, colors)| {
                let candidates = std::iter::once(*name)
                    .chain(tags.split(',').map(str::trim))
                    .chain(colors.split(',').map(str::trim));
                terms.matches(candidates)
            })
            .map(|(name, _, _)| name.to_string())
            .collect();
        expected.truncate(12);

        let uri = format!("/wallpapers?search={}", urlencoding::encode(search));
        let page = json_body(app.get(&uri, &user).await).await;
        assert_eq!(names(&page), expected, "search {search:?}");
    }
}

#[tokio::test]
async fn rejected_upload_leaves_no_file() {
    let app = Harness::start().await;
    let admin = app.login("admin", "admin123").await;
    let user = app.create_user(&admin, "ania").await;

    let response = app
        .upload(&user, "Fake", "x", "y", ("fake.jpg", b"GIF89a not really".to_vec()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation_error");

    let permanent = app.uploads.path().join("permanent");
    let leftovers = std::fs::read_dir(permanent).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);
}
