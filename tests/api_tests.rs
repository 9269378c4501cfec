//! Integration tests for the songboard HTTP API
//!
//! Drives the router in-process against an in-memory database.

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use songboard::{auth::CookieSettings, build_router, db::Store, AppState};

async fn setup() -> Router {
    let store = Store::in_memory().await.expect("in-memory store");
    build_router(AppState::new(store, CookieSettings::default()))
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut request = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json_body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

async fn login(app: &Router, nickname: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "nickname": nickname })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["token"].as_str().unwrap().to_string()
}

async fn create_song(app: &Router, token: &str, title: &str, genre: &str, url: &str) -> Value {
    let response = send(
        app,
        Method::POST,
        "/api/songs",
        Some(token),
        Some(json!({
            "title": title,
            "artist": "Artist",
            "genre": genre,
            "youtubeUrl": url
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;
    let response = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_sets_cookie_and_reuses_user() {
    let app = setup().await;

    let first = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "nickname": "  minji  " })),
    )
    .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["id"], 1);
    assert_eq!(first.body["nickname"], "minji");

    let cookie = first.headers[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    // the cookie alone authenticates
    let session_pair = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/me")
        .header(header::COOKIE, session_pair)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let second = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "nickname": "minji" })),
    )
    .await;
    assert_eq!(second.body["id"], 1);
    assert_ne!(second.body["token"], first.body["token"]);

    let other = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "nickname": "hanni" })),
    )
    .await;
    assert_eq!(other.body["id"], 2);
}

#[tokio::test]
async fn test_login_requires_nickname() {
    let app = setup().await;

    for body in [json!({ "nickname": "   " }), json!({})] {
        let response = send(&app, Method::POST, "/api/login", None, Some(body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["code"], "validation_error");
    }
}

#[tokio::test]
async fn test_me_and_auth_failures() {
    let app = setup().await;
    let token = login(&app, "minji").await;

    let me = send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body, json!({ "id": 1, "nickname": "minji" }));

    let missing = send(&app, Method::GET, "/api/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["code"], "auth_error");

    let bogus = send(&app, Method::GET, "/api/me", Some("not-a-session"), None).await;
    assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);
    assert_ne!(bogus.body["error"], missing.body["error"]);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = setup().await;
    let token = login(&app, "minji").await;

    let response = send(&app, Method::POST, "/api/logout", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let me = send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    // logging out without a session is still fine
    let again = send(&app, Method::POST, "/api/logout", None, None).await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_song_normalizes_fields() {
    let app = setup().await;
    let token = login(&app, "minji").await;

    let long_title = "가".repeat(150);
    let song = create_song(
        &app,
        &token,
        &long_title,
        "발라드",
        "https://www.youtube.com/watch?v=abcDE12345&list=xyz&t=42",
    )
    .await;

    assert_eq!(song["id"], 1);
    assert_eq!(song["owner_id"], 1);
    assert_eq!(song["title"].as_str().unwrap().chars().count(), 100);
    assert_eq!(song["youtube_url"], "https://www.youtube.com/watch?v=abcDE12345");
    assert!(song.get("like_count").is_none());
}

#[tokio::test]
async fn test_create_song_rejections() {
    let app = setup().await;

    let body = json!({
        "title": "t",
        "artist": "a",
        "genre": "POP",
        "youtubeUrl": "https://youtu.be/abcDE12345"
    });
    let unauthenticated = send(&app, Method::POST, "/api/songs", None, Some(body)).await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);

    let token = login(&app, "minji").await;
    let vimeo = send(
        &app,
        Method::POST,
        "/api/songs",
        Some(&token),
        Some(json!({
            "title": "t",
            "artist": "a",
            "genre": "POP",
            "youtubeUrl": "https://vimeo.com/12345"
        })),
    )
    .await;
    assert_eq!(vimeo.status, StatusCode::BAD_REQUEST);
    assert_eq!(vimeo.body["code"], "validation_error");

    let blank_title = send(
        &app,
        Method::POST,
        "/api/songs",
        Some(&token),
        Some(json!({
            "title": "   ",
            "artist": "a",
            "genre": "POP",
            "youtubeUrl": "https://youtu.be/abcDE12345"
        })),
    )
    .await;
    assert_eq!(blank_title.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_like_round_trip() {
    let app = setup().await;
    let token = login(&app, "minji").await;
    create_song(&app, &token, "Ditto", "댄스", "https://youtu.be/pSUydWEqKwE").await;

    let status = send(&app, Method::GET, "/api/songs/1/like", Some(&token), None).await;
    assert_eq!(status.body, json!({ "liked": false }));

    let on = send(&app, Method::POST, "/api/songs/1/like", Some(&token), None).await;
    assert_eq!(on.body, json!({ "liked": true, "like_count": 1 }));

    let status = send(&app, Method::GET, "/api/songs/1/like", Some(&token), None).await;
    assert_eq!(status.body, json!({ "liked": true }));

    let off = send(&app, Method::POST, "/api/songs/1/like", Some(&token), None).await;
    assert_eq!(off.body, json!({ "liked": false, "like_count": 0 }));

    let missing = send(&app, Method::POST, "/api/songs/42/like", Some(&token), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], "not_found");

    // status of an unknown song is simply "not liked"
    let unknown = send(&app, Method::GET, "/api/songs/42/like", Some(&token), None).await;
    assert_eq!(unknown.body, json!({ "liked": false }));
}

#[tokio::test]
async fn test_list_songs_sorting_and_filtering() {
    let app = setup().await;
    let minji = login(&app, "minji").await;
    let hanni = login(&app, "hanni").await;

    create_song(&app, &minji, "one", "POP", "https://youtu.be/video00001").await;
    create_song(&app, &minji, "two", "인디", "https://youtu.be/video00002").await;
    create_song(&app, &minji, "three", "POP", "https://youtu.be/video00003").await;

    send(&app, Method::POST, "/api/songs/1/like", Some(&minji), None).await;
    send(&app, Method::POST, "/api/songs/1/like", Some(&hanni), None).await;
    send(&app, Method::POST, "/api/songs/2/like", Some(&hanni), None).await;

    let recent = send(&app, Method::GET, "/api/songs", Some(&minji), None).await;
    assert_eq!(ids(&recent.body), vec![3, 2, 1]);
    assert_eq!(recent.body[2]["like_count"], 2);

    let popular = send(&app, Method::GET, "/api/songs?sort=popular", Some(&minji), None).await;
    assert_eq!(ids(&popular.body), vec![1, 2, 3]);

    let pop_only = send(
        &app,
        Method::GET,
        "/api/songs?genre=POP&sort=popular",
        Some(&minji),
        None,
    )
    .await;
    assert_eq!(ids(&pop_only.body), vec![1, 3]);

    let all = send(&app, Method::GET, "/api/songs?genre=all", Some(&minji), None).await;
    assert_eq!(ids(&all.body).len(), 3);

    let unauthenticated = send(&app, Method::GET, "/api/songs", None, None).await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_recommendations_cold_start_then_personalized() {
    let app = setup().await;
    let minji = login(&app, "minji").await;
    let hanni = login(&app, "hanni").await;

    create_song(&app, &minji, "pop one", "POP", "https://youtu.be/video00001").await;
    create_song(&app, &minji, "indie", "인디", "https://youtu.be/video00002").await;
    create_song(&app, &minji, "pop two", "POP", "https://youtu.be/video00003").await;
    send(&app, Method::POST, "/api/songs/2/like", Some(&minji), None).await;

    // hanni has no likes: popularity order, no score
    let cold = send(&app, Method::GET, "/api/recommendations", Some(&hanni), None).await;
    assert_eq!(cold.status, StatusCode::OK);
    assert_eq!(ids(&cold.body), vec![2, 3, 1]);
    assert!(cold.body[0].get("score").is_none());

    send(&app, Method::POST, "/api/songs/1/like", Some(&hanni), None).await;

    let warm = send(&app, Method::GET, "/api/recommendations", Some(&hanni), None).await;
    let recs = warm.body.as_array().unwrap();
    assert!(!ids(&warm.body).contains(&1));
    assert_eq!(recs.len(), 2);
    // fresh POP song with no likes: 3 + 0 + 2
    assert_eq!(recs[0]["id"], 3);
    assert_eq!(recs[0]["score"], 5);
    // fresh 인디 song with one like: 0 + 1 + 2
    assert_eq!(recs[1]["id"], 2);
    assert_eq!(recs[1]["score"], 3);
}

#[tokio::test]
async fn test_my_likes_newest_first() {
    let app = setup().await;
    let token = login(&app, "minji").await;
    create_song(&app, &token, "one", "POP", "https://youtu.be/video00001").await;
    create_song(&app, &token, "two", "POP", "https://youtu.be/video00002").await;

    let empty = send(&app, Method::GET, "/api/my-likes", Some(&token), None).await;
    assert_eq!(empty.body, json!([]));

    send(&app, Method::POST, "/api/songs/2/like", Some(&token), None).await;
    send(&app, Method::POST, "/api/songs/1/like", Some(&token), None).await;

    let liked = send(&app, Method::GET, "/api/my-likes", Some(&token), None).await;
    assert_eq!(ids(&liked.body), vec![1, 2]);
    assert_eq!(liked.body[0]["like_count"], 1);
    assert!(liked.body[0]["liked_at"].is_string());
}

#[tokio::test]
async fn test_genres() {
    let app = setup().await;
    let token = login(&app, "minji").await;

    let empty = send(&app, Method::GET, "/api/genres", None, None).await;
    assert_eq!(empty.body, json!([]));

    create_song(&app, &token, "a", "인디", "https://youtu.be/video00001").await;
    create_song(&app, &token, "b", "POP", "https://youtu.be/video00002").await;
    create_song(&app, &token, "c", "POP", "https://youtu.be/video00003").await;

    let genres = send(&app, Method::GET, "/api/genres", None, None).await;
    assert_eq!(genres.body, json!(["POP", "인디"]));

    let options = send(&app, Method::GET, "/api/genres/options", None, None).await;
    assert_eq!(options.body.as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn test_unknown_api_route() {
    let app = setup().await;
    let response = send(&app, Method::GET, "/api/nope", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["code"], "not_found");
}

#[tokio::test]
async fn test_graphql_flow() {
    let app = setup().await;

    let login = send(
        &app,
        Method::POST,
        "/graphql",
        None,
        Some(json!({
            "query": r#"mutation { login(nickname: "minji") { token user { id nickname } } }"#
        })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["data"]["login"]["user"]["nickname"], "minji");
    assert!(login.headers.contains_key(header::SET_COOKIE));
    let token = login.body["data"]["login"]["token"].as_str().unwrap().to_string();

    let created = send(
        &app,
        Method::POST,
        "/graphql",
        Some(&token),
        Some(json!({
            "query": r#"mutation {
                createSong(input: {
                    title: "Hype Boy",
                    artist: "NewJeans",
                    genre: "댄스",
                    youtubeUrl: "https://youtu.be/11cta61wi0g"
                }) { id youtubeUrl likeCount }
            }"#
        })),
    )
    .await;
    assert_eq!(created.body["data"]["createSong"]["id"], "1");
    assert_eq!(
        created.body["data"]["createSong"]["youtubeUrl"],
        "https://www.youtube.com/watch?v=11cta61wi0g"
    );

    let toggled = send(
        &app,
        Method::POST,
        "/graphql",
        Some(&token),
        Some(json!({ "query": r#"mutation { toggleLike(songId: "1") { liked likeCount } }"# })),
    )
    .await;
    assert_eq!(
        toggled.body["data"]["toggleLike"],
        json!({ "liked": true, "likeCount": 1 })
    );

    let listed = send(
        &app,
        Method::POST,
        "/graphql",
        Some(&token),
        Some(json!({ "query": "{ me { nickname } songs(sort: POPULAR) { title likeCount } myLikes { id } }" })),
    )
    .await;
    assert_eq!(listed.body["data"]["me"]["nickname"], "minji");
    assert_eq!(listed.body["data"]["songs"][0]["likeCount"], 1);
    assert_eq!(listed.body["data"]["myLikes"][0]["id"], "1");
}

#[tokio::test]
async fn test_graphql_errors_carry_codes() {
    let app = setup().await;

    let response = send(
        &app,
        Method::POST,
        "/graphql",
        None,
        Some(json!({ "query": "{ recommendations { id } }" })),
    )
    .await;
    assert_eq!(response.body["errors"][0]["extensions"]["code"], "auth_error");

    let me = send(
        &app,
        Method::POST,
        "/graphql",
        None,
        Some(json!({ "query": "{ me { id } }" })),
    )
    .await;
    assert_eq!(me.body["data"]["me"], Value::Null);
}

#[tokio::test]
async fn test_malformed_input_uses_error_shape() {
    let app = setup().await;

    let empty = send(&app, Method::POST, "/api/login", None, None).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["code"], "validation_error");
    assert!(empty.body["error"].is_string());

    let numeric_nickname = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "nickname": 5 })),
    )
    .await;
    assert_eq!(numeric_nickname.status, StatusCode::BAD_REQUEST);
    assert_eq!(numeric_nickname.body["code"], "validation_error");

    let token = login(&app, "minji").await;
    let numeric_title = send(
        &app,
        Method::POST,
        "/api/songs",
        Some(&token),
        Some(json!({
            "title": 123,
            "artist": "a",
            "genre": "POP",
            "youtubeUrl": "https://youtu.be/abcDE12345"
        })),
    )
    .await;
    assert_eq!(numeric_title.status, StatusCode::BAD_REQUEST);
    assert_eq!(numeric_title.body["code"], "validation_error");

    let bad_id = send(&app, Method::POST, "/api/songs/abc/like", Some(&token), None).await;
    assert_eq!(bad_id.status, StatusCode::NOT_FOUND);
    assert_eq!(bad_id.body["code"], "not_found");

    let bad_id_status = send(&app, Method::GET, "/api/songs/abc/like", Some(&token), None).await;
    assert_eq!(bad_id_status.status, StatusCode::OK);
    assert_eq!(bad_id_status.body, json!({ "liked": false }));
}
