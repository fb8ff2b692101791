use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORIGIN: &str = "http://localhost:3000";

fn app_for(server: &MockServer) -> Router {
    let gateway = Gateway::new(&server.uri(), "test-key", 5).expect("gateway");
    build_app(
        AppState { gateway },
        &CorsConfig {
            allowed_origins: vec![ORIGIN.to_owned()],
        },
    )
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json parse")
    };
    (status, json)
}

/// Answers the existence probe for `table`/`id`.
async fn mock_exists(server: &MockServer, table: &str, id: &str, found: bool) {
    let rows = if found { json!([{ "id": id }]) } else { json!([]) };
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/{table}")))
        .and(query_param("select", "id"))
        .and(query_param("id", format!("eq.{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

/// Fails the test if any request reaches the database.
async fn forbid_database(server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

fn brand_row(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Nike",
        "logo_url": null,
        "industry": "Sports",
        "market": "US",
        "tier": "premium",
        "aesthetic": ["sporty", "minimal"],
        "metadata": null,
        "created_at": "2024-03-01T12:00:00+00:00"
    })
}

fn signal_row(id: &str, brand_id: &str) -> Value {
    json!({
        "id": id,
        "brand_id": brand_id,
        "signal_type": "launch",
        "confidence": 0.8,
        "reason": "new running shoe",
        "detected_at": "2024-03-02T09:00:00+00:00",
        "created_at": "2024-03-02T09:00:05+00:00"
    })
}

fn content_row(id: &str, brand_id: &str) -> Value {
    json!({
        "id": id,
        "brand_id": brand_id,
        "platform": "instagram",
        "content_type": "post",
        "url": "https://instagram.com/p/abc",
        "caption": "Just do it",
        "hashtags": ["nike"],
        "mentions": null,
        "tagged_users": null,
        "created_at": "2024-03-01T08:00:00+00:00",
        "inserted_at": "2024-03-01T08:10:00+00:00"
    })
}

fn snapshot_row(id: &str, brand_id: &str) -> Value {
    json!({
        "id": id,
        "brand_id": brand_id,
        "page_url": "https://nike.com",
        "captured_at": "2024-03-05T00:00:00+00:00",
        "visual_identity": { "primary_color": "#111111" },
        "typography": {},
        "messaging": {},
        "navigation": {},
        "screenshots": {},
        "stats": {},
        "created_at": "2024-03-05T00:00:01+00:00"
    })
}

// -------------------------------------------------------------------------
// Envelope and status mapping
// -------------------------------------------------------------------------

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("not_found", StatusCode::NOT_FOUND),
        ("validation_error", StatusCode::UNPROCESSABLE_ENTITY),
        ("bad_request", StatusCode::BAD_REQUEST),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[test]
fn validation_error_carries_field_list() {
    let error = ApiError::validation(
        "req-1",
        ValidationError::single("signal_type", "field required"),
    );
    let json = serde_json::to_value(&error).expect("serialize");
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["fields"][0]["field"], "signal_type");
    assert_eq!(json["meta"]["request_id"], "req-1");
}

#[test]
fn single_record_meta_has_no_pagination() {
    let response = ApiResponse::new(json!({ "id": "b-1" }), "req-1".to_owned());
    let json = serde_json::to_value(&response).expect("serialize");
    assert!(json["meta"].get("pagination").is_none());
    assert!(json.pointer("/error").is_none());
}

// -------------------------------------------------------------------------
// Health and routing
// -------------------------------------------------------------------------

#[tokio::test]
async fn health_is_ok_without_touching_the_database() {
    let server = MockServer::start().await;
    forbid_database(&server).await;

    let (status, json) = send(app_for(&server), get_req("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["service"], "Brand Intelligence API");
    let timestamp = json["data"]["timestamp"].as_str().expect("timestamp");
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(!json["meta"]["request_id"].as_str().unwrap_or("").is_empty());
}

#[tokio::test]
async fn unknown_route_is_a_json_404() {
    let server = MockServer::start().await;
    let (status, json) = send(app_for(&server), get_req("/v2/brands")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin_only() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/v1/brands")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .expect("request")
    };

    let allowed = app
        .clone()
        .oneshot(preflight(ORIGIN))
        .await
        .expect("response");
    assert_eq!(
        allowed
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("allow-origin"),
        ORIGIN
    );
    assert_eq!(
        allowed
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .expect("allow-credentials"),
        "true"
    );

    let denied = app
        .oneshot(preflight("https://evil.example"))
        .await
        .expect("response");
    assert!(denied
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

// -------------------------------------------------------------------------
// Brands
// -------------------------------------------------------------------------

#[tokio::test]
async fn created_brand_is_found_by_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/brands"))
        .and(body_json(json!({ "name": "Nike", "industry": "Sports" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([brand_row("b-1")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/brands"))
        .and(query_param("name", "ilike.*Nike*"))
        .and(query_param("industry", "eq.Sports"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/1")
                .set_body_json(json!([brand_row("b-1")])),
        )
        .mount(&server)
        .await;
    let app = app_for(&server);

    let (status, created) = send(
        app.clone(),
        post_json(
            "/v1/brands",
            &json!({ "name": "Nike", "industry": "Sports" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["id"], "b-1");
    assert_eq!(created["data"]["name"], "Nike");

    let (status, listed) = send(app, get_req("/v1/brands?search=Nike&industry=Sports")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"][0]["id"], "b-1");
    assert_eq!(listed["meta"]["pagination"]["total"], 1);
    assert_eq!(listed["meta"]["pagination"]["limit"], 20);
    assert_eq!(listed["meta"]["pagination"]["offset"], 0);
}

#[tokio::test]
async fn page_size_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/brands"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server), get_req("/v1/brands?limit=500&offset=-3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
    assert_eq!(json["meta"]["pagination"]["limit"], 100);
}

#[tokio::test]
async fn offset_past_last_brand_returns_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/brands"))
        .and(query_param("offset", "1000"))
        .respond_with(
            ResponseTemplate::new(416)
                .insert_header("content-range", "*/3")
                .set_body_json(json!({
                    "code": "PGRST103",
                    "message": "Requested range not satisfiable"
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server), get_req("/v1/brands?offset=1000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
    assert_eq!(json["meta"]["pagination"]["total"], 3);
    assert_eq!(json["meta"]["pagination"]["offset"], 1000);
}

#[tokio::test]
async fn unknown_filter_is_rejected_before_querying() {
    let server = MockServer::start().await;
    forbid_database(&server).await;

    let (status, json) = send(app_for(&server), get_req("/v1/brands?colour=red")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["fields"][0]["field"], "colour");
}

#[tokio::test]
async fn missing_brand_is_404_with_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/brands"))
        .and(query_param("id", "eq.does-not-exist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let request = Request::builder()
        .uri("/v1/brands/does-not-exist")
        .header(REQUEST_ID_HEADER, "req-42")
        .body(Body::empty())
        .expect("request");
    let response = app_for(&server).oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).expect("header"),
        "req-42"
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["error"]["code"], "not_found");
    assert_eq!(json["meta"]["request_id"], "req-42");
}

#[tokio::test]
async fn brand_detail_nests_requested_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/brands"))
        .and(query_param("select", "*"))
        .and(query_param("id", "eq.b-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([brand_row("b-1")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/content"))
        .and(query_param("brand_id", "eq.b-1"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([content_row("c-1", "b-1")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/signals"))
        .and(query_param("brand_id", "eq.b-1"))
        .and(query_param("order", "detected_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([signal_row("s-1", "b-1")])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server),
        get_req("/v1/brands/b-1?include=content,signals"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "Nike");
    assert_eq!(json["data"]["content"][0]["id"], "c-1");
    assert_eq!(json["data"]["signals"][0]["id"], "s-1");
}

#[tokio::test]
async fn brand_detail_without_include_has_no_nested_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/brands"))
        .and(query_param("id", "eq.b-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([brand_row("b-1")])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server), get_req("/v1/brands/b-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"].get("content").is_none());
    assert!(json["data"].get("signals").is_none());
}

#[tokio::test]
async fn unknown_include_is_rejected() {
    let server = MockServer::start().await;
    forbid_database(&server).await;

    let (status, json) = send(app_for(&server), get_req("/v1/brands/b-1?include=metrics")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["fields"][0]["field"], "include");
}

#[tokio::test]
async fn database_failure_is_opaque_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/brands"))
        .respond_with(
            ResponseTemplate::new(503).set_body_string("connection to 10.0.0.7 refused, key=abc"),
        )
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server), get_req("/v1/brands")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["message"], "database request failed");
    assert!(!json.to_string().contains("10.0.0.7"));
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let server = MockServer::start().await;
    forbid_database(&server).await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/brands")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .expect("request");
    let (status, json) = send(app_for(&server), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
}

// -------------------------------------------------------------------------
// Signals
// -------------------------------------------------------------------------

#[tokio::test]
async fn signal_without_type_is_422_naming_the_field() {
    let server = MockServer::start().await;
    forbid_database(&server).await;

    let (status, json) = send(
        app_for(&server),
        post_json(
            "/v1/signals",
            &json!({
                "brand_id": "b-1",
                "confidence": 0.4,
                "detected_at": "2024-03-02T09:00:00Z"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = json["error"]["fields"].as_array().expect("fields");
    assert!(fields.iter().any(|f| f["field"] == "signal_type"));
}

#[tokio::test]
async fn signal_is_created_with_content_links() {
    let server = MockServer::start().await;
    mock_exists(&server, "brands", "b-1", true).await;
    mock_exists(&server, "content", "c-1", true).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/signals"))
        .and(body_partial_json(
            json!({ "brand_id": "b-1", "signal_type": "launch" }),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([signal_row("s-1", "b-1")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/signal_content"))
        .and(body_json(json!([{ "signal_id": "s-1", "content_id": "c-1" }])))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([{ "signal_id": "s-1", "content_id": "c-1" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server),
        post_json(
            "/v1/signals",
            &json!({
                "brand_id": "b-1",
                "signal_type": "launch",
                "confidence": 0.8,
                "detected_at": "2024-03-02T09:00:00Z",
                "content_ids": ["c-1", "c-1"]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["id"], "s-1");
    assert_eq!(json["data"]["content_ids"], json!(["c-1"]));
}

#[tokio::test]
async fn signal_for_unknown_content_is_404_and_not_inserted() {
    let server = MockServer::start().await;
    mock_exists(&server, "brands", "b-1", true).await;
    mock_exists(&server, "content", "c-404", false).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server),
        post_json(
            "/v1/signals",
            &json!({
                "brand_id": "b-1",
                "signal_type": "launch",
                "confidence": 0.8,
                "detected_at": "2024-03-02T09:00:00Z",
                "content_ids": ["c-404"]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["message"], "content 'c-404' not found");
}

#[tokio::test]
async fn brand_signals_require_the_brand() {
    let server = MockServer::start().await;
    mock_exists(&server, "brands", "b-missing", false).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/signals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (status, _) = send(app_for(&server), get_req("/v1/brands/b-missing/signals")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signal_list_filters_by_type_and_since() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/signals"))
        .and(query_param("signal_type", "eq.launch"))
        .and(query_param("detected_at", "gte.2024-03-01T00:00:00Z"))
        .and(query_param("limit", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/1")
                .set_body_json(json!([signal_row("s-1", "b-1")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server),
        get_req("/v1/signals?signal_type=launch&since=2024-03-01&limit=5"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["data"][0]["signal_type"], "launch");
}

// -------------------------------------------------------------------------
// Content, media, metrics
// -------------------------------------------------------------------------

#[tokio::test]
async fn content_is_created_with_media() {
    let server = MockServer::start().await;
    mock_exists(&server, "brands", "b-1", true).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/content"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([content_row("c-9", "b-1")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/content_media"))
        .and(body_json(json!([
            { "content_id": "c-9", "image_url": "https://cdn.example.com/p.jpg", "width": 1080 }
        ])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "m-1",
            "content_id": "c-9",
            "image_url": "https://cdn.example.com/p.jpg",
            "video_url": null,
            "width": 1080,
            "height": null,
            "duration_sec": null
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server),
        post_json(
            "/v1/content",
            &json!({
                "brand_id": "b-1",
                "platform": "instagram",
                "url": "https://instagram.com/p/abc",
                "created_at": "2024-03-01T08:00:00Z",
                "media": [{ "image_url": "https://cdn.example.com/p.jpg", "width": 1080 }]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["id"], "c-9");
    assert_eq!(json["data"]["media"][0]["id"], "m-1");
}

#[tokio::test]
async fn content_with_unknown_platform_is_422() {
    let server = MockServer::start().await;
    forbid_database(&server).await;

    let (status, json) = send(
        app_for(&server),
        post_json(
            "/v1/content",
            &json!({
                "brand_id": "b-1",
                "platform": "myspace",
                "url": "https://myspace.com/x",
                "created_at": "2024-03-01T08:00:00Z"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["fields"][0]["field"], "platform");
}

#[tokio::test]
async fn brand_content_rejects_unknown_platform_filter() {
    let server = MockServer::start().await;
    forbid_database(&server).await;

    let (status, _) = send(
        app_for(&server),
        get_req("/v1/brands/b-1/content?platform=myspace"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn metric_is_recorded_for_existing_content() {
    let server = MockServer::start().await;
    mock_exists(&server, "content", "c-1", true).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/content_metrics"))
        .and(body_json(
            json!({ "content_id": "c-1", "likes": 10, "comments": 2 }),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "mt-1",
            "content_id": "c-1",
            "likes": 10,
            "comments": 2,
            "views": null,
            "collected_at": "2024-03-03T00:00:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server),
        post_json("/v1/content/c-1/metrics", &json!({ "likes": 10, "comments": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["likes"], 10);
    assert_eq!(json["data"]["content_id"], "c-1");
}

#[tokio::test]
async fn metric_for_missing_content_is_404() {
    let server = MockServer::start().await;
    mock_exists(&server, "content", "c-404", false).await;

    let (status, json) = send(
        app_for(&server),
        post_json("/v1/content/c-404/metrics", &json!({ "likes": 1, "comments": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn content_media_lists_oldest_first() {
    let server = MockServer::start().await;
    mock_exists(&server, "content", "c-1", true).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/content_media"))
        .and(query_param("content_id", "eq.c-1"))
        .and(query_param("order", "id.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server), get_req("/v1/content/c-1/media")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
}

// -------------------------------------------------------------------------
// Website snapshots
// -------------------------------------------------------------------------

#[tokio::test]
async fn snapshot_with_non_object_section_is_422() {
    let server = MockServer::start().await;
    forbid_database(&server).await;

    let (status, json) = send(
        app_for(&server),
        post_json(
            "/v1/website-snapshots",
            &json!({
                "brand_id": "b-1",
                "page_url": "https://nike.com",
                "captured_at": "2024-03-05T00:00:00Z",
                "visual_identity": "red"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["fields"][0]["field"], "visual_identity");
}

#[tokio::test]
async fn snapshot_is_created_for_existing_brand() {
    let server = MockServer::start().await;
    mock_exists(&server, "brands", "b-1", true).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/website_snapshots"))
        .and(body_partial_json(json!({ "brand_id": "b-1", "typography": {} })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([snapshot_row("w-1", "b-1")])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server),
        post_json(
            "/v1/website-snapshots",
            &json!({
                "brand_id": "b-1",
                "page_url": "https://nike.com",
                "captured_at": "2024-03-05T00:00:00Z",
                "visual_identity": { "primary_color": "#111111" }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["id"], "w-1");
}

#[tokio::test]
async fn latest_snapshot_is_newest_row() {
    let server = MockServer::start().await;
    mock_exists(&server, "brands", "b-1", true).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/website_snapshots"))
        .and(query_param("brand_id", "eq.b-1"))
        .and(query_param("order", "captured_at.desc"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([snapshot_row("w-2", "b-1")])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server), get_req("/v1/brands/b-1/snapshots/latest")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], "w-2");
    assert_eq!(json["data"]["visual_identity"]["primary_color"], "#111111");
}

#[tokio::test]
async fn latest_snapshot_is_404_when_brand_has_none() {
    let server = MockServer::start().await;
    mock_exists(&server, "brands", "b-1", true).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/website_snapshots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (status, json) = send(app_for(&server), get_req("/v1/brands/b-1/snapshots/latest")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}
