use std::sync::Arc;

use axum::{
	body::{self, Body},
	http::{Request, StatusCode, header},
};
use serde_json::{Map, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use thoughtline_api::{routes, state::AppState};
use thoughtline_config::{
	Config, EmbeddingProviderConfig, GenerationProviderConfig, Postgres, Providers, Retrieval,
	Service, Storage,
};
use thoughtline_service::JournalService;
use thoughtline_storage::db::Db;
use thoughtline_testkit::TestDatabase;

const TEST_DIM: u32 = 8;

fn test_config(dsn: String) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn, pool_max_conns: 1 } },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "stub".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "stub-embedding".to_string(),
				dimensions: TEST_DIM,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			generation: GenerationProviderConfig {
				provider_id: "stub".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "stub-generation".to_string(),
				temperature: 0.2,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		retrieval: Retrieval::default(),
	}
}

async fn test_router(test_db: &TestDatabase) -> axum::Router {
	let config = test_config(test_db.dsn().to_string());
	let db = Db::connect(&config.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(TEST_DIM).await.expect("Failed to ensure schema.");

	let state = AppState { service: Arc::new(JournalService::new(config, db)) };

	routes::router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Response body must be JSON.")
}

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
	Request::builder()
		.method(method)
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

fn get_request(uri: &str) -> Request<Body> {
	Request::builder().method("GET").uri(uri).body(Body::empty()).expect("Failed to build request.")
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set THOUGHTLINE_PG_DSN to run."]
async fn health_returns_ok() {
	let Some(base_dsn) = thoughtline_testkit::env_dsn() else {
		eprintln!("Skipping health_returns_ok; set THOUGHTLINE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let response = app.oneshot(get_request("/health")).await.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set THOUGHTLINE_PG_DSN to run."]
async fn unknown_book_returns_404_with_error_body() {
	let Some(base_dsn) = thoughtline_testkit::env_dsn() else {
		eprintln!("Skipping unknown_book_returns_404_with_error_body; set THOUGHTLINE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let uri = format!("/books/{}", Uuid::new_v4());
	let response = app.oneshot(get_request(&uri)).await.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::NOT_FOUND);

	let json = body_json(response).await;

	assert!(json.get("error").and_then(Value::as_str).is_some());

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set THOUGHTLINE_PG_DSN to run."]
async fn blank_chat_question_returns_400() {
	let Some(base_dsn) = thoughtline_testkit::env_dsn() else {
		eprintln!("Skipping blank_chat_question_returns_400; set THOUGHTLINE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let response = app
		.oneshot(json_request("POST", "/chat", serde_json::json!({ "q": "   " })))
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = body_json(response).await;

	assert!(json.get("error").and_then(Value::as_str).is_some());

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set THOUGHTLINE_PG_DSN to run."]
async fn blank_search_query_returns_an_empty_list() {
	let Some(base_dsn) = thoughtline_testkit::env_dsn() else {
		eprintln!("Skipping blank_search_query_returns_an_empty_list; set THOUGHTLINE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;

	for uri in ["/thoughts/search?q=", "/search?q=%20%20", "/thoughts/search"] {
		let response =
			app.clone().oneshot(get_request(uri)).await.expect("Request failed.");

		assert_eq!(response.status(), StatusCode::OK);

		let json = body_json(response).await;

		assert_eq!(json, serde_json::json!([]));
	}

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set THOUGHTLINE_PG_DSN to run."]
async fn created_books_show_up_in_the_listing() {
	let Some(base_dsn) = thoughtline_testkit::env_dsn() else {
		eprintln!("Skipping created_books_show_up_in_the_listing; set THOUGHTLINE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let response = app
		.clone()
		.oneshot(json_request("POST", "/books", serde_json::json!({ "name": "Dune" })))
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::CREATED);

	let created = body_json(response).await;
	let book_id = created.get("book_id").and_then(Value::as_str).expect("Row must carry book_id.");
	let response = app.oneshot(get_request("/books")).await.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);

	let listing = body_json(response).await;
	let books = listing.as_array().expect("Listing must be an array.");

	assert!(
		books
			.iter()
			.any(|book| book.get("book_id").and_then(Value::as_str) == Some(book_id))
	);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set THOUGHTLINE_PG_DSN to run."]
async fn blank_book_name_returns_400() {
	let Some(base_dsn) = thoughtline_testkit::env_dsn() else {
		eprintln!("Skipping blank_book_name_returns_400; set THOUGHTLINE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let response = app
		.oneshot(json_request("POST", "/books", serde_json::json!({ "name": "" })))
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}
