#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use studytrack_api::config::{LogFormat, ServerConfig};
use studytrack_api::router::build_app_router;
use studytrack_api::state::AppState;
use studytrack_core::catalog::{
    Chapter, LongFormVideo, MockTest, MockTestMcq, SequenceStep, ShortFormContent, Student,
    Subject,
};
use studytrack_core::memory::{CatalogSeed, InMemoryStore};
use studytrack_core::service::ProgressService;

/// Student 1 is in class 10 (Physics: chapters 100..=102, Chemistry:
/// chapter 200). Student 2 is in class 99, which has no subjects.
pub const USER: i64 = 1;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        db_max_connections: 1,
        log_format: LogFormat::Pretty,
    }
}

pub fn test_catalog() -> CatalogSeed {
    CatalogSeed {
        students: vec![
            Student {
                user_id: USER,
                class_id: 10,
            },
            Student {
                user_id: 2,
                class_id: 99,
            },
        ],
        subjects: vec![
            Subject {
                id: 1,
                class_id: 10,
                name: "Physics".into(),
            },
            Subject {
                id: 2,
                class_id: 10,
                name: "Chemistry".into(),
            },
        ],
        chapters: vec![
            Chapter {
                id: 100,
                subject_id: 1,
                name: "Motion".into(),
            },
            Chapter {
                id: 101,
                subject_id: 1,
                name: "Forces".into(),
            },
            Chapter {
                id: 102,
                subject_id: 1,
                name: "Energy".into(),
            },
            Chapter {
                id: 200,
                subject_id: 2,
                name: "Atoms".into(),
            },
        ],
        videos: vec![
            LongFormVideo {
                id: 1000,
                chapter_id: 100,
                total_time_secs: 600.0,
            },
            LongFormVideo {
                id: 1001,
                chapter_id: 101,
                total_time_secs: 600.0,
            },
        ],
        short_forms: vec![ShortFormContent {
            id: 2000,
            chapter_id: 200,
            title: "Atoms in a minute".into(),
            thumbnail_url: Some("https://cdn.example/atoms.png".into()),
            sequence: vec![
                SequenceStep::Clip { duration_secs: 20.0 },
                SequenceStep::Mcq { mcq_id: 31 },
                SequenceStep::Clip { duration_secs: 40.0 },
                SequenceStep::Mcq { mcq_id: 32 },
            ],
        }],
        mock_tests: vec![MockTest {
            id: 500,
            subject_id: 1,
            title: "Mechanics".into(),
            mcqs: vec![
                MockTestMcq {
                    mcq_id: 41,
                    correct_option: "A".into(),
                },
                MockTestMcq {
                    mcq_id: 42,
                    correct_option: "B".into(),
                },
                MockTestMcq {
                    mcq_id: 43,
                    correct_option: "C".into(),
                },
                MockTestMcq {
                    mcq_id: 44,
                    correct_option: "D".into(),
                },
            ],
        }],
    }
}

/// Build the full application router, with the production middleware
/// stack, over an in-memory store seeded with [`test_catalog`].
pub fn build_test_app() -> Router {
    let config = test_config();
    let store = Arc::new(InMemoryStore::new(test_catalog()));
    let state = AppState {
        config: Arc::new(config.clone()),
        service: ProgressService::from_store(store),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
