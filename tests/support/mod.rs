//! In-process course catalog server backing the integration tests.
//!
//! The fixture speaks raw JSON so the wire format is pinned here rather
//! than inherited from the crate's own serde types. Tests inspect the
//! shared state to assert what the client actually sent.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};

use coursedesk::api::ApiClient;
use coursedesk::config::Config;

pub type SharedState = Arc<Mutex<CatalogState>>;

/// Catalog records plus the counters and switches tests assert against
#[derive(Default)]
pub struct CatalogState {
    pub courses: Vec<Value>,
    pub instances: Vec<Value>,
    next_id: i64,

    /// GET requests served per collection
    pub course_fetches: usize,
    pub instance_fetches: usize,
    /// Raw POST bodies exactly as they arrived
    pub course_posts: Vec<Value>,
    pub instance_posts: Vec<Value>,
    /// When set, every DELETE answers 500
    pub fail_deletes: bool,
}

impl CatalogState {
    pub fn seed_course(&mut self, name: &str, code: &str, description: &str) -> i64 {
        let id = self.allocate_id();
        self.courses.push(json!({
            "id": id,
            "course_name": name,
            "course_code": code,
            "course_description": description,
        }));
        id
    }

    /// Instance whose course field is a bare id, the usual list shape
    pub fn seed_instance(&mut self, course_id: i64, year: i32, semester: i32) -> i64 {
        let id = self.allocate_id();
        self.instances.push(json!({
            "id": id,
            "course": course_id,
            "year": year,
            "semester": semester,
        }));
        id
    }

    /// Instance carrying the full course object inline
    pub fn seed_embedded_instance(&mut self, course_id: i64, year: i32, semester: i32) -> i64 {
        let course = self
            .courses
            .iter()
            .find(|course| course["id"].as_i64() == Some(course_id))
            .cloned()
            .unwrap();
        let id = self.allocate_id();
        self.instances.push(json!({
            "id": id,
            "course": course,
            "year": year,
            "semester": semester,
        }));
        id
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Spawn the fixture server on an ephemeral port. Returns the API base URL
/// and a handle to the catalog behind it.
pub async fn spawn_catalog() -> (String, SharedState) {
    let state: SharedState = Arc::new(Mutex::new(CatalogState::default()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), state)
}

/// Build an [`ApiClient`] pointed at the fixture server
pub fn client_for(base_url: &str) -> ApiClient {
    let config = Config::from_env().unwrap().with_api_url(base_url);
    ApiClient::new(&config).unwrap()
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/courses/", get(list_courses).post(create_course))
        .route("/api/courses/{id}/", delete(delete_course))
        .route("/api/instances/", get(list_instances).post(create_instance))
        .route("/api/instances/{id}/", delete(delete_instance))
        .with_state(state)
}

async fn list_courses(State(state): State<SharedState>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.course_fetches += 1;
    Json(Value::Array(state.courses.clone()))
}

async fn list_instances(State(state): State<SharedState>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.instance_fetches += 1;
    Json(Value::Array(state.instances.clone()))
}

async fn create_course(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.course_posts.push(body.clone());

    let code = body["course_code"].as_str().unwrap_or_default().to_string();
    let duplicate = state
        .courses
        .iter()
        .any(|course| course["course_code"].as_str() == Some(code.as_str()));
    if duplicate {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": format!("Course with code {} already exists!", code) })),
        );
    }

    let id = state.allocate_id();
    let mut course = body;
    course["id"] = json!(id);
    state.courses.push(course);

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Course added successfully!" })),
    )
}

async fn create_instance(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.instance_posts.push(body.clone());

    let duplicate = state.instances.iter().any(|instance| {
        course_id_of(instance) == course_id_of(&body)
            && instance["year"] == body["year"]
            && instance["semester"] == body["semester"]
    });
    if duplicate {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "The course instance already exists!" })),
        );
    }

    let id = state.allocate_id();
    let mut instance = body;
    instance["id"] = json!(id);
    state.instances.push(instance);

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Course instance added successfully!" })),
    )
}

async fn delete_course(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();

    if state.fail_deletes {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Delete failed" })),
        );
    }

    let before = state.courses.len();
    state.courses.retain(|course| course["id"].as_i64() != Some(id));
    if state.courses.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" })));
    }

    (
        StatusCode::OK,
        Json(json!({ "message": "Course deleted successfully!" })),
    )
}

async fn delete_instance(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();

    if state.fail_deletes {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Delete failed" })),
        );
    }

    let before = state.instances.len();
    state
        .instances
        .retain(|instance| instance["id"].as_i64() != Some(id));
    if state.instances.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" })));
    }

    (
        StatusCode::OK,
        Json(json!({ "message": "Course instance deleted successfully!" })),
    )
}

/// Course id of an instance record, whether bare or embedded
fn course_id_of(instance: &Value) -> Option<i64> {
    let course = &instance["course"];
    course.as_i64().or_else(|| course["id"].as_i64())
}
