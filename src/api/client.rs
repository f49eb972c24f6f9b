//! HTTP client for the course catalog REST API

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::types::{ApiMessage, CatalogApi, NewCourse, NewInstance};
use crate::config::Config;
use crate::models::{Course, CourseInstance};

/// Thin wrapper over `reqwest` bound to one API base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client using the configured timeout and user agent
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Fetch every course in the catalog
    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.list(CatalogApi::COURSES).await
    }

    /// Fetch every course instance, unfiltered
    pub async fn list_instances(&self) -> Result<Vec<CourseInstance>, ApiError> {
        self.list(CatalogApi::INSTANCES).await
    }

    /// Create a course. HTTP 400 maps to [`ApiError::Conflict`].
    pub async fn create_course(&self, new_course: &NewCourse) -> Result<ApiMessage, ApiError> {
        self.create(CatalogApi::COURSES, new_course).await
    }

    /// Create a course instance. HTTP 400 maps to [`ApiError::Conflict`].
    pub async fn create_instance(&self, new_instance: &NewInstance) -> Result<ApiMessage, ApiError> {
        self.create(CatalogApi::INSTANCES, new_instance).await
    }

    /// Delete a course by id
    pub async fn delete_course(&self, id: i64) -> Result<(), ApiError> {
        self.delete(CatalogApi::COURSES, id).await
    }

    /// Delete a course instance by id
    pub async fn delete_instance(&self, id: i64) -> Result<(), ApiError> {
        self.delete(CatalogApi::INSTANCES, id).await
    }

    async fn list<T>(&self, collection: &str) -> Result<Vec<T>, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.collection_url(collection);
        debug!("Fetching {} from: {}", collection, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn create<T>(&self, collection: &str, payload: &T) -> Result<ApiMessage, ApiError>
    where
        T: serde::Serialize,
    {
        let url = self.collection_url(collection);
        debug!("Posting new record to: {}", url);

        let response = self.client.post(&url).json(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        classify_create(status, &body)
    }

    async fn delete(&self, collection: &str, id: i64) -> Result<(), ApiError> {
        let url = self.record_url(collection, id);
        debug!("Deleting record at: {}", url);

        let response = self.client.delete(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            return Err(status_error(status, body));
        }

        Ok(())
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}/", self.base_url, collection)
    }

    fn record_url(&self, collection: &str, id: i64) -> String {
        format!("{}/{}/{}/", self.base_url, collection, id)
    }
}

/// Map a create response onto the error taxonomy.
///
/// 201 is the only success and carries an optional message. 400 is the
/// server's duplicate-record signal. Anything else becomes a status error.
fn classify_create(status: StatusCode, body: &str) -> Result<ApiMessage, ApiError> {
    match status {
        StatusCode::CREATED => Ok(parse_message(body)),
        StatusCode::BAD_REQUEST => Err(ApiError::Conflict(parse_message(body).message)),
        _ => Err(status_error(status, body.to_string())),
    }
}

/// Best-effort parse of the optional `{"message": ...}` body
fn parse_message(body: &str) -> ApiMessage {
    serde_json::from_str(body).unwrap_or_default()
}

fn status_error(status: StatusCode, body: String) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        message: body,
    }
}
