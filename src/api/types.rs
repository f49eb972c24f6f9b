//! Wire payloads for the course catalog API

use serde::{Deserialize, Serialize};

/// Body of `POST /courses/`.
///
/// Field values are trimmed before they reach this type, and the id is
/// assigned server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCourse {
    /// Human-readable course title
    pub course_name: String,
    /// Unique course code, the server's duplicate key
    pub course_code: String,
    /// Free-form description
    pub course_description: String,
}

/// Body of `POST /instances/`.
///
/// Year and semester are numeric on the wire. The server compares them as
/// integers when checking for duplicates, so the client never sends strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInstance {
    /// Id of the course being offered
    pub course: i64,
    /// Calendar year of the offering
    pub year: i32,
    /// Semester number within the year
    pub semester: i32,
}

/// Optional human-readable message attached to create responses.
///
/// The server includes one on both 201 and 400 bodies, but nothing is
/// guaranteed, so every field is tolerated absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Course catalog API route fragments
pub struct CatalogApi;

impl CatalogApi {
    /// Collection of courses
    pub const COURSES: &'static str = "courses";
    /// Collection of course instances
    pub const INSTANCES: &'static str = "instances";
}
