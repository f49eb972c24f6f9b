use serde::{Deserialize, Serialize};

/// A catalog course: human-readable name, unique code, free-form description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub course_name: String,
    pub course_code: String,
    #[serde(default)]
    pub course_description: String,
}

/// One offering of a course in a particular year and semester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseInstance {
    pub id: i64,
    pub course: CourseRef,
    pub year: i32,
    pub semester: i32,
}

/// The `course` field of an instance as the API returns it.
///
/// List responses carry a bare course id while detail responses may embed
/// the full course object. Deserialization branches on the shape instead of
/// assuming either one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseRef {
    Id(i64),
    Embedded(Course),
}

impl CourseRef {
    /// The referenced course id, whichever shape the API used
    pub fn id(&self) -> i64 {
        match self {
            CourseRef::Id(id) => *id,
            CourseRef::Embedded(course) => course.id,
        }
    }

    /// Resolve against a locally cached course list.
    ///
    /// Embedded objects resolve to themselves. Bare ids are looked up in the
    /// cache and miss when the cache is stale or empty.
    pub fn resolve<'a>(&'a self, courses: &'a [Course]) -> Option<&'a Course> {
        match self {
            CourseRef::Embedded(course) => Some(course),
            CourseRef::Id(id) => courses.iter().find(|c| c.id == *id),
        }
    }
}

/// Client-side filter over a fetched instance list.
///
/// `None` in a dimension means that dimension does not constrain the result.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InstanceFilter {
    pub year: Option<i32>,
    pub semester: Option<i32>,
}

impl InstanceFilter {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.semester.is_none()
    }

    /// An instance is kept iff every set dimension matches exactly
    pub fn matches(&self, instance: &CourseInstance) -> bool {
        self.year.map_or(true, |y| instance.year == y)
            && self.semester.map_or(true, |s| instance.semester == s)
    }

    /// Project the full list into the displayed subset, preserving order
    pub fn apply(&self, instances: &[CourseInstance]) -> Vec<CourseInstance> {
        instances
            .iter()
            .filter(|instance| self.matches(instance))
            .cloned()
            .collect()
    }
}

/// Distinct years across the full instance list, ascending, each exactly once
pub fn distinct_years(instances: &[CourseInstance]) -> Vec<i32> {
    let mut years: Vec<i32> = instances.iter().map(|i| i.year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Distinct semesters across the full instance list, ascending, each exactly once
pub fn distinct_semesters(instances: &[CourseInstance]) -> Vec<i32> {
    let mut semesters: Vec<i32> = instances.iter().map(|i| i.semester).collect();
    semesters.sort_unstable();
    semesters.dedup();
    semesters
}
