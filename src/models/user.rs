use serde::Serialize;

/// A course participant known to the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalUser {
    pub id: i64,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

impl LocalUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}
