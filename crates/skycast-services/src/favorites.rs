use serde::{Deserialize, Serialize};

/// A saved location the user can reopen the forecast screen with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: String,
}
