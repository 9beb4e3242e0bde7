//! Service station model (`ServiceStation` table).

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ServiceStation {
    #[sqlx(rename = "StationID")]
    pub id: i32,
    #[sqlx(rename = "Name")]
    pub name: String,
    #[sqlx(rename = "Address")]
    pub address: String,
}
