//! Repair model (`Repair` table).

use chrono::NaiveDate;
use serde::Serialize;

/// A repair or service visit.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Repair {
    #[sqlx(rename = "TransactionID")]
    pub id: i32,
    #[sqlx(rename = "CarID")]
    pub vehicle_id: i32,
    #[sqlx(rename = "StationID")]
    pub station_id: i32,
    #[sqlx(rename = "PurchaseDate")]
    pub purchase_date: NaiveDate,
    #[sqlx(rename = "OdometerReading")]
    pub odometer_reading: f64,
    #[sqlx(rename = "Cost")]
    pub cost: f64,
    #[sqlx(rename = "Description")]
    pub description: String,
    #[sqlx(rename = "Units")]
    pub units: String,
}
