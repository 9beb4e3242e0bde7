//! Fuel purchase model (`FillUp` table).

use chrono::NaiveDate;
use serde::Serialize;

/// A fuel purchase for one vehicle at one station.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct FuelPurchase {
    #[sqlx(rename = "PurchaseID")]
    pub id: i32,
    #[sqlx(rename = "CarID")]
    pub vehicle_id: i32,
    #[sqlx(rename = "StationID")]
    pub station_id: i32,
    #[sqlx(rename = "PurchaseDate")]
    pub purchase_date: NaiveDate,
    #[sqlx(rename = "GallonsPurchased")]
    pub gallons_purchased: f64,
    /// Full tank (`true`) versus a partial top-off.
    #[sqlx(rename = "IsFillUp")]
    pub is_fill_up: bool,
    #[sqlx(rename = "TripMileage")]
    pub trip_mileage: f64,
    #[sqlx(rename = "OdometerReading")]
    pub odometer_reading: f64,
    #[sqlx(rename = "Cost")]
    pub cost: f64,
    #[sqlx(rename = "Units")]
    pub units: String,
}

impl FuelPurchase {
    /// Fuel economy for this tank. Only meaningful for a full fill-up.
    pub fn miles_per_gallon(&self) -> Option<f64> {
        if self.is_fill_up && self.gallons_purchased > 0.0 {
            Some(self.trip_mileage / self.gallons_purchased)
        } else {
            None
        }
    }
}
