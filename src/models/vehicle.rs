// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle model (`Car` table).

use chrono::NaiveDate;
use serde::Serialize;

/// A car, as stored in the `Car` table.
///
/// The sale fields and the nickname are nullable columns. They decode to
/// `None` for SQL NULL and to `Some(..)` for any stored value, including
/// `0.0` and the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Vehicle {
    #[sqlx(rename = "CarID")]
    pub id: i32,
    #[sqlx(rename = "LicensePlate")]
    pub license_plate: String,
    #[sqlx(rename = "Make")]
    pub make: String,
    #[sqlx(rename = "Model")]
    pub model: String,
    #[sqlx(rename = "ModelYear")]
    pub model_year: i32,
    #[sqlx(rename = "OdometerReading")]
    pub odometer_reading: f64,
    #[sqlx(rename = "Units")]
    pub units: String,
    #[sqlx(rename = "DatePurchased")]
    pub date_purchased: NaiveDate,
    #[sqlx(rename = "MileageWhenPurchased")]
    pub mileage_when_purchased: f64,
    #[sqlx(rename = "CurrentlyActive")]
    pub currently_active: bool,
    #[sqlx(rename = "MileageWhenSold")]
    pub mileage_when_sold: Option<f64>,
    #[sqlx(rename = "DateSold")]
    pub date_sold: Option<NaiveDate>,
    #[sqlx(rename = "Nickname")]
    pub nickname: Option<String>,
}

impl Vehicle {
    /// True once a sale has been recorded.
    pub fn is_sold(&self) -> bool {
        self.date_sold.is_some() || self.mileage_when_sold.is_some()
    }

    /// Miles driven while owned, if the car has been sold.
    pub fn miles_owned(&self) -> Option<f64> {
        self.mileage_when_sold
            .map(|sold| sold - self.mileage_when_purchased)
    }
}
