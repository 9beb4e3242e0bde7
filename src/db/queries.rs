//! SQL texts shared by every backend.
//!
//! MySQL and SQLite both take `?` placeholders. Columns are always named
//! and match the `#[sqlx(rename)]` attributes on the models.

pub const PING: &str = "SELECT 1";

pub const SELECT_VEHICLE: &str = "SELECT CarID, LicensePlate, Make, Model, ModelYear, \
     OdometerReading, Units, DatePurchased, MileageWhenPurchased, CurrentlyActive, \
     MileageWhenSold, DateSold, Nickname FROM Car WHERE CarID = ?";

pub const SELECT_VEHICLES: &str = "SELECT CarID, LicensePlate, Make, Model, ModelYear, \
     OdometerReading, Units, DatePurchased, MileageWhenPurchased, CurrentlyActive, \
     MileageWhenSold, DateSold, Nickname FROM Car";

pub const SELECT_LICENSE_PLATES: &str = "SELECT LicensePlate FROM Car";

pub const SELECT_FILL_UPS: &str = "SELECT PurchaseID, CarID, StationID, PurchaseDate, \
     GallonsPurchased, IsFillUp, TripMileage, OdometerReading, Cost, Units \
     FROM FillUp WHERE CarID = ? ORDER BY PurchaseDate, PurchaseID";

pub const SELECT_REPAIRS: &str = "SELECT TransactionID, CarID, StationID, PurchaseDate, \
     OdometerReading, Cost, Description, Units \
     FROM Repair WHERE CarID = ? ORDER BY PurchaseDate, TransactionID";

pub const SELECT_STATIONS: &str = "SELECT StationID, Name, Address FROM ServiceStation";

pub const SELECT_STATION: &str =
    "SELECT StationID, Name, Address FROM ServiceStation WHERE StationID = ?";
