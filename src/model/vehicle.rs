use std::fmt;

use super::normalize::format_vehicle_type;

/// Vehicle category offered in the vehicle-type menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleType {
    TwoWheeler,
    Car,
    AutoRickshaw,
    Truck,
    TaxiCab,
    Van,
    Bus,
    MiniBus,
    Tractor,
    ConstructionVehicle,
    Other,
}

static ALL_VEHICLE_TYPES: &[VehicleType] = &[
    VehicleType::TwoWheeler,
    VehicleType::Car,
    VehicleType::AutoRickshaw,
    VehicleType::Truck,
    VehicleType::TaxiCab,
    VehicleType::Van,
    VehicleType::Bus,
    VehicleType::MiniBus,
    VehicleType::Tractor,
    VehicleType::ConstructionVehicle,
    VehicleType::Other,
];

impl VehicleType {
    /// Returns the internal kebab-case token for this type.
    pub fn token(&self) -> &'static str {
        match self {
            VehicleType::TwoWheeler => "two-wheeler",
            VehicleType::Car => "car",
            VehicleType::AutoRickshaw => "auto-rickshaw",
            VehicleType::Truck => "truck",
            VehicleType::TaxiCab => "taxi/cab",
            VehicleType::Van => "van",
            VehicleType::Bus => "bus",
            VehicleType::MiniBus => "mini-bus",
            VehicleType::Tractor => "tractor",
            VehicleType::ConstructionVehicle => "construction-vehicle",
            VehicleType::Other => "other",
        }
    }

    /// Returns the label shown in the type menu.
    pub fn menu_label(&self) -> &'static str {
        match self {
            VehicleType::TwoWheeler => "Two Wheeler",
            VehicleType::Car => "Car",
            VehicleType::AutoRickshaw => "Auto Rickshaw",
            VehicleType::Truck => "Truck",
            VehicleType::TaxiCab => "Taxi / Cab",
            VehicleType::Van => "Van",
            VehicleType::Bus => "Bus",
            VehicleType::MiniBus => "Mini Bus",
            VehicleType::Tractor => "Tractor",
            VehicleType::ConstructionVehicle => "Construction Vehicle",
            VehicleType::Other => "Other",
        }
    }

    /// Returns the label sent to the intake endpoint.
    ///
    /// Derived from the token, so `taxi/cab` is sent as `Taxi/cab` even though
    /// the menu shows `Taxi / Cab`.
    pub fn submission_label(&self) -> String {
        format_vehicle_type(self.token())
    }

    /// Looks up a type by its token.
    pub fn from_token(token: &str) -> Option<Self> {
        ALL_VEHICLE_TYPES.iter().copied().find(|t| t.token() == token)
    }

    /// Returns all vehicle types in menu order.
    pub fn all() -> &'static [VehicleType] {
        ALL_VEHICLE_TYPES
    }
}

#[mutants::skip]
impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.menu_label())
    }
}
