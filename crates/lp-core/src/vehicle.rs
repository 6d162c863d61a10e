//! Vehicle category enum shared across the routing crates.
//!
//! Lane connections inside a junction may be restricted to a subset of
//! categories (a bus-only turn, a tram track).  An empty allow-list on a
//! connection means every category may use it.

/// The kind of vehicle a route is requested for.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VehicleCategory {
    /// Private car (default).
    #[default]
    Car,
    /// Bus.
    Bus,
    /// Tram on rails embedded in the road.
    Tram,
    /// Heavy goods vehicle.
    Truck,
    /// Emergency services.
    Emergency,
}

impl VehicleCategory {
    /// `true` for scheduled public-transport categories.
    #[inline]
    pub fn is_public_transport(self) -> bool {
        matches!(self, VehicleCategory::Bus | VehicleCategory::Tram)
    }

    /// Human-readable label, useful for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleCategory::Car       => "car",
            VehicleCategory::Bus       => "bus",
            VehicleCategory::Tram      => "tram",
            VehicleCategory::Truck     => "truck",
            VehicleCategory::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
