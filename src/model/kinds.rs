//! The closed enumerations that category-specific entry fields are validated against.
//!
//! Each variant serializes as the label shown in the entry form, which is also the value the
//! backend stores. `FromStr` and `Display` come from the serde representation so that the three
//! never disagree.

use serde::{Deserialize, Serialize};

/// Implemented by the closed enumerations so that validation can list the allowed values.
pub trait Choice: Sized + Copy + 'static {
    /// Every allowed value, in form order.
    const ALL: &'static [Self];

    /// The label a form shows and the backend stores.
    fn label(&self) -> String;

    /// The allowed labels joined for an error message.
    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

macro_rules! choice {
    ($t:ty) => {
        serde_plain::derive_display_from_serialize!($t);
        serde_plain::derive_fromstr_from_deserialize!($t);

        impl Choice for $t {
            const ALL: &'static [Self] = <$t>::VALUES;

            fn label(&self) -> String {
                self.to_string()
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum DiaperSize {
    Preemie,
    Newborn,
    #[serde(rename = "Size 1")]
    Size1,
    #[serde(rename = "Size 2")]
    Size2,
    #[serde(rename = "Size 3")]
    Size3,
    #[serde(rename = "Size 4")]
    Size4,
    #[serde(rename = "Size 5")]
    Size5,
    #[serde(rename = "Size 6")]
    Size6,
    #[serde(rename = "Size 7")]
    Size7,
    #[serde(rename = "Pull-Ups 2T-3T")]
    PullUps2T3T,
    #[serde(rename = "Pull-Ups 3T-4T")]
    PullUps3T4T,
}

impl DiaperSize {
    const VALUES: &'static [Self] = &[
        Self::Preemie,
        Self::Newborn,
        Self::Size1,
        Self::Size2,
        Self::Size3,
        Self::Size4,
        Self::Size5,
        Self::Size6,
        Self::Size7,
        Self::PullUps2T3T,
        Self::PullUps3T4T,
    ];
}

choice!(DiaperSize);

/// Item types for both donations given out and in-kind donations received.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum DonationItem {
    Diapers,
    Wipes,
    Formula,
    #[serde(rename = "Baby Food")]
    BabyFood,
    Clothing,
    Shoes,
    Toys,
    Books,
    #[serde(rename = "Car Seat")]
    CarSeat,
    Stroller,
    Crib,
    #[serde(rename = "Hygiene Products")]
    HygieneProducts,
    Other,
}

impl DonationItem {
    const VALUES: &'static [Self] = &[
        Self::Diapers,
        Self::Wipes,
        Self::Formula,
        Self::BabyFood,
        Self::Clothing,
        Self::Shoes,
        Self::Toys,
        Self::Books,
        Self::CarSeat,
        Self::Stroller,
        Self::Crib,
        Self::HygieneProducts,
        Self::Other,
    ];
}

choice!(DonationItem);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum BusPassType {
    #[serde(rename = "Single Ride")]
    SingleRide,
    #[serde(rename = "Day Pass")]
    DayPass,
    #[serde(rename = "7-Day Pass")]
    SevenDay,
    #[serde(rename = "31-Day Pass")]
    ThirtyOneDay,
    #[serde(rename = "Reduced Fare")]
    ReducedFare,
}

impl BusPassType {
    const VALUES: &'static [Self] = &[
        Self::SingleRide,
        Self::DayPass,
        Self::SevenDay,
        Self::ThirtyOneDay,
        Self::ReducedFare,
    ];
}

choice!(BusPassType);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum ElectricProvider {
    #[serde(rename = "Duke Energy")]
    DukeEnergy,
    #[serde(rename = "Georgia Power")]
    GeorgiaPower,
    #[serde(rename = "Florida Power & Light")]
    FloridaPowerLight,
    #[serde(rename = "EMC Cooperative")]
    EmcCooperative,
    Other,
}

impl ElectricProvider {
    const VALUES: &'static [Self] = &[
        Self::DukeEnergy,
        Self::GeorgiaPower,
        Self::FloridaPowerLight,
        Self::EmcCooperative,
        Self::Other,
    ];
}

choice!(ElectricProvider);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum WaterProvider {
    #[serde(rename = "City Water")]
    CityWater,
    #[serde(rename = "County Water")]
    CountyWater,
    #[serde(rename = "Private Utility")]
    PrivateUtility,
    Other,
}

impl WaterProvider {
    const VALUES: &'static [Self] = &[
        Self::CityWater,
        Self::CountyWater,
        Self::PrivateUtility,
        Self::Other,
    ];
}

choice!(WaterProvider);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum RidePurpose {
    #[serde(rename = "Medical Appointment")]
    MedicalAppointment,
    #[serde(rename = "Court Date")]
    CourtDate,
    #[serde(rename = "Job Interview")]
    JobInterview,
    #[serde(rename = "Work Commute")]
    WorkCommute,
    #[serde(rename = "Child Visitation")]
    ChildVisitation,
    #[serde(rename = "Social Services")]
    SocialServices,
    Other,
}

impl RidePurpose {
    const VALUES: &'static [Self] = &[
        Self::MedicalAppointment,
        Self::CourtDate,
        Self::JobInterview,
        Self::WorkCommute,
        Self::ChildVisitation,
        Self::SocialServices,
        Self::Other,
    ];
}

choice!(RidePurpose);
