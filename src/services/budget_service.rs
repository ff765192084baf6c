use crate::models::trip::{
    AccommodationType, BudgetBreakdown, PlanRequest, TransportationType, TravelStyle,
};

/// Kilometres assumed driven per day on an own-vehicle trip.
const KM_PER_DAY: f64 = 200.0;
const MISC_SHARE: f64 = 0.10;

/// Inputs for [`BudgetService::estimate`].
#[derive(Debug, Clone, Copy)]
pub struct BudgetInputs {
    pub days: u32,
    pub travelers: u32,
    pub travel_style: TravelStyle,
    pub accommodation_type: AccommodationType,
    pub transportation_type: TransportationType,
    pub fuel_cost_per_liter: Option<f64>,
    pub vehicle_mileage: Option<f64>,
}

impl BudgetInputs {
    pub fn from_request(request: &PlanRequest, days: u32, travelers: u32) -> Self {
        Self {
            days,
            travelers,
            travel_style: request.travel_style,
            accommodation_type: request.accommodation_type,
            transportation_type: request.transportation_type,
            fuel_cost_per_liter: request.fuel_cost_per_liter,
            vehicle_mileage: request.vehicle_mileage,
        }
    }
}

pub struct BudgetService;

impl BudgetService {
    /// Nightly rate per person, before the travel-style multiplier.
    pub fn accommodation_rate(kind: AccommodationType) -> f64 {
        match kind {
            AccommodationType::Hostel => 800.0,
            AccommodationType::Budget => 1500.0,
            AccommodationType::Balanced => 3000.0,
            AccommodationType::Luxury => 8000.0,
            AccommodationType::Homestay => 2000.0,
        }
    }

    /// Daily transport rate per person, before the travel-style multiplier.
    pub fn transport_rate(kind: TransportationType) -> f64 {
        match kind {
            TransportationType::Bus => 500.0,
            TransportationType::Train => 800.0,
            TransportationType::Flight => 4000.0,
            TransportationType::OwnVehicle => 1200.0,
            TransportationType::Mix => 1000.0,
        }
    }

    pub fn food_rate(style: TravelStyle) -> f64 {
        match style {
            TravelStyle::Budget => 600.0,
            TravelStyle::Balanced => 1200.0,
            TravelStyle::Luxury => 3000.0,
            TravelStyle::Adventure => 1000.0,
        }
    }

    pub fn attractions_rate(style: TravelStyle) -> f64 {
        match style {
            TravelStyle::Budget => 300.0,
            TravelStyle::Balanced => 700.0,
            TravelStyle::Luxury => 2000.0,
            TravelStyle::Adventure => 1500.0,
        }
    }

    pub fn style_multiplier(style: TravelStyle) -> f64 {
        match style {
            TravelStyle::Budget => 0.7,
            TravelStyle::Balanced => 1.0,
            TravelStyle::Luxury => 1.8,
            TravelStyle::Adventure => 1.2,
        }
    }

    /// Fuel cost for an own-vehicle trip, when both figures are usable.
    pub fn fuel_cost(days: u32, cost_per_liter: Option<f64>, mileage: Option<f64>) -> Option<u64> {
        match (cost_per_liter, mileage) {
            (Some(cost), Some(mileage)) if cost > 0.0 && mileage > 0.0 => {
                let liters = f64::from(days) * KM_PER_DAY / mileage;
                Some(round(liters * cost))
            }
            _ => None,
        }
    }

    pub fn estimate(inputs: &BudgetInputs) -> BudgetBreakdown {
        let person_days = f64::from(inputs.days) * f64::from(inputs.travelers);
        let multiplier = Self::style_multiplier(inputs.travel_style);

        let accommodation =
            round(Self::accommodation_rate(inputs.accommodation_type) * multiplier * person_days);

        let fuel = match inputs.transportation_type {
            TransportationType::OwnVehicle => {
                Self::fuel_cost(inputs.days, inputs.fuel_cost_per_liter, inputs.vehicle_mileage)
            }
            _ => None,
        };
        let transportation = fuel.unwrap_or_else(|| {
            round(Self::transport_rate(inputs.transportation_type) * multiplier * person_days)
        });

        let food = round(Self::food_rate(inputs.travel_style) * person_days);
        let attractions = round(Self::attractions_rate(inputs.travel_style) * person_days);

        let subtotal = accommodation + transportation + food + attractions;
        let miscellaneous = round(subtotal as f64 * MISC_SHARE);

        BudgetBreakdown {
            accommodation,
            transportation,
            food,
            attractions,
            miscellaneous,
            total: subtotal + miscellaneous,
        }
    }
}

fn round(value: f64) -> u64 {
    value.round().max(0.0) as u64
}
