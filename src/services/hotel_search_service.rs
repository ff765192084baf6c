use std::cmp::Ordering;

use crate::models::hotel::{Coordinates, HotelMatch, PartnerHotel};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Equivalent spellings of the same city, all lowercase.
const CITY_ALIASES: &[&[&str]] = &[
    &["bengaluru", "bangalore"],
    &["mumbai", "bombay"],
    &["chennai", "madras"],
    &["kolkata", "calcutta"],
    &["gurugram", "gurgaon"],
    &["puducherry", "pondicherry"],
    &["thiruvananthapuram", "trivandrum"],
    &["mysuru", "mysore"],
    &["kochi", "cochin"],
    &["varanasi", "benares", "banaras"],
    &["new delhi", "delhi"],
];

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Every spelling that names the same city as `city`, including itself.
pub fn city_aliases(city: &str) -> Vec<String> {
    let normalized = PartnerHotel::normalize_city(city);
    match CITY_ALIASES
        .iter()
        .find(|group| group.contains(&normalized.as_str()))
    {
        Some(group) => group.iter().map(|name| name.to_string()).collect(),
        None => vec![normalized],
    }
}

fn city_key(hotel: &PartnerHotel) -> String {
    if hotel.city_lower.is_empty() {
        PartnerHotel::normalize_city(&hotel.city)
    } else {
        hotel.city_lower.clone()
    }
}

fn by_rating_then_name(a: &PartnerHotel, b: &PartnerHotel) -> Ordering {
    let rating_a = a.rating.unwrap_or(0.0);
    let rating_b = b.rating.unwrap_or(0.0);
    rating_b
        .partial_cmp(&rating_a)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.name.cmp(&b.name))
}

pub struct HotelSearchService;

impl HotelSearchService {
    /// Exact lowercase city match.
    pub fn exact_city(hotels: &[PartnerHotel], city: &str) -> Vec<PartnerHotel> {
        let wanted = PartnerHotel::normalize_city(city);
        let mut matches: Vec<PartnerHotel> = hotels
            .iter()
            .filter(|hotel| city_key(hotel) == wanted)
            .cloned()
            .collect();
        matches.sort_by(by_rating_then_name);
        matches
    }

    /// Exact match first; when nothing matches, any alias of the city.
    pub fn by_city(hotels: &[PartnerHotel], city: &str) -> Vec<HotelMatch> {
        let mut matches = Self::exact_city(hotels, city);
        if matches.is_empty() {
            let aliases = city_aliases(city);
            matches = hotels
                .iter()
                .filter(|hotel| aliases.contains(&city_key(hotel)))
                .cloned()
                .collect();
            matches.sort_by(by_rating_then_name);
        }

        matches
            .into_iter()
            .map(|hotel| HotelMatch {
                hotel,
                distance_km: None,
            })
            .collect()
    }

    /// Hotels within `radius_km` of `origin`, nearest first. Hotels without
    /// valid coordinates never match.
    pub fn within_radius(
        hotels: &[PartnerHotel],
        origin: Coordinates,
        radius_km: f64,
    ) -> Vec<HotelMatch> {
        let mut matches: Vec<(f64, &PartnerHotel)> = hotels
            .iter()
            .filter_map(|hotel| {
                let coordinates = hotel.coordinates.filter(Coordinates::is_valid)?;
                let distance = haversine_km(origin, coordinates);
                (distance <= radius_km).then_some((distance, hotel))
            })
            .collect();

        matches.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        matches
            .into_iter()
            .map(|(distance, hotel)| HotelMatch {
                hotel: hotel.clone(),
                distance_km: Some((distance * 100.0).round() / 100.0),
            })
            .collect()
    }
}
