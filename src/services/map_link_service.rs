use serde_json::{Map, Value};
use url::Url;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";
const LINKED_SECTIONS: [&str; 3] = ["accommodations", "attractions", "restaurants"];

/// Google Maps search link for a place name, optionally qualified by location.
pub fn maps_search_url(name: &str, location: Option<&str>) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let query = match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(location) if !name.contains(location) => format!("{name}, {location}"),
        _ => name.to_string(),
    };

    let mut url = Url::parse(MAPS_SEARCH_URL).ok()?;
    url.query_pairs_mut()
        .append_pair("api", "1")
        .append_pair("query", &query);
    Some(url.into())
}

fn text<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| item.get(*key).and_then(Value::as_str))
}

fn link_item(item: &mut Value, fallback_location: Option<&str>) -> bool {
    let Value::Object(map) = item else {
        return false;
    };
    if map.contains_key("mapLink") {
        return false;
    }
    let Some(name) = text(map, &["name", "activity", "title"]) else {
        return false;
    };
    let location = text(map, &["location", "address"]).or(fallback_location);
    match maps_search_url(name, location) {
        Some(link) => {
            map.insert("mapLink".to_string(), Value::String(link));
            true
        }
        None => false,
    }
}

/// Adds a `mapLink` to every named place in a generated plan that lacks one.
/// Returns how many links were added.
pub fn attach_map_links(plan: &mut Map<String, Value>) -> usize {
    let mut added = 0;

    for section in LINKED_SECTIONS {
        if let Some(Value::Array(items)) = plan.get_mut(section) {
            for item in items.iter_mut() {
                added += usize::from(link_item(item, None));
            }
        }
    }

    if let Some(Value::Array(days)) = plan.get_mut("roadmap") {
        for day in days.iter_mut() {
            let Value::Object(day) = day else { continue };
            let day_location = day
                .get("location")
                .and_then(Value::as_str)
                .map(str::to_string);
            if let Some(Value::Array(activities)) = day.get_mut("activities") {
                for activity in activities.iter_mut() {
                    added += usize::from(link_item(activity, day_location.as_deref()));
                }
            }
        }
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_url_is_encoded() {
        let url = maps_search_url("Café Coffee & Co", Some("Koramangala")).unwrap();
        assert_eq!(
            url,
            "https://www.google.com/maps/search/?api=1&query=Caf%C3%A9+Coffee+%26+Co%2C+Koramangala"
        );
        assert!(maps_search_url("  ", None).is_none());
    }

    #[test]
    fn location_already_in_name_is_not_repeated() {
        let url = maps_search_url("Mysore Palace", Some("Mysore")).unwrap();
        assert!(url.ends_with("query=Mysore+Palace"));
    }

    #[test]
    fn links_are_added_to_sections_and_activities() {
        let mut plan = json!({
            "roadmap": [
                {
                    "day": 1,
                    "location": "Hampi",
                    "activities": [
                        { "name": "Virupaksha Temple" },
                        { "time": "18:00" }
                    ]
                }
            ],
            "accommodations": [
                { "name": "Hampi Heritage", "location": "Kamalapur" },
                { "name": "Kept", "mapLink": "https://example.com" }
            ],
            "attractions": [{ "name": "Vittala Temple", "location": "Hampi" }],
            "restaurants": "not a list"
        });
        let map = plan.as_object_mut().unwrap();
        assert_eq!(attach_map_links(map), 3);

        assert_eq!(plan["accommodations"][1]["mapLink"], "https://example.com");
        assert!(plan["accommodations"][0]["mapLink"]
            .as_str()
            .unwrap()
            .contains("Hampi+Heritage%2C+Kamalapur"));
        assert!(plan["roadmap"][0]["activities"][0]["mapLink"]
            .as_str()
            .unwrap()
            .contains("Virupaksha+Temple%2C+Hampi"));
        assert!(plan["roadmap"][0]["activities"][1].get("mapLink").is_none());
    }
}
