use std::fmt::Write;

use crate::models::trip::{BudgetBreakdown, PlanRequest, SuggestRequest};

const JSON_ONLY_RULES: &str = "Respond with strict JSON only. No markdown, no code fences, no commentary before or after the JSON. \
Use double quotes for every key and string value, no trailing commas, and numbers without currency symbols.";

const PLAN_SCHEMA: &str = r#"{
  "tripTitle": "string",
  "summary": "string",
  "roadmap": [
    {
      "day": 1,
      "date": "YYYY-MM-DD or null",
      "location": "string",
      "title": "string",
      "activities": [
        {
          "time": "HH:MM",
          "name": "string",
          "description": "string",
          "location": "string",
          "estimatedCost": 0
        }
      ],
      "meals": ["string"],
      "travelNotes": "string"
    }
  ],
  "accommodations": [
    {
      "name": "string",
      "location": "string",
      "type": "string",
      "pricePerNight": 0,
      "rating": 0,
      "description": "string"
    }
  ],
  "attractions": [
    {
      "name": "string",
      "location": "string",
      "description": "string",
      "entryFee": 0,
      "bestTimeToVisit": "string"
    }
  ],
  "restaurants": [
    {
      "name": "string",
      "location": "string",
      "cuisine": "string",
      "priceRange": "string",
      "mustTry": "string"
    }
  ],
  "budgetSummary": {
    "accommodation": 0,
    "transportation": 0,
    "food": 0,
    "attractions": 0,
    "miscellaneous": 0,
    "total": 0
  },
  "travelTips": ["string"]
}"#;

const SUGGEST_SCHEMA: &str = r#"{
  "suggestions": [
    {
      "destination": "string",
      "state": "string",
      "country": "string",
      "whyVisit": "string",
      "bestTimeToVisit": "string",
      "estimatedCost": 0,
      "costBreakdown": {
        "accommodation": 0,
        "transportation": 0,
        "food": 0,
        "activities": 0
      },
      "highlights": ["string"],
      "suggestedDuration": "string"
    }
  ]
}"#;

fn join_or_none(items: &[String]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Builds the itinerary prompt. `budget` is the user's budget or the derived
/// one; `breakdown` is present only when it was derived.
pub fn plan_prompt(
    request: &PlanRequest,
    days: u32,
    travelers: u32,
    budget: f64,
    breakdown: Option<&BudgetBreakdown>,
) -> String {
    let mut prompt = String::new();
    let currency = request.currency.as_str();

    // `write!` into a String cannot fail.
    let _ = writeln!(
        prompt,
        "You are an expert travel planner. Create a detailed {days}-day itinerary."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Trip details:");
    let _ = writeln!(prompt, "- Destinations (in order): {}", request.destinations.join(" -> "));
    if let Some(origin) = &request.starting_location {
        let _ = writeln!(prompt, "- Starting from: {origin}");
    }
    match (request.start_date, request.end_date) {
        (Some(start), Some(end)) => {
            let _ = writeln!(prompt, "- Dates: {start} to {end}");
        }
        (Some(start), None) => {
            let _ = writeln!(prompt, "- Start date: {start}");
        }
        _ => {}
    }
    let _ = writeln!(prompt, "- Duration: {days} days");
    let _ = writeln!(prompt, "- Travelers: {travelers}");
    let _ = writeln!(prompt, "- Travel style: {}", request.travel_style.as_str());
    let _ = writeln!(prompt, "- Accommodation preference: {}", request.accommodation_type.as_str());
    let _ = writeln!(prompt, "- Transportation: {}", request.transportation_type.as_str());
    let _ = writeln!(prompt, "- Interests: {}", join_or_none(&request.interests));
    let _ = writeln!(
        prompt,
        "- Dietary preferences: {}",
        join_or_none(&request.dietary_preferences)
    );
    let _ = writeln!(
        prompt,
        "- Accessibility needs: {}",
        join_or_none(&request.accessibility_needs)
    );
    let _ = writeln!(prompt, "- Total budget: {budget:.0} {currency} for the whole group");

    if let Some(b) = breakdown {
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "Estimated budget breakdown ({currency}):");
        let _ = writeln!(prompt, "- Accommodation: {}", b.accommodation);
        let _ = writeln!(prompt, "- Transportation: {}", b.transportation);
        let _ = writeln!(prompt, "- Food: {}", b.food);
        let _ = writeln!(prompt, "- Attractions: {}", b.attractions);
        let _ = writeln!(prompt, "- Miscellaneous: {}", b.miscellaneous);
        let _ = writeln!(prompt, "- Total: {}", b.total);
    }

    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Requirements:");
    let _ = writeln!(prompt, "- Provide exactly {days} entries in \"roadmap\", one per day, numbered from 1.");
    let _ = writeln!(prompt, "- Keep the total cost within the budget and report it in \"budgetSummary\".");
    let _ = writeln!(prompt, "- Respect every dietary preference and accessibility need listed above.");
    let _ = writeln!(prompt, "- Use real, specific place names so they can be found on a map.");
    let _ = writeln!(prompt, "- All amounts are in {currency}.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Return a JSON object with exactly this shape:");
    let _ = writeln!(prompt, "{PLAN_SCHEMA}");
    let _ = writeln!(prompt);
    let _ = write!(prompt, "{JSON_ONLY_RULES}");
    prompt
}

/// Builds the budget-driven destination suggestion prompt.
pub fn suggest_prompt(request: &SuggestRequest, days: u32, travelers: u32) -> String {
    let mut prompt = String::new();
    let currency = request.currency.as_str();
    let budget = request.budget.unwrap_or_default();

    let _ = writeln!(
        prompt,
        "You are an expert travel planner. Suggest 5 destinations that fit the budget below."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Traveler details:");
    let _ = writeln!(prompt, "- Total budget: {budget:.0} {currency} for the whole group");
    let _ = writeln!(prompt, "- Duration: {days} days");
    let _ = writeln!(prompt, "- Travelers: {travelers}");
    let _ = writeln!(prompt, "- Travel style: {}", request.travel_style.as_str());
    if let Some(origin) = &request.starting_location {
        let _ = writeln!(prompt, "- Starting from: {origin}");
    }
    if let Some(month) = &request.month {
        let _ = writeln!(prompt, "- Travel month: {month}");
    }
    let _ = writeln!(prompt, "- Interests: {}", join_or_none(&request.interests));
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Requirements:");
    let _ = writeln!(prompt, "- Every \"estimatedCost\" must be at or below the total budget, including travel from the starting point.");
    let _ = writeln!(prompt, "- All amounts are in {currency}.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Return a JSON object with exactly this shape:");
    let _ = writeln!(prompt, "{SUGGEST_SCHEMA}");
    let _ = writeln!(prompt);
    let _ = write!(prompt, "{JSON_ONLY_RULES}");
    prompt
}
