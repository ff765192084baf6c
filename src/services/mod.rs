pub mod budget_service;
pub mod geo_service;
pub mod hotel_search_service;
pub mod json_extraction_service;
pub mod llm_service;
pub mod map_link_service;
pub mod place_cache;
pub mod prompt_service;
pub mod trip_service;
