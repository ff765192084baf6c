pub mod event;
pub mod hotel;
pub mod place;
pub mod trip;
