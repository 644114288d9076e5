//! Domain model for fleet checkout management.
//!
//! Trucks, reservations and user profiles are plain values here; the rules
//! that tie them together live in the checkout engine, and persistence stays
//! behind the ports.

mod catalog;
mod error;
mod ids;
mod notice;
mod policy;
mod reservation;
mod truck;
mod user;
mod window;

pub use catalog::{TeamName, TruckName, is_valid_team_name, is_valid_truck_name};
pub use error::{FleetDomainError, ParseWeekdayError};
pub use ids::{CalendarId, ChatUserId, CheckoutDays, ReservationId, TruckId, UserId};
pub use notice::FleetNotice;
pub use policy::{CheckoutPolicy, ValidDays};
pub use reservation::{PersistedReservationData, ReleaseRecord, Requester, Reservation};
pub use truck::{PersistedTruckData, Truck};
pub use user::{PersistedUserData, UserProfile};
pub use window::{ReservationWindow, last_valid_day};
