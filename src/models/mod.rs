pub mod actor;
pub mod booking;
pub mod lead;
pub mod venue;

pub use actor::{Actor, ActorRole};
pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use lead::{Lead, LeadMessage, LeadSource, LeadStatus, MessageKind};
pub use venue::VenueSummary;
