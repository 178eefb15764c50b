pub mod availability;
pub mod bookings;
pub mod commission;
pub mod leads;
pub mod payments;
pub mod reporting;
pub mod venues;
