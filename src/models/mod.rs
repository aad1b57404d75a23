// models/mod.rs - Nominal types for every entity crossing the API boundary
pub mod appointment;
pub mod client;
pub mod dashboard;
pub mod user;

pub use appointment::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};
pub use client::{Client, ClientSummary};
pub use dashboard::{Dashboard, DashboardCards};
pub use user::User;
