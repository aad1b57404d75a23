// api/mod.rs - Typed calls against the clinic backend
pub mod appointments;
pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod envelope;
pub mod http;

pub use appointments::{
    cancel_appointment, create_appointment, ensure_transition, fetch_appointment, fetch_appointments, update_appointment,
    upcoming_query, AppointmentSource,
};
pub use auth::{login, sign_in, LoginCredentials, LoginData};
pub use clients::{fetch_clients, ClientSource};
pub use dashboard::fetch_dashboard;
pub use envelope::{Envelope, ListEnvelope};
pub use http::{backend_client, HttpClient};
