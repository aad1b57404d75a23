use serde::{Deserialize, Serialize};

use super::{Appointment, Client};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCards {
    pub total_clients: u64,
    pub upcoming_appointments: u64,
    pub this_week: u64,
    pub active_clients: u64,
}

/// Payload of `GET /dashboard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub cards: DashboardCards,
    #[serde(default)]
    pub recent_clients: Vec<Client>,
    #[serde(default)]
    pub upcoming_appointments_list: Vec<Appointment>,
}
