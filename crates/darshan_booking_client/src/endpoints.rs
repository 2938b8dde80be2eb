//! Whitelisted Frappe method paths, kept as data per role.
//!
//! Every role profile doctype exposes the same family of methods under its
//! own dotted module path; which of them a role may call (and with which HTTP
//! verb) is listed in the tables below.

use std::fmt;
use std::str::FromStr;

use crate::BookingError;

pub const LOGIN_PATH: &str = "/api/method/login";
pub const LOGOUT_PATH: &str = "/api/method/logout";
const DOCTYPE_PREFIX: &str = "/api/method/mahakaal.darshan_booking.doctype.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
}

impl From<Verb> for reqwest::Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    GetProfile,
    UpdateProfile,
    LoginRequest,
    CreateUser,
    GetAppointmentList,
    GetAppointment,
    CreateAppointment,
    GetAppointmentStats,
    ApproveAppointment,
    RejectAppointment,
}

impl Operation {
    pub fn method_name(self) -> &'static str {
        match self {
            Operation::GetProfile => "get_profile",
            Operation::UpdateProfile => "update_profile",
            Operation::LoginRequest => "login_request",
            Operation::CreateUser => "create_devoteee_user",
            Operation::GetAppointmentList => "get_appointment_list",
            Operation::GetAppointment => "get_appointment",
            Operation::CreateAppointment => "create_appointment",
            Operation::GetAppointmentStats => "get_appointment_stats",
            Operation::ApproveAppointment => "approve_appointment",
            Operation::RejectAppointment => "reject_appointment",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

use Operation::*;
use Verb::{Get, Post};

const DEVOTEE: &[(Operation, Verb)] = &[
    (GetProfile, Get),
    (UpdateProfile, Post),
    (LoginRequest, Post),
    (CreateUser, Post),
    (GetAppointmentList, Post),
    (GetAppointment, Post),
    (CreateAppointment, Post),
    (GetAppointmentStats, Post),
];

const ATTENDER: &[(Operation, Verb)] = &[(GetProfile, Get), (LoginRequest, Post)];

const APPROVER: &[(Operation, Verb)] = &[
    (GetProfile, Get),
    (UpdateProfile, Post),
    (LoginRequest, Post),
    (GetAppointmentList, Post),
    (GetAppointment, Post),
    (GetAppointmentStats, Post),
    (ApproveAppointment, Post),
    (RejectAppointment, Post),
];

const ADMIN: &[(Operation, Verb)] = &[
    (GetProfile, Get),
    (UpdateProfile, Post),
    (LoginRequest, Post),
    (GetAppointmentList, Get),
    (GetAppointment, Post),
];

/// Who the client is acting as. Decides the method module and the allowed calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    Devotee,
    Attender,
    Approver,
    Admin,
}

impl Role {
    fn doctype(self) -> &'static str {
        match self {
            Role::Devotee => "darshan_devoteee_profile",
            Role::Attender => "darshan_attender_profile",
            Role::Approver => "darshan_approver_profile",
            Role::Admin => "darshan_admin_profile",
        }
    }

    fn table(self) -> &'static [(Operation, Verb)] {
        match self {
            Role::Devotee => DEVOTEE,
            Role::Attender => ATTENDER,
            Role::Approver => APPROVER,
            Role::Admin => ADMIN,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Devotee => "devotee",
            Role::Attender => "attender",
            Role::Approver => "approver",
            Role::Admin => "admin",
        }
    }

    /// Verb for `op`, or `None` when the role does not expose it.
    pub fn verb(self, op: Operation) -> Option<Verb> {
        self.table()
            .iter()
            .find(|(candidate, _)| *candidate == op)
            .map(|(_, verb)| *verb)
    }

    pub fn supports(self, op: Operation) -> bool {
        self.verb(op).is_some()
    }

    pub fn method_path(self, op: Operation) -> String {
        let doctype = self.doctype();
        format!("{DOCTYPE_PREFIX}{doctype}.{doctype}.{}", op.method_name())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devotee" | "devoteee" => Ok(Role::Devotee),
            "attender" => Ok(Role::Attender),
            "approver" => Ok(Role::Approver),
            "admin" => Ok(Role::Admin),
            other => Err(BookingError::Config(format!("unknown role: {other}"))),
        }
    }
}

/// Slot books that report per-date occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotBook {
    General,
    Vip,
}

impl SlotBook {
    pub fn occupancy_path(self) -> String {
        let doctype = match self {
            SlotBook::General => "booking_slot",
            SlotBook::Vip => "vip_darshan_booking_slot",
        };
        format!("{DOCTYPE_PREFIX}{doctype}.{doctype}.get_slot_occupancy_info")
    }
}
