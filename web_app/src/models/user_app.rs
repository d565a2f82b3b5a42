//! Users and the role classifier.
//!
//! Roles arrive from many places: registration payloads, legacy rows written
//! before the roles were standardized, admin requests. Every one of them goes
//! through [`AccountRole::classify`] so the rest of the app only ever sees the
//! three canonical roles.

use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Synonym table used by the classifier. Keys are already normalized
/// (lowercase, no separators).
const ROLE_SYNONYMS: [(&str, AccountRole); 19] = [
    ("customer", AccountRole::Customer),
    ("user", AccountRole::Customer),
    ("client", AccountRole::Customer),
    ("owner", AccountRole::Customer),
    ("petowner", AccountRole::Customer),
    ("patient", AccountRole::Customer),
    ("vet", AccountRole::Vet),
    ("veterinarian", AccountRole::Vet),
    ("veterinary", AccountRole::Vet),
    ("doctor", AccountRole::Vet),
    ("dr", AccountRole::Vet),
    ("clinicmanager", AccountRole::Vet),
    ("clinicstaff", AccountRole::Vet),
    ("staff", AccountRole::Vet),
    ("admin", AccountRole::Admin),
    ("administrator", AccountRole::Admin),
    ("superuser", AccountRole::Admin),
    ("superadmin", AccountRole::Admin),
    ("root", AccountRole::Admin),
];

#[derive(Debug, Display, Error, PartialEq)]
#[display("unknown account role: {_0:?}")]
pub struct UnknownRoleError(#[error(not(source))] pub String);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, Default, Hash)]
#[serde(from = "String")]
pub enum AccountRole {
    #[default]
    #[display("Customer")]
    Customer,
    #[display("Vet")]
    Vet,
    #[display("Admin")]
    Admin,
}

fn normalize_role_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl AccountRole {
    /// Strict lookup: `None` when the value is not in the synonym table.
    pub fn try_classify(raw: &str) -> Option<Self> {
        let key = normalize_role_key(raw);
        ROLE_SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == key)
            .map(|(_, role)| *role)
    }

    /// Lenient lookup. Unknown, empty or missing values fall back to
    /// [`AccountRole::Customer`], never an error.
    pub fn classify(raw: &str) -> Self {
        Self::try_classify(raw).unwrap_or_default()
    }

    pub fn classify_opt(raw: Option<&str>) -> Self {
        raw.map(Self::classify).unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.eq(&AccountRole::Admin)
    }

    pub fn is_vet(&self) -> bool {
        self.eq(&AccountRole::Vet)
    }

    pub fn is_customer(&self) -> bool {
        self.eq(&AccountRole::Customer)
    }

    pub const fn permissions(&self) -> RolePermissions {
        match self {
            AccountRole::Customer => RolePermissions {
                can_manage_users: false,
                can_manage_clinics: false,
                can_manage_appointments: false,
                can_view_reports: false,
                can_view_patients: false,
                can_view_all_pets: false,
                can_book_appointments: true,
                can_manage_own_pets: true,
            },
            AccountRole::Vet => RolePermissions {
                can_manage_users: false,
                can_manage_clinics: false,
                can_manage_appointments: true,
                can_view_reports: true,
                can_view_patients: true,
                can_view_all_pets: false,
                can_book_appointments: false,
                can_manage_own_pets: false,
            },
            AccountRole::Admin => RolePermissions {
                can_manage_users: true,
                can_manage_clinics: true,
                can_manage_appointments: true,
                can_view_reports: true,
                can_view_patients: true,
                can_view_all_pets: true,
                can_book_appointments: true,
                can_manage_own_pets: true,
            },
        }
    }
}

impl From<String> for AccountRole {
    fn from(value: String) -> Self {
        Self::classify(&value)
    }
}

impl FromStr for AccountRole {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_classify(s).ok_or_else(|| UnknownRoleError(s.to_string()))
    }
}

pub fn is_admin(raw_role: &str) -> bool {
    AccountRole::classify(raw_role).is_admin()
}

pub fn is_vet(raw_role: &str) -> bool {
    AccountRole::classify(raw_role).is_vet()
}

pub fn is_customer(raw_role: &str) -> bool {
    AccountRole::classify(raw_role).is_customer()
}

/// Static capability bundle. There are no per-user overrides.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RolePermissions {
    pub can_manage_users: bool,
    pub can_manage_clinics: bool,
    pub can_manage_appointments: bool,
    pub can_view_reports: bool,
    pub can_view_patients: bool,
    pub can_view_all_pets: bool,
    pub can_book_appointments: bool,
    pub can_manage_own_pets: bool,
}

#[derive(Serialize, Debug, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub account_role: AccountRole,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, account_role: AccountRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash: None,
            account_role,
            phone: None,
            address: None,
            is_enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Accounts created through the identity provider have no password.
    pub fn is_external_account(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Raw role value as stored, used by the standardization maintenance.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRole {
    pub user_id: i64,
    pub raw_role: String,
}
