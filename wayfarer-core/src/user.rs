//! Signed-in users, roles and authentication payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Property names under which the backend has been seen to report a role.
///
/// The first present, non-empty value wins.
pub const ROLE_KEYS: [&str; 7] = [
    "role",
    "userRole",
    "user_role",
    "userType",
    "user_type",
    "accountType",
    "type",
];

/// Backend identifier of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Account role; decides which forms and actions a user may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Plans trips.
    Tourist,
    /// Lists hotels.
    HotelOwner,
    /// Lists restaurants.
    RestaurantOwner,
    /// Lists cab services.
    CabDriver,
    /// Lists guiding services.
    Guide,
}

impl Role {
    /// Every role, in registration-form order.
    pub const ALL: [Self; 5] = [
        Self::Tourist,
        Self::HotelOwner,
        Self::RestaurantOwner,
        Self::CabDriver,
        Self::Guide,
    ];

    /// Canonical wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tourist => "tourist",
            Self::HotelOwner => "hotel_owner",
            Self::RestaurantOwner => "restaurant_owner",
            Self::CabDriver => "cab_driver",
            Self::Guide => "guide",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive; `-` and spaces count as `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalised)
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

/// The signed-in user with a single canonical role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct User {
    /// Backend identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login e-mail.
    pub email: String,
    /// Canonical role, `None` when the backend sent none we recognise.
    pub role: Option<Role>,
}

/// Errors raised while decoding a user object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserDecodeError {
    /// The payload was not a JSON object.
    #[error("user payload must be a JSON object")]
    NotAnObject,
    /// Neither `id` nor `_id` was present.
    #[error("user payload has no id")]
    MissingId,
}

impl User {
    /// Whether this user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    /// Decode a backend user object, folding the role aliases in
    /// [`ROLE_KEYS`] into [`User::role`].
    pub fn from_value(value: Value) -> Result<Self, UserDecodeError> {
        let Value::Object(map) = value else {
            return Err(UserDecodeError::NotAnObject);
        };
        let id = text_field(&map, "id")
            .or_else(|| text_field(&map, "_id"))
            .ok_or(UserDecodeError::MissingId)?;
        Ok(Self {
            id: UserId::new(id),
            name: text_field(&map, "name").unwrap_or_default(),
            email: text_field(&map, "email").unwrap_or_default(),
            role: canonical_role(&map),
        })
    }
}

impl TryFrom<Value> for User {
    type Error = UserDecodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn canonical_role(map: &Map<String, Value>) -> Option<Role> {
    let raw = ROLE_KEYS.iter().find_map(|key| text_field(map, key))?;
    match raw.parse() {
        Ok(role) => Some(role),
        Err(err) => {
            log::warn!("ignoring user role: {err}");
            None
        }
    }
}

/// Login form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account e-mail.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Registration form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Account e-mail.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Requested role.
    pub role: Role,
}

/// Token issued by `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthGrant {
    /// Session token to persist.
    pub token: String,
    /// User echoed with the grant, when the backend includes one.
    #[serde(default)]
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("tourist", Role::Tourist)]
    #[case("Hotel_Owner", Role::HotelOwner)]
    #[case("restaurant-owner", Role::RestaurantOwner)]
    #[case("Cab Driver", Role::CabDriver)]
    #[case(" GUIDE ", Role::Guide)]
    fn parses_role_spellings(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
    }

    #[rstest]
    #[case(json!({"_id": "u1", "name": "Ann", "email": "a@x", "role": "guide"}))]
    #[case(json!({"id": "u1", "name": "Ann", "email": "a@x", "userRole": "guide"}))]
    #[case(json!({"id": "u1", "name": "Ann", "email": "a@x", "user_type": "Guide"}))]
    #[case(json!({"id": "u1", "name": "Ann", "email": "a@x", "accountType": "guide"}))]
    #[case(json!({"id": "u1", "name": "Ann", "email": "a@x", "role": "", "type": "guide"}))]
    fn normalises_role_aliases(#[case] payload: Value) {
        let user: User = serde_json::from_value(payload).expect("decodes");
        assert_eq!(user.id, UserId::from("u1"));
        assert_eq!(user.role, Some(Role::Guide));
    }

    #[rstest]
    fn unknown_role_decodes_without_role() {
        let user = User::from_value(json!({"id": "u2", "role": "admin"})).expect("decodes");
        assert_eq!(user.role, None);
        assert!(!user.has_role(Role::Tourist));
    }

    #[rstest]
    fn missing_id_is_rejected() {
        assert_eq!(
            User::from_value(json!({"name": "Ann"})),
            Err(UserDecodeError::MissingId)
        );
    }

    #[rstest]
    fn serializes_canonical_role() {
        let user = User {
            id: UserId::from("u3"),
            name: "Bo".into(),
            email: "b@x".into(),
            role: Some(Role::CabDriver),
        };
        let value = serde_json::to_value(&user).expect("serializes");
        assert_eq!(value["role"], json!("cab_driver"));
        assert_eq!(value["id"], json!("u3"));
    }
}
