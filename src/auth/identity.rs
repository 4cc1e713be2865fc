//! Authenticated identity and the closed role set used for authorization gating.

// self
use crate::{_prelude::*, auth::UserId};

/// Authorization level assigned to a panel user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Full access, including user and store administration.
	#[serde(alias = "ADMIN")]
	Admin,
	/// Manages products, orders, and routes for assigned stores.
	#[serde(alias = "MANAGER")]
	Manager,
	/// Day-to-day order and route handling.
	#[serde(alias = "OPERATOR")]
	Operator,
}
impl Role {
	/// Every role, most privileged first.
	pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Operator];

	/// Returns a stable label suitable for logs and wire payloads.
	pub const fn as_str(self) -> &'static str {
		match self {
			Role::Admin => "admin",
			Role::Manager => "manager",
			Role::Operator => "operator",
		}
	}

	/// Returns `true` if this role appears in `allowed`.
	///
	/// An empty slice admits every role.
	pub fn is_allowed(self, allowed: &[Role]) -> bool {
		allowed.is_empty() || allowed.contains(&self)
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Role {
	type Err = UnknownRole;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Role::ALL
			.into_iter()
			.find(|role| role.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownRole(s.to_owned()))
	}
}

/// Error returned when parsing a role label outside the closed set.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown role `{0}`.")]
pub struct UnknownRole(pub String);

/// Identity resolved by presenting the access credential to the identity endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Backend user identifier.
	pub id: UserId,
	/// Display name.
	pub name: String,
	/// Authorization level.
	pub role: Role,
}
impl Identity {
	/// Fails with [`Error::Forbidden`] unless the identity's role is in `allowed`.
	pub fn require_role(&self, allowed: &[Role]) -> Result<()> {
		if self.role.is_allowed(allowed) {
			Ok(())
		} else {
			Err(Error::Forbidden { role: self.role })
		}
	}
}
