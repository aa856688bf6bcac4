//! Validated identifiers for OAuth clients and stored credential slots.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (client, credential key).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (client, credential key).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (client, credential key).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { ClientId, "OAuth client identifier issued by the developer dashboard.", "Client" }
def_id! { CredentialKey, "Logical session slot under which a credential is stored.", "CredentialKey" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_blank_and_padded_values() {
		assert!(ClientId::new(" client").is_err(), "Leading whitespace must be rejected.");
		assert!(CredentialKey::new("").is_err());
		assert!(CredentialKey::new("rider 42").is_err());

		let key = CredentialKey::new("rider-42").expect("Credential key fixture should be valid.");

		assert_eq!(key.as_ref(), "rider-42");
		assert_eq!(format!("{key:?}"), "CredentialKey(rider-42)");
	}

	#[test]
	fn length_limit_is_enforced() {
		ClientId::new("a".repeat(IDENTIFIER_MAX_LEN)).expect("Exact length should succeed.");

		let err = ClientId::new("a".repeat(IDENTIFIER_MAX_LEN + 1))
			.expect_err("Over-long identifiers must be rejected.");

		assert_eq!(err, IdentifierError::TooLong { kind: "Client", max: IDENTIFIER_MAX_LEN });
	}

	#[test]
	fn serde_enforces_validation() {
		let key: CredentialKey =
			serde_json::from_str("\"rider-7\"").expect("Key should deserialize successfully.");

		assert_eq!(&*key, "rider-7");
		assert!(serde_json::from_str::<CredentialKey>("\"with space\"").is_err());
	}

	#[test]
	fn borrow_supports_map_lookup() {
		let map: HashMap<CredentialKey, u8> = HashMap::from_iter([(
			CredentialKey::new("rider-1").expect("Key used for lookup should be valid."),
			1_u8,
		)]);

		assert_eq!(map.get("rider-1"), Some(&1));
	}
}
