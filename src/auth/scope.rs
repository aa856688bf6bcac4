//! Scope modeling: the well-known API scopes plus free-form scopes granted by the server.

// std
use std::{collections::BTreeSet, slice::Iter};
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
	/// The string does not name a well-known [`Scope`].
	#[error("Unknown scope: {scope}.")]
	Unknown {
		/// The unrecognized scope string.
		scope: String,
	},
}

/// Well-known scopes understood by the Rides API.
///
/// General scopes can be requested by any application; privileged scopes require the
/// application to be approved for them before the authorization server will grant them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
	/// Basic profile of the rider (name, email, picture).
	Profile,
	/// Full trip history.
	History,
	/// Trip history without location data.
	HistoryLite,
	/// Saved home and work places.
	Places,
	/// Ride request widget access.
	RideWidgets,
	/// Every trip, including ones not requested through this application.
	AllTrips,
	/// Request rides on behalf of the rider.
	Request,
	/// Receipts for rides requested by this application.
	RequestReceipt,
}
impl Scope {
	/// Every well-known scope, general ones first.
	pub const ALL: [Scope; 8] = [
		Scope::Profile,
		Scope::History,
		Scope::HistoryLite,
		Scope::Places,
		Scope::RideWidgets,
		Scope::AllTrips,
		Scope::Request,
		Scope::RequestReceipt,
	];

	/// Returns the wire value used in `scope` parameters.
	pub const fn as_str(self) -> &'static str {
		match self {
			Scope::Profile => "profile",
			Scope::History => "history",
			Scope::HistoryLite => "history_lite",
			Scope::Places => "places",
			Scope::RideWidgets => "ride_widgets",
			Scope::AllTrips => "all_trips",
			Scope::Request => "request",
			Scope::RequestReceipt => "request_receipt",
		}
	}

	/// Returns `true` for scopes that need explicit approval.
	pub const fn is_privileged(self) -> bool {
		matches!(self, Scope::AllTrips | Scope::Request | Scope::RequestReceipt)
	}
}
impl Display for Scope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Scope {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Scope::ALL
			.into_iter()
			.find(|scope| scope.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| ScopeValidationError::Unknown { scope: s.to_owned() })
	}
}
impl From<Scope> for String {
	fn from(value: Scope) -> Self {
		value.as_str().to_owned()
	}
}

/// Normalized set of scopes, mixing well-known [`Scope`] values and free-form strings.
///
/// Entries are deduplicated and sorted so equality and ordering stay stable regardless of the
/// order the server listed them in.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet {
	scopes: Arc<[String]>,
}
impl ScopeSet {
	/// Creates a normalized scope set from any iterator of strings.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self { scopes: normalize(scopes)? })
	}

	/// Builds a set from well-known scopes only.
	pub fn from_scopes(scopes: impl IntoIterator<Item = Scope>) -> Self {
		let set = scopes.into_iter().map(|scope| scope.as_str().to_owned()).collect::<BTreeSet<_>>();

		Self { scopes: Arc::from(set.into_iter().collect::<Vec<_>>()) }
	}

	/// Parses the space-delimited `scope` value returned by the token endpoint.
	pub fn from_delimited(value: &str) -> Result<Self, ScopeValidationError> {
		Self::new(value.split_whitespace())
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the normalized set contains the provided scope string.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Returns true if the set contains the well-known scope.
	pub fn contains_scope(&self, scope: Scope) -> bool {
		self.contains(scope.as_str())
	}

	/// Well-known scopes present in the set.
	pub fn known(&self) -> Vec<Scope> {
		self.iter().filter_map(|value| value.parse().ok()).collect()
	}

	/// Free-form scopes that do not map onto a well-known [`Scope`].
	pub fn custom(&self) -> impl Iterator<Item = &str> {
		self.iter().filter(|value| value.parse::<Scope>().is_err())
	}

	/// Returns a new set that also contains `other`.
	pub fn union(&self, other: &ScopeSet) -> ScopeSet {
		let set = self.scopes.iter().chain(other.scopes.iter()).cloned().collect::<BTreeSet<_>>();

		Self { scopes: Arc::from(set.into_iter().collect::<Vec<_>>()) }
	}

	/// Iterator over normalized scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}

	/// Returns the space-delimited representation used on the wire.
	pub fn normalized(&self) -> String {
		self.scopes.join(" ")
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.scopes
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.scopes).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}

/// Iterator over scope strings.
pub struct ScopeIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for ScopeIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl<'a> IntoIterator for &'a ScopeSet {
	type IntoIter = ScopeIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		ScopeIter { inner: self.scopes.iter() }
	}
}
impl TryFrom<Vec<String>> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::from_delimited(s)
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.scopes.len()))?;

		for scope in self.scopes.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeSet::new(values).map_err(DeError::custom)
	}
}

fn normalize<I, S>(scopes: I) -> Result<Arc<[String]>, ScopeValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for scope in scopes {
		let owned: String = scope.into();

		if owned.is_empty() {
			return Err(ScopeValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scopes_normalize_and_deduplicate() {
		let lhs = ScopeSet::new(["profile", "history", "history"])
			.expect("Left-hand scope set should be valid.");
		let rhs = ScopeSet::from_scopes([Scope::History, Scope::Profile]);

		assert_eq!(lhs, rhs);
		assert_eq!(lhs.normalized(), "history profile");
	}

	#[test]
	fn known_and_custom_scopes_are_split() {
		let scopes = ScopeSet::from_delimited("profile partner.accounts request")
			.expect("Delimited scope string should parse.");

		assert_eq!(scopes.known(), vec![Scope::Profile, Scope::Request]);
		assert_eq!(scopes.custom().collect::<Vec<_>>(), vec!["partner.accounts"]);
		assert!(scopes.contains_scope(Scope::Request));
		assert!(!scopes.contains_scope(Scope::Places));
	}

	#[test]
	fn privileged_scopes_are_flagged() {
		assert!(Scope::Request.is_privileged());
		assert!(Scope::AllTrips.is_privileged());
		assert!(!Scope::Profile.is_privileged());
		assert_eq!("HISTORY_LITE".parse::<Scope>(), Ok(Scope::HistoryLite));
		assert!(matches!("delivery".parse::<Scope>(), Err(ScopeValidationError::Unknown { .. })));
	}

	#[test]
	fn invalid_scopes_error() {
		assert!(ScopeSet::new([""]).is_err());
		assert!(ScopeSet::new(["contains space"]).is_err());
		assert!(ScopeSet::from_str("").is_ok(), "Empty string represents an empty scope set.");
		assert!(ScopeSet::from_str("   ").is_err(), "Whitespace-only input must be rejected.");
	}

	#[test]
	fn union_merges_sets() {
		let base = ScopeSet::from_scopes([Scope::Profile]);
		let extra = ScopeSet::new(["places", "profile"]).expect("Extra scope set should be valid.");

		assert_eq!(base.union(&extra).normalized(), "places profile");
	}
}
