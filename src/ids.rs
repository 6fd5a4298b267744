//! Opaque identifiers for domain entities.
//!
//! Every id is a thin newtype over a `String`. The simulation never parses
//! structure out of an id except for the synthesized private-membership
//! token (see [`synthesize_private_membership`]), which is documented as
//! such rather than re-derived by callers.

use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(VehicleId);
string_id!(RequestId);
string_id!(StationId);
string_id!(BaseId);
string_id!(MembershipId);
string_id!(ChargerId);
string_id!(MechatronicsId);

/// Synthesizes the private home-base membership token described in spec §3:
/// `"<vehicle_id>_private_<base_id>"`. Shared by a human driver's vehicle,
/// home base, and (optionally) the base's station so dispatch can be scoped
/// to that one vehicle/base pair via the ordinary membership mechanism.
pub fn synthesize_private_membership(vehicle_id: &VehicleId, base_id: &BaseId) -> MembershipId {
    MembershipId::new(format!("{}_private_{}", vehicle_id.0, base_id.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_membership_token_shape() {
        let v = VehicleId::new("v1");
        let b = BaseId::new("b1");
        assert_eq!(
            synthesize_private_membership(&v, &b),
            MembershipId::new("v1_private_b1")
        );
    }

    #[test]
    fn display_matches_inner_string() {
        let v = VehicleId::new("v42");
        assert_eq!(format!("{v}"), "v42");
    }
}
