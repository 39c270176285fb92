use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A per-resource plan limit.
///
/// `Unlimited` is an explicit tagged state rather than a bare `Option` so an
/// unset limit cannot be confused with a limit of zero anywhere in the
/// decision path. On the wire and in storage, unlimited is `null`/absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    Unlimited,
    AtMost(i64),
}

impl Limit {
    /// Map a nullable storage column to a limit. NULL means unlimited.
    pub fn from_column(value: Option<i64>) -> Self {
        match value {
            Some(n) => Limit::AtMost(n),
            None => Limit::Unlimited,
        }
    }

    pub fn as_column(&self) -> Option<i64> {
        match self {
            Limit::Unlimited => None,
            Limit::AtMost(n) => Some(*n),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Unlimited => serializer.serialize_none(),
            Limit::AtMost(n) => serializer.serialize_some(n),
        }
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Limit::from_column(Option::<i64>::deserialize(deserializer)?))
    }
}

/// Per-plan resource ceilings.
///
/// Field names match the plan documents produced by the billing side
/// (`maxStaff`, `maxOrdersPerMonth`). A missing field deserializes to
/// [`Limit::Unlimited`] via `#[serde(default)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanLimits {
    #[serde(default, rename = "maxStaff")]
    pub max_staff: Limit,
    #[serde(default, rename = "maxOrdersPerMonth")]
    pub max_orders_per_month: Limit,
}

/// A subscription tier. Shared by many tenants; treated as immutable for the
/// duration of one admission decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub limits: PlanLimits,
}
