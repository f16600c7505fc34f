use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Entity kinds that can be queued for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    /// First-time creation of a travel order (the parent document).
    TravelOrder,
    TravelOrderDraft,
    PersonnelRoster,
    Report,
    Receipt,
    TravelOrderAssignment,
}

/// How a queued mutation reaches the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Create,
    Upsert,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::TravelOrder,
        DocumentKind::TravelOrderDraft,
        DocumentKind::PersonnelRoster,
        DocumentKind::Report,
        DocumentKind::Receipt,
        DocumentKind::TravelOrderAssignment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::TravelOrder => "TRAVEL_ORDER",
            DocumentKind::TravelOrderDraft => "TRAVEL_ORDER_DRAFT",
            DocumentKind::PersonnelRoster => "PERSONNEL_ROSTER",
            DocumentKind::Report => "REPORT",
            DocumentKind::Receipt => "RECEIPT",
            DocumentKind::TravelOrderAssignment => "TRAVEL_ORDER_ASSIGNMENT",
        }
    }

    pub fn delivery(&self) -> DeliveryMode {
        match self {
            DocumentKind::TravelOrder => DeliveryMode::Create,
            DocumentKind::TravelOrderDraft
            | DocumentKind::PersonnelRoster
            | DocumentKind::Report
            | DocumentKind::Receipt
            | DocumentKind::TravelOrderAssignment => DeliveryMode::Upsert,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        DocumentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("Unknown document kind: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_travel_order_is_created() {
        for kind in DocumentKind::ALL {
            let expected = if kind == DocumentKind::TravelOrder {
                DeliveryMode::Create
            } else {
                DeliveryMode::Upsert
            };
            assert_eq!(kind.delivery(), expected, "{kind}");
        }
    }

    #[test]
    fn parses_wire_and_cli_spellings() {
        assert_eq!("REPORT".parse::<DocumentKind>(), Ok(DocumentKind::Report));
        assert_eq!(
            "travel-order-assignment".parse::<DocumentKind>(),
            Ok(DocumentKind::TravelOrderAssignment)
        );
        assert!("invoice".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&DocumentKind::PersonnelRoster).unwrap();
        assert_eq!(json, "\"PERSONNEL_ROSTER\"");
    }
}
