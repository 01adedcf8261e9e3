//! Status vocabularies used by the ERP (order status, workcenter, ...).
//!
//! 値は外部システムから文字列で届くため、未知の値でもデシリアライズは失敗させない。
//! 語彙に無い値は `Other(String)` に入り、ルール側では「該当なし」として扱われる。

use std::fmt;

use serde::{Deserialize, Serialize};

/// SCREAMING_SNAKE_CASE の文字列語彙を enum として定義する
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// 語彙に無い値（受け取った文字列をそのまま保持）
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Other(value) => value.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($text => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Order lifecycle status.
    ///
    /// Canonical sequence: INTAKE → DESIGN_PENDING → DESIGN_APPROVAL →
    /// PRODUCTION_PLANNED → IN_PROGRESS → QC → PACKING → READY_FOR_DELIVERY →
    /// DELIVERED. BLOCKED can be entered from any production step.
    pub enum OrderStatus {
        Intake => "INTAKE",
        DesignPending => "DESIGN_PENDING",
        DesignApproval => "DESIGN_APPROVAL",
        ProductionPlanned => "PRODUCTION_PLANNED",
        InProgress => "IN_PROGRESS",
        Qc => "QC",
        Packing => "PACKING",
        ReadyForDelivery => "READY_FOR_DELIVERY",
        Delivered => "DELIVERED",
        Blocked => "BLOCKED",
    }
}

vocabulary! {
    /// Production workcenter, i.e. one stage of the production pipeline.
    pub enum Workcenter {
        Cutting => "CUTTING",
        Printing => "PRINTING",
        Sewing => "SEWING",
        Qc => "QC",
        Packing => "PACKING",
        Delivery => "DELIVERY",
    }
}

vocabulary! {
    /// Client approval state of an uploaded design asset.
    pub enum ApprovalStatus {
        PendingClientApproval => "PENDING_CLIENT_APPROVAL",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

vocabulary! {
    /// Severity of a quality alert.
    pub enum Severity {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}
