//! Core domain enums.
//!
//! The database stores all of these as lower-case `text`; `Display` and
//! `FromStr` are the only conversion path between the two.

use serde::{Deserialize, Serialize};

/// Declares a text-backed enum with `Display`, `FromStr` and an `ALL` list.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(format!("unknown {}: {other}", $what)),
                }
            }
        }
    };
}

pub(crate) use text_enum;

text_enum! {
    /// What a profile is allowed to do, independent of its organization scope.
    Role, "role" {
        Worker => "worker",
        SiteManager => "site_manager",
        /// Partner-company (customer) manager.
        CustomerManager => "customer_manager",
        Admin => "admin",
        SystemAdmin => "system_admin",
    }
}

impl Role {
    /// `admin` or `system_admin`.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SystemAdmin)
    }

    /// Any role that may approve or reject other people's work.
    pub fn is_manager(&self) -> bool {
        !matches!(self, Self::Worker)
    }
}

text_enum! {
    /// Lifecycle of a construction site.
    SiteStatus, "site status" {
        Active => "active",
        Suspended => "suspended",
        Completed => "completed",
    }
}

text_enum! {
    /// Where a document shows up in the document box.
    DocumentCategory, "document category" {
        /// Only visible to the owner (and admins).
        Personal => "personal",
        Shared => "shared",
        /// Paperwork every worker must submit.
        Required => "required",
        /// Annotated drawings.
        Markup => "markup",
    }
}

text_enum! {
    NotificationKind, "notification kind" {
        Info => "info",
        Approval => "approval",
        Payroll => "payroll",
        Document => "document",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), *role);
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn only_admin_roles_are_admin() {
        assert!(Role::Admin.is_admin());
        assert!(Role::SystemAdmin.is_admin());
        assert!(!Role::SiteManager.is_admin());
        assert!(Role::SiteManager.is_manager());
        assert!(!Role::Worker.is_manager());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::SiteManager).unwrap();
        assert_eq!(json, "\"site_manager\"");
        let back: DocumentCategory = serde_json::from_str("\"markup\"").unwrap();
        assert_eq!(back, DocumentCategory::Markup);
    }
}
