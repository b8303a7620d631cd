//! Admin detection from identity-provider claims.
//!
//! The identity provider does not have a single canonical admin flag; it may
//! appear as a top-level claim, a namespaced custom claim, inside app or
//! user metadata, or as a role. Checks run in a fixed order and the first
//! match is reported as the source.

use serde::Serialize;
use serde_json::Value;

/// Default namespace prefix for custom claims.
pub const DEFAULT_CLAIM_NAMESPACE: &str = "https://yourapp.com";

pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStatus {
    pub is_admin: bool,
    /// Which claim granted admin, e.g. `app_metadata.isAdmin`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
}

impl AdminStatus {
    fn granted(source: &'static str) -> Self {
        Self {
            is_admin: true,
            source: Some(source),
        }
    }

    fn denied() -> Self {
        Self {
            is_admin: false,
            source: None,
        }
    }
}

/// Determine whether the claims describe an admin, and why.
///
/// `namespace` prefixes custom claims (`<namespace>/admin`,
/// `<namespace>/roles`, `<namespace>/role`).
pub fn admin_status(claims: &Value, namespace: &str) -> AdminStatus {
    if !claims.is_object() {
        return AdminStatus::denied();
    }
    let custom = move |name: &str| claims.get(format!("{namespace}/{name}"));
    let is_true = |value: Option<&Value>| value.and_then(Value::as_bool) == Some(true);
    let is_admin_role = |value: Option<&Value>| value.and_then(Value::as_str) == Some(ROLE_ADMIN);

    let app_metadata = claims.get("app_metadata");
    let user_metadata = claims.get("user_metadata");

    let flag_checks: [(Option<&Value>, &'static str); 6] = [
        (claims.get("admin"), "user.admin"),
        (custom("admin"), "custom claim: admin"),
        (app_metadata.and_then(|m| m.get("admin")), "app_metadata.admin"),
        (app_metadata.and_then(|m| m.get("isAdmin")), "app_metadata.isAdmin"),
        (user_metadata.and_then(|m| m.get("admin")), "user_metadata.admin"),
        (user_metadata.and_then(|m| m.get("isAdmin")), "user_metadata.isAdmin"),
    ];
    if let Some((_, source)) = flag_checks.iter().find(|(value, _)| is_true(*value)) {
        return AdminStatus::granted(*source);
    }

    // The first truthy roles claim wins, even if it lacks "admin".
    let roles = [
        claims.get("roles"),
        custom("roles"),
        app_metadata.and_then(|m| m.get("roles")),
    ]
    .into_iter()
    .flatten()
    .find(|value| is_truthy(value));
    if let Some(Value::Array(roles)) = roles {
        if roles.iter().any(|role| role.as_str() == Some(ROLE_ADMIN)) {
            return AdminStatus::granted("roles array");
        }
    }

    if is_admin_role(claims.get("role")) {
        return AdminStatus::granted("user.role");
    }
    if is_admin_role(custom("role")) {
        return AdminStatus::granted("custom claim: role");
    }

    AdminStatus::denied()
}

pub fn is_admin(claims: &Value, namespace: &str) -> bool {
    admin_status(claims, namespace).is_admin
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
