//! Call-to-action route sets.
//!
//! An assessment ends with a button linking into the consuming product; the
//! web and native apps each accept a fixed set of destinations.

/// Routes accepted for `assessmentCTA.webRoute`.
pub const WEB_ROUTES: &[&str] = &["/assessments", "/coach", "/challenges"];

/// Routes accepted for `assessmentCTA.nativeRoute`.
pub const NATIVE_ROUTES: &[&str] = &[
    "/(tabs)/assessments",
    "/(tabs)/coach",
    "/(tabs)/life-hacks",
    "/(tabs)/challenges",
];

pub fn is_valid_web_route(route: &str) -> bool {
    WEB_ROUTES.contains(&route)
}

pub fn is_valid_native_route(route: &str) -> bool {
    NATIVE_ROUTES.contains(&route)
}
