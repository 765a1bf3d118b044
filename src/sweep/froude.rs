//! Froude scaling and sweep case naming.

//─────────────────────────────────────────────────────────────────────────────

/// Standard gravity in m/s².
pub const GRAVITY: f64 = 9.81;

/// Inflow velocity for a Froude number: `V = Fr * sqrt(g * L)`.
pub fn velocity_from_froude(froude: f64, length: f64, gravity: f64) -> f64 {
    froude * (gravity * length).sqrt()
}

/// Froude number for an inflow velocity: `Fr = V / sqrt(g * L)`.
pub fn froude_from_velocity(velocity: f64, length: f64, gravity: f64) -> f64 {
    velocity / (gravity * length).sqrt()
}

/// Rounds to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Froude number in thousandths, e.g. 0.2 -> 200.
fn milli_froude(froude: f64) -> i64 {
    (froude * 1000.0).round() as i64
}

/// Sweep variant name, e.g. `dtc_esi_fr0200`.
pub fn sweep_case_name(base: &str, froude: f64) -> String {
    format!("{}_fr{:04}", base, milli_froude(froude))
}

/// ESI sweep variant name, e.g. `dtc_esi_fr200`.
pub fn esi_case_name(prefix: &str, froude: f64) -> String {
    format!("{}_fr{}", prefix, milli_froude(froude))
}
