//! Sample reference data installed on first boot.

/// (name, type, status)
pub const MACHINES: &[(&str, &str, &str)] = &[
    ("CNC-01", "CNC Milling Machine", "Operational"),
    ("PR-02", "Hydraulic Press", "Under maintenance"),
    ("EMB-03", "Packaging Line", "Broken"),
];

/// (name, role)
pub const USERS: &[(&str, &str)] = &[
    ("Ane Garcia", "technician"),
    ("Iker Martinez", "supervisor"),
    ("Leire Sanchez", "maintenance"),
];
