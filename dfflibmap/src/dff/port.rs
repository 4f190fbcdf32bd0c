// SPDX-License-Identifier: Apache-2.0

//! Pin roles and the per-cell port tables built by the matcher.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PinRole {
    Clock,
    Reset,
    Data,
    Output,
    /// Declared by the physical cell but not driven by the generic flop.
    Unused,
}

impl PinRole {
    /// The port on the generic `$_DFF_*` cell that carries this role.
    pub fn canonical_port(self) -> Option<&'static str> {
        match self {
            PinRole::Clock => Some("C"),
            PinRole::Reset => Some("R"),
            PinRole::Data => Some("D"),
            PinRole::Output => Some("Q"),
            PinRole::Unused => None,
        }
    }
}

/// A physical pin's role; `inverted` means the pin's active sense is the
/// complement of the canonical one and needs an inverter in front of (or, for
/// outputs, behind) it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRole {
    pub role: PinRole,
    pub inverted: bool,
}

impl PortRole {
    pub fn new(role: PinRole) -> Self {
        Self {
            role,
            inverted: false,
        }
    }

    pub fn unused() -> Self {
        Self::new(PinRole::Unused)
    }

    pub fn toggled(self) -> Self {
        Self {
            role: self.role,
            inverted: !self.inverted,
        }
    }
}

impl fmt::Display for PortRole {
    /// Renders the role as the generic port name, `~`-prefixed when inverted;
    /// unused pins render as nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(port) = self.role.canonical_port() else {
            return Ok(());
        };
        if self.inverted {
            write!(f, "~{}", port)
        } else {
            write!(f, "{}", port)
        }
    }
}

/// Physical pin name to role.
pub type PortTable = BTreeMap<String, PortRole>;

/// The physical cell chosen for a shape together with its pin assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMatch {
    pub cell_name: String,
    pub ports: PortTable,
}

impl CellMatch {
    /// Copy of this match with the `inverted` flag toggled on every port whose
    /// role is in `roles`.
    pub fn with_inverted_roles(&self, roles: &[PinRole]) -> CellMatch {
        let ports = self
            .ports
            .iter()
            .map(|(pin, port_role)| {
                let port_role = if roles.contains(&port_role.role) {
                    port_role.toggled()
                } else {
                    *port_role
                };
                (pin.clone(), port_role)
            })
            .collect();
        CellMatch {
            cell_name: self.cell_name.clone(),
            ports,
        }
    }

    /// Renders the pin assignment as `.PIN(role), ...`.
    pub fn port_list(&self) -> String {
        self.ports
            .iter()
            .map(|(pin, role)| format!(".{}({})", pin, role))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    fn sample() -> CellMatch {
        CellMatch {
            cell_name: "DFFRN".to_string(),
            ports: btreemap! {
                "CK".to_string() => PortRole::new(PinRole::Clock),
                "RN".to_string() => PortRole::new(PinRole::Reset),
                "D".to_string() => PortRole::new(PinRole::Data),
                "Q".to_string() => PortRole::new(PinRole::Output),
                "QN".to_string() => PortRole::unused(),
            },
        }
    }

    #[test]
    fn test_port_list_rendering() {
        let m = sample().with_inverted_roles(&[PinRole::Reset]);
        assert_eq!(m.port_list(), ".CK(C), .D(D), .Q(Q), .QN(), .RN(~R)");
    }

    #[test]
    fn test_inverting_touches_only_named_roles() {
        let original = sample();
        let flipped = original.with_inverted_roles(&[PinRole::Data, PinRole::Output]);
        for (pin, role) in &flipped.ports {
            let before = original.ports[pin];
            let expect_flip = matches!(role.role, PinRole::Data | PinRole::Output);
            assert_eq!(role.inverted, before.inverted ^ expect_flip, "pin {}", pin);
        }
        assert_eq!(flipped.with_inverted_roles(&[PinRole::Data, PinRole::Output]), original);
    }

    #[test]
    fn test_unused_has_no_canonical_port() {
        assert_eq!(PinRole::Unused.canonical_port(), None);
        assert_eq!(PortRole::unused().to_string(), "");
    }
}
