//! Coupled models: hierarchical composition and typed port couplings.
//!
//! A coupled model owns its children (atomic or coupled) and the coupling
//! edges among them and between itself and its children's boundary ports.
//! The tree is constructed once at simulation start and never mutated
//! afterwards; all structural validation (unknown components/ports, message
//! kind mismatches) happens here at construction time, so routing at runtime
//! is a fixed lookup.

use crate::devs::atomic::AtomicModel;
use crate::devs::coordinator::SimulationError;
use crate::devs::message::MessageKind;
use crate::devs::port::PortSpec;
use std::fmt;

/// One end of a coupling.
///
/// Direction is positional: as the `from` end, `Boundary` names one of the
/// enclosing model's *input* ports and `Child` names a child's *output*
/// port; as the `to` end, `Boundary` names an *output* port and `Child` an
/// *input* port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// A boundary port of the coupled model being built.
    Boundary(&'static str),
    /// A named child component's port.
    Child(&'static str, &'static str),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Boundary(port) => write!(f, "self.{}", port),
            Endpoint::Child(component, port) => write!(f, "{}.{}", component, port),
        }
    }
}

/// A directed, typed edge between two ports.
#[derive(Debug, Clone, Copy)]
pub struct Coupling {
    pub from: Endpoint,
    pub to: Endpoint,
    pub kind: MessageKind,
}

/// A node of the model tree.
pub enum Component {
    Atomic(Box<dyn AtomicModel>),
    Coupled(CoupledModel),
}

impl Component {
    /// Wrap a leaf model.
    pub fn atomic(model: impl AtomicModel + 'static) -> Self {
        Component::Atomic(Box::new(model))
    }

    pub fn name(&self) -> &str {
        match self {
            Component::Atomic(model) => model.name(),
            Component::Coupled(coupled) => &coupled.name,
        }
    }

    fn find_input(&self, port: &str) -> Option<PortSpec> {
        match self {
            Component::Atomic(model) => {
                model.input_ports().iter().find(|p| p.name == port).copied()
            }
            Component::Coupled(coupled) => {
                coupled.input_ports.iter().find(|p| p.name == port).copied()
            }
        }
    }

    fn find_output(&self, port: &str) -> Option<PortSpec> {
        match self {
            Component::Atomic(model) => model
                .output_ports()
                .iter()
                .find(|p| p.name == port)
                .copied(),
            Component::Coupled(coupled) => coupled
                .output_ports
                .iter()
                .find(|p| p.name == port)
                .copied(),
        }
    }
}

impl From<CoupledModel> for Component {
    fn from(coupled: CoupledModel) -> Self {
        Component::Coupled(coupled)
    }
}

/// A composition of models connected by typed port couplings.
pub struct CoupledModel {
    pub(crate) name: String,
    pub(crate) components: Vec<Component>,
    pub(crate) input_ports: Vec<PortSpec>,
    pub(crate) output_ports: Vec<PortSpec>,
    pub(crate) couplings: Vec<Coupling>,
}

impl CoupledModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            couplings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a boundary input port (pass-through into the composition).
    pub fn add_in_port(&mut self, spec: PortSpec) {
        self.input_ports.push(spec);
    }

    /// Declare a boundary output port.
    pub fn add_out_port(&mut self, spec: PortSpec) {
        self.output_ports.push(spec);
    }

    /// Add a child component. Sibling names must be unique; couplings refer
    /// to children by name.
    pub fn add_component(&mut self, component: impl Into<Component>) -> Result<(), SimulationError> {
        let component = component.into();
        if self.components.iter().any(|c| c.name() == component.name()) {
            return Err(SimulationError::DuplicateComponent {
                model: self.name.clone(),
                component: component.name().to_string(),
            });
        }
        self.components.push(component);
        Ok(())
    }

    /// Add a coupling edge. The source and destination port kinds must match
    /// exactly. Fan-out is expressed by adding several couplings from the
    /// same source.
    pub fn add_coupling(&mut self, from: Endpoint, to: Endpoint) -> Result<(), SimulationError> {
        let source = self.resolve_source(from)?;
        let dest = self.resolve_dest(to)?;
        if source.kind != dest.kind {
            return Err(SimulationError::CouplingTypeMismatch {
                from: from.to_string(),
                to: to.to_string(),
                source_kind: source.kind,
                dest_kind: dest.kind,
            });
        }
        self.couplings.push(Coupling {
            from,
            to,
            kind: source.kind,
        });
        Ok(())
    }

    fn component(&self, name: &str) -> Result<&Component, SimulationError> {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| SimulationError::UnknownComponent {
                model: self.name.clone(),
                component: name.to_string(),
            })
    }

    /// A source is either one of our own boundary inputs or a child output.
    fn resolve_source(&self, endpoint: Endpoint) -> Result<PortSpec, SimulationError> {
        let spec = match endpoint {
            Endpoint::Boundary(port) => self.input_ports.iter().find(|p| p.name == port).copied(),
            Endpoint::Child(component, port) => self.component(component)?.find_output(port),
        };
        spec.ok_or_else(|| SimulationError::UnknownPort {
            model: self.name.clone(),
            port: endpoint.to_string(),
        })
    }

    /// A destination is either one of our own boundary outputs or a child
    /// input.
    fn resolve_dest(&self, endpoint: Endpoint) -> Result<PortSpec, SimulationError> {
        let spec = match endpoint {
            Endpoint::Boundary(port) => self.output_ports.iter().find(|p| p.name == port).copied(),
            Endpoint::Child(component, port) => self.component(component)?.find_input(port),
        };
        spec.ok_or_else(|| SimulationError::UnknownPort {
            model: self.name.clone(),
            port: endpoint.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devs::port::PortBags;

    /// Minimal atomic model for structural tests.
    struct Probe {
        name: String,
    }

    const PROBE_IN: [PortSpec; 1] = [PortSpec::new("price_in", MessageKind::Price)];
    const PROBE_OUT: [PortSpec; 1] = [PortSpec::new("order_out", MessageKind::Order)];

    impl AtomicModel for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        fn input_ports(&self) -> &'static [PortSpec] {
            &PROBE_IN
        }

        fn output_ports(&self) -> &'static [PortSpec] {
            &PROBE_OUT
        }

        fn time_advance(&self) -> f64 {
            f64::INFINITY
        }

        fn output(&self, _inputs: &PortBags, _outputs: &mut PortBags) {}

        fn internal_transition(&mut self) {}

        fn external_transition(&mut self, _elapsed: f64, _inputs: &PortBags) {}
    }

    fn probe(name: &str) -> Component {
        Component::atomic(Probe {
            name: name.to_string(),
        })
    }

    #[test]
    fn test_duplicate_component_rejected() {
        let mut model = CoupledModel::new("top");
        model.add_component(probe("a")).unwrap();
        let err = model.add_component(probe("a")).unwrap_err();
        assert!(matches!(err, SimulationError::DuplicateComponent { .. }));
    }

    #[test]
    fn test_coupling_type_mismatch_rejected() {
        let mut model = CoupledModel::new("top");
        model.add_component(probe("a")).unwrap();
        model.add_component(probe("b")).unwrap();
        // order_out is an Order port, price_in is a Price port
        let err = model
            .add_coupling(
                Endpoint::Child("a", "order_out"),
                Endpoint::Child("b", "price_in"),
            )
            .unwrap_err();
        assert!(matches!(err, SimulationError::CouplingTypeMismatch { .. }));
    }

    #[test]
    fn test_unknown_port_and_component() {
        let mut model = CoupledModel::new("top");
        model.add_component(probe("a")).unwrap();

        let err = model
            .add_coupling(
                Endpoint::Child("a", "nope"),
                Endpoint::Child("a", "price_in"),
            )
            .unwrap_err();
        assert!(matches!(err, SimulationError::UnknownPort { .. }));

        let err = model
            .add_coupling(
                Endpoint::Child("ghost", "order_out"),
                Endpoint::Child("a", "price_in"),
            )
            .unwrap_err();
        assert!(matches!(err, SimulationError::UnknownComponent { .. }));
    }

    #[test]
    fn test_boundary_direction_enforced() {
        let mut model = CoupledModel::new("top");
        model.add_in_port(PortSpec::new("ctl_in", MessageKind::Signal));
        model.add_component(probe("a")).unwrap();
        // An input boundary port is not a legal destination.
        let err = model
            .add_coupling(Endpoint::Child("a", "order_out"), Endpoint::Boundary("ctl_in"))
            .unwrap_err();
        assert!(matches!(err, SimulationError::UnknownPort { .. }));
    }

    #[test]
    fn test_boundary_pass_through_coupling() {
        let mut model = CoupledModel::new("top");
        model.add_in_port(PortSpec::new("price_feed", MessageKind::Price));
        model.add_component(probe("a")).unwrap();
        model
            .add_coupling(
                Endpoint::Boundary("price_feed"),
                Endpoint::Child("a", "price_in"),
            )
            .unwrap();
        assert_eq!(model.couplings.len(), 1);
        assert_eq!(model.couplings[0].kind, MessageKind::Price);
    }
}
