use std::fmt;

/// Identifier of a gate, allocated by the netlist that owns it
///
/// Identifiers are only meaningful relative to their netlist: two netlists
/// may use the same identifier for unrelated gates.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default)]
pub struct GateId(u32);

impl GateId {
    /// Create an identifier from its raw index
    pub fn new(ind: u32) -> GateId {
        GateId(ind)
    }

    /// Obtain the raw index
    pub fn ind(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

impl fmt::Debug for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Condition under which a gate input is observed
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Default)]
pub enum Event {
    /// Value is used at any time
    #[default]
    Always,
    /// Rising edge
    Posedge,
    /// Falling edge
    Negedge,
    /// Active while low
    Level0,
    /// Active while high
    Level1,
}

/// Gate input: a driving gate together with the event that samples it
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default)]
pub struct Signal {
    event: Event,
    node: GateId,
}

impl Signal {
    /// Create a signal from an event and a driver
    pub fn new(event: Event, node: GateId) -> Signal {
        Signal { event, node }
    }

    /// Plain data signal
    pub fn always(node: GateId) -> Signal {
        Signal::new(Event::Always, node)
    }

    /// Rising-edge clock signal
    pub fn posedge(node: GateId) -> Signal {
        Signal::new(Event::Posedge, node)
    }

    /// Falling-edge clock signal
    pub fn negedge(node: GateId) -> Signal {
        Signal::new(Event::Negedge, node)
    }

    /// Active-low level signal
    pub fn level0(node: GateId) -> Signal {
        Signal::new(Event::Level0, node)
    }

    /// Active-high level signal
    pub fn level1(node: GateId) -> Signal {
        Signal::new(Event::Level1, node)
    }

    /// Event of the signal
    pub fn event(&self) -> Event {
        self.event
    }

    /// Driving gate
    pub fn node(&self) -> GateId {
        self.node
    }

    /// Returns whether the value is used at any time
    pub fn is_always(&self) -> bool {
        self.event == Event::Always
    }

    /// Same event, different driver
    pub fn with_node(&self, node: GateId) -> Signal {
        Signal::new(self.event, node)
    }
}

impl From<GateId> for Signal {
    fn from(node: GateId) -> Signal {
        Signal::always(node)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.event {
            Event::Always => write!(f, "{}", self.node),
            Event::Posedge => write!(f, "posedge({})", self.node),
            Event::Negedge => write!(f, "negedge({})", self.node),
            Event::Level0 => write!(f, "level0({})", self.node),
            Event::Level1 => write!(f, "level1({})", self.node),
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let g = GateId::new(3);
        assert_eq!(format!("{}", Signal::always(g)), "g3");
        assert_eq!(format!("{}", Signal::posedge(g)), "posedge(g3)");
        assert_eq!(format!("{}", Signal::level1(g)), "level1(g3)");
    }

    #[test]
    fn test_accessors() {
        let g = GateId::new(7);
        let s = Signal::negedge(g);
        assert_eq!(s.node(), g);
        assert_eq!(s.event(), Event::Negedge);
        assert!(!s.is_always());
        assert!(Signal::from(g).is_always());
        assert_eq!(s.with_node(GateId::new(2)), Signal::negedge(GateId::new(2)));
    }
}
