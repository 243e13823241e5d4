//! Routing matrix: which source feeds each sink.

use std::fmt;

use h2u_platform::PipelineService;
use h2u_types::capability::{Capability, CapabilitySet};
use h2u_types::config::{PortLabels, RoutingDefaults};
use h2u_types::error::Result;
use h2u_types::video::{Sink, Source};

/// Result of a connect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The assignment was stored and the pipeline resynchronized.
    Connected { source: Source, sink: Sink },
    /// A block backing the source or sink is absent; nothing changed.
    Missing(Capability),
}

/// One row of the matrix listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub alias: &'static str,
    pub mnemonic: String,
    pub description: String,
}

/// Present sources and sinks with their connector labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixListing {
    pub sources: Vec<Endpoint>,
    pub sinks: Vec<Endpoint>,
}

impl fmt::Display for MatrixListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Video sources:")?;
        for ep in &self.sources {
            write_endpoint(f, ep)?;
        }
        writeln!(f, " ")?;
        writeln!(f, "Video sinks:")?;
        for ep in &self.sinks {
            write_endpoint(f, ep)?;
        }
        write!(f, " ")
    }
}

fn write_endpoint(f: &mut fmt::Formatter<'_>, ep: &Endpoint) -> fmt::Result {
    if ep.mnemonic.is_empty() {
        writeln!(f, "{} ({}):", ep.name, ep.alias)?;
    } else {
        writeln!(f, "{} ({}): {}", ep.name, ep.alias, ep.mnemonic)?;
    }
    if !ep.description.is_empty() {
        writeln!(f, "{}", ep.description)?;
    }
    Ok(())
}

/// Current source assignment per sink.
///
/// A present sink always holds a present source; absent sinks hold nothing.
#[derive(Debug, Clone)]
pub struct RoutingMatrix {
    caps: CapabilitySet,
    labels: PortLabels,
    assignments: [Option<Source>; 3],
}

impl RoutingMatrix {
    /// Build the matrix from the board's defaults.
    ///
    /// A default naming an absent source falls back to the pattern generator.
    pub fn new(caps: CapabilitySet, labels: PortLabels, defaults: &RoutingDefaults) -> Self {
        let mut assignments = [None; 3];
        for sink in Sink::ALL {
            if !caps.contains(sink.capability()) {
                continue;
            }
            let wanted = defaults.source_for(sink);
            let source = if source_present(&caps, wanted) {
                wanted
            } else {
                log::warn!("Default source {wanted} for {sink} is missing, using pattern");
                Source::Pattern
            };
            assignments[sink.index()] = Some(source);
        }
        Self {
            caps,
            labels,
            assignments,
        }
    }

    /// Program every present sink's mux from the stored assignments.
    pub fn program<P: PipelineService + ?Sized>(&self, pipeline: &mut P) -> Result<()> {
        for sink in Sink::ALL {
            if let Some(source) = self.source_of(sink) {
                pipeline.set_sink_source(sink, source)?;
            }
        }
        pipeline.resync()
    }

    /// Source currently assigned to `sink`, `None` if the sink is absent.
    pub fn source_of(&self, sink: Sink) -> Option<Source> {
        self.assignments[sink.index()]
    }

    /// Enumerate present sources and sinks.
    pub fn list(&self) -> MatrixListing {
        let sources = Source::ALL
            .into_iter()
            .filter(|&s| source_present(&self.caps, s))
            .map(|s| match s.input() {
                Some(ch) => {
                    let label = self.labels.input(ch);
                    endpoint(s.name(), s.alias(), &label.mnemonic, &label.description)
                },
                None => endpoint(s.name(), s.alias(), "", "  Video pattern"),
            })
            .collect();
        let sinks = Sink::ALL
            .into_iter()
            .filter(|&k| self.caps.contains(k.capability()))
            .map(|k| match k.output() {
                Some(ch) => {
                    let label = self.labels.output(ch);
                    endpoint(k.name(), k.alias(), &label.mnemonic, &label.description)
                },
                None => endpoint(k.name(), k.alias(), "", "  JPEG encoder (USB output)"),
            })
            .collect();
        MatrixListing { sources, sinks }
    }

    /// Assign `source` to `sink` and resynchronize the pipeline.
    ///
    /// The resync always follows a successful assignment immediately, so the
    /// caller observes a consistent pipeline when this returns.
    pub fn connect<P: PipelineService + ?Sized>(
        &mut self,
        source: Source,
        sink: Sink,
        pipeline: &mut P,
    ) -> Result<ConnectOutcome> {
        if !self.caps.contains(sink.capability()) {
            return Ok(ConnectOutcome::Missing(sink.capability()));
        }
        if let Some(cap) = source.capability()
            && !self.caps.contains(cap)
        {
            return Ok(ConnectOutcome::Missing(cap));
        }

        pipeline.set_sink_source(sink, source)?;
        self.assignments[sink.index()] = Some(source);
        pipeline.resync()?;
        log::info!("Routed {source} to {sink}");
        Ok(ConnectOutcome::Connected { source, sink })
    }
}

fn source_present(caps: &CapabilitySet, source: Source) -> bool {
    source.capability().is_none_or(|cap| caps.contains(cap))
}

fn endpoint(name: &'static str, alias: &'static str, mnemonic: &str, description: &str) -> Endpoint {
    Endpoint {
        name,
        alias,
        mnemonic: mnemonic.to_string(),
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h2u_platform::{BoardEvent, SimulatedBoard};
    use h2u_types::config::BoardConfig;

    fn caps(list: &[Capability]) -> CapabilitySet {
        list.iter().copied().collect()
    }

    fn matrix(c: CapabilitySet) -> RoutingMatrix {
        RoutingMatrix::new(c, PortLabels::default(), &RoutingDefaults::default())
    }

    fn board() -> SimulatedBoard {
        SimulatedBoard::with_manual_clock(&BoardConfig::default())
    }

    #[test]
    fn connect_present_sink() {
        let mut m = matrix(CapabilitySet::all());
        let mut b = board();
        let out = m.connect(Source::Input0, Sink::Output0, &mut b).unwrap();
        assert_eq!(
            out,
            ConnectOutcome::Connected {
                source: Source::Input0,
                sink: Sink::Output0
            }
        );
        assert_eq!(m.source_of(Sink::Output0), Some(Source::Input0));
        assert_eq!(b.sink_source(Sink::Output0), Some(Source::Input0));
        assert_eq!(b.events().last(), Some(&BoardEvent::Resync));
    }

    #[test]
    fn connect_missing_sink_changes_nothing() {
        let mut m = matrix(caps(&[Capability::HdmiIn0, Capability::HdmiOut1]));
        let mut b = board();
        let out = m.connect(Source::Input0, Sink::Output0, &mut b).unwrap();
        assert_eq!(out, ConnectOutcome::Missing(Capability::HdmiOut0));
        assert_eq!(m.source_of(Sink::Output0), None);
        assert!(b.events().is_empty());
    }

    #[test]
    fn connect_missing_source_changes_nothing() {
        let mut m = matrix(caps(&[Capability::HdmiIn0, Capability::HdmiOut0]));
        let mut b = board();
        let out = m.connect(Source::Input1, Sink::Output0, &mut b).unwrap();
        assert_eq!(out, ConnectOutcome::Missing(Capability::HdmiIn1));
        assert_eq!(m.source_of(Sink::Output0), Some(Source::Pattern));
        assert!(b.events().is_empty());
    }

    #[test]
    fn connect_is_idempotent() {
        let mut m = matrix(CapabilitySet::all());
        let mut b = board();
        m.connect(Source::Input1, Sink::Encoder, &mut b).unwrap();
        let first: Vec<BoardEvent> = b.events().to_vec();
        b.clear_events();
        m.connect(Source::Input1, Sink::Encoder, &mut b).unwrap();
        assert_eq!(b.events(), first.as_slice());
        assert_eq!(m.source_of(Sink::Encoder), Some(Source::Input1));
    }

    #[test]
    fn absent_default_source_falls_back_to_pattern() {
        let defaults = RoutingDefaults {
            output0: Source::Input1,
            ..RoutingDefaults::default()
        };
        let m = RoutingMatrix::new(
            caps(&[Capability::HdmiIn0, Capability::HdmiOut0]),
            PortLabels::default(),
            &defaults,
        );
        assert_eq!(m.source_of(Sink::Output0), Some(Source::Pattern));
        assert_eq!(m.source_of(Sink::Output1), None);
    }

    #[test]
    fn program_sets_present_sinks_then_resyncs() {
        let m = matrix(caps(&[Capability::HdmiOut1]));
        let mut b = board();
        m.program(&mut b).unwrap();
        assert_eq!(
            b.events(),
            &[
                BoardEvent::SinkSource {
                    sink: Sink::Output1,
                    source: Source::Pattern
                },
                BoardEvent::Resync
            ]
        );
    }

    #[test]
    fn listing_only_shows_present_blocks() {
        let m = matrix(caps(&[Capability::HdmiIn1, Capability::Encoder]));
        let listing = m.list();
        let names: Vec<&str> = listing.sources.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["input1", "pattern"]);
        let sinks: Vec<&str> = listing.sinks.iter().map(|e| e.name).collect();
        assert_eq!(sinks, vec!["encoder"]);
    }

    #[test]
    fn listing_text() {
        let m = matrix(caps(&[Capability::HdmiIn0, Capability::HdmiOut0]));
        let text = m.list().to_string();
        assert!(text.starts_with("Video sources:\ninput0 (0): TX1\n"));
        assert!(text.contains("pattern (p):\n  Video pattern\n \nVideo sinks:\n"));
        assert!(text.contains("output0 (0): RX1"));
        assert!(!text.contains("encoder"));
    }
}
