//! Reporting surfaces
//!
//! Probing code pushes plain data here; the surface decides how it is
//! shown. [`ConsoleSurface`] prints formatted lines, [`MemorySurface`]
//! keeps everything for inspection.

use crate::{
    models::{ProbeOutcome, ProbeRecord},
    output::OutputFormatter,
    types::Region,
};
use std::io::{self, Write};
use std::sync::Mutex;

/// Receiver for probe results and user-facing notices
pub trait ReportingSurface: Send + Sync {
    /// A one-off or batch probe finished
    fn outcome(&self, region: &Region, outcome: &ProbeOutcome);

    /// The auto-ping log grew by one record
    fn record_appended(&self, record: &ProbeRecord);

    /// Non-fatal message for the user
    fn notice(&self, message: &str);
}

/// Prints formatted lines to a writer, stdout by default
pub struct ConsoleSurface {
    formatter: Box<dyn OutputFormatter>,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSurface {
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self::with_writer(formatter, Box::new(io::stdout()))
    }

    pub fn with_writer(formatter: Box<dyn OutputFormatter>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            formatter,
            writer: Mutex::new(writer),
        }
    }

    pub fn formatter(&self) -> &dyn OutputFormatter {
        self.formatter.as_ref()
    }

    /// Write one already formatted block
    pub fn print(&self, text: &str) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        // A closed stdout is not worth aborting a probe run for
        let _ = writeln!(writer, "{}", text);
        let _ = writer.flush();
    }

    fn print_formatted(&self, formatted: crate::Result<String>) {
        match formatted {
            Ok(text) => self.print(&text),
            Err(e) => eprintln!("{}", e),
        }
    }
}

impl ReportingSurface for ConsoleSurface {
    fn outcome(&self, region: &Region, outcome: &ProbeOutcome) {
        self.print_formatted(self.formatter.format_outcome(region, outcome));
    }

    fn record_appended(&self, record: &ProbeRecord) {
        self.print_formatted(self.formatter.format_record(record));
    }

    fn notice(&self, message: &str) {
        self.print_formatted(self.formatter.format_notice(message));
    }
}

/// Everything a [`MemorySurface`] was told, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Outcome(Region, ProbeOutcome),
    Record(ProbeRecord),
    Notice(String),
}

/// Surface that stores events instead of displaying them
#[derive(Debug, Default)]
pub struct MemorySurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Records received so far
    pub fn records(&self) -> Vec<ProbeRecord> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::Record(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::Notice(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SurfaceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ReportingSurface for MemorySurface {
    fn outcome(&self, region: &Region, outcome: &ProbeOutcome) {
        self.push(SurfaceEvent::Outcome(region.clone(), outcome.clone()));
    }

    fn record_appended(&self, record: &ProbeRecord) {
        self.push(SurfaceEvent::Record(record.clone()));
    }

    fn notice(&self, message: &str) {
        self.push(SurfaceEvent::Notice(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormatterFactory;
    use crate::types::FailureReason;
    use chrono::Utc;
    use std::sync::Arc;

    /// Writer whose contents stay readable after the surface takes it
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_console_surface_writes_lines() {
        let buffer = SharedBuffer::default();
        let surface = ConsoleSurface::with_writer(
            OutputFormatterFactory::create_plain_formatter(),
            Box::new(buffer.clone()),
        );

        surface.outcome(&Region::from("US West (Oregon)"), &ProbeOutcome::success(140));
        surface.record_appended(&ProbeRecord::new(
            Region::from("US West (Oregon)"),
            Utc::now(),
            ProbeOutcome::failure(FailureReason::TimedOut),
        ));
        surface.notice("Theme file unreadable, using light");

        let text = buffer.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("140 ms"));
        assert!(lines[1].ends_with("US West (Oregon) Failed: TimedOut"));
        assert_eq!(lines[2], "-- Theme file unreadable, using light");
    }

    #[test]
    fn test_memory_surface_keeps_order() {
        let surface = MemorySurface::new();
        surface.notice("first");
        surface.outcome(&Region::from("A"), &ProbeOutcome::Unmapped);
        surface.notice("second");

        assert_eq!(surface.notices(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(
            surface.events()[1],
            SurfaceEvent::Outcome(Region::from("A"), ProbeOutcome::Unmapped)
        );
        assert!(surface.records().is_empty());
    }
}
