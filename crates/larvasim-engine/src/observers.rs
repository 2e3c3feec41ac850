//! Observers the engine attaches to the model.
//!
//! [`TracingObserver`] turns every notification into a `debug` event.
//! [`JsonLinesObserver`] records every notification as one JSON object per
//! line, suitable for offline trajectory analysis.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use larvasim_core::{ObserverError, ObserverSink};
use larvasim_types::StateNotification;
use tracing::debug;

/// Logs each notification at `debug` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ObserverSink for TracingObserver {
    fn on_state(&mut self, notification: StateNotification) -> Result<(), ObserverError> {
        debug!(
            time = notification.time,
            larva = ?notification.larva,
            behavior = %notification.behavior,
            head_x = notification.head.x,
            head_y = notification.head.y,
            velocity = notification.velocity,
            head_angle = notification.head_angle,
            "Larva state"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Writes one JSON line per notification.
///
/// A failed write is reported as [`ObserverError::Io`], which aborts the
/// step that produced the notification.
#[derive(Debug)]
pub struct JsonLinesObserver<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesObserver<W> {
    /// Wrap an arbitrary writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl JsonLinesObserver<BufWriter<File>> {
    /// Create (or truncate) the file at `path` and write to it through a
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ObserverSink for JsonLinesObserver<W> {
    fn on_state(&mut self, notification: StateNotification) -> Result<(), ObserverError> {
        serde_json::to_writer(&mut self.writer, &notification).map_err(std::io::Error::from)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn flush(&mut self) -> Result<(), ObserverError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use larvasim_core::{ModelError, SimulationModel};
    use larvasim_types::{BehaviorState, LarvaReport, OdorSource, Point2};

    use super::*;

    /// A writer that refuses every write.
    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn make_notification(time: f64) -> StateNotification {
        let report = LarvaReport {
            behavior: BehaviorState::CastLeft,
            head: Point2::new(1.0, 2.0),
            joint: Point2::new(0.0, 2.0),
            velocity: 0.5,
            head_angle: 0.25,
        };
        StateNotification::from_report(time, None, report, Point2::ORIGIN)
    }

    #[test]
    fn writes_one_line_per_notification() {
        let mut buffer = Vec::new();
        let mut observer = JsonLinesObserver::new(&mut buffer);
        observer.on_state(make_notification(0.0)).unwrap();
        observer.on_state(make_notification(0.1)).unwrap();
        observer.flush().unwrap();
        drop(observer);

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: StateNotification = serde_json::from_str(lines.first().unwrap()).unwrap();
        assert_eq!(first, make_notification(0.0));
        let value: serde_json::Value = serde_json::from_str(lines.get(1).unwrap()).unwrap();
        assert_eq!(value["behavior"], "cast_left");
        assert_eq!(value["time"], 0.1);
    }

    #[test]
    fn write_failure_is_io_error() {
        let mut observer = JsonLinesObserver::new(BrokenWriter);
        let result = observer.on_state(make_notification(0.0));
        assert!(matches!(result, Err(ObserverError::Io { .. })));
    }

    #[test]
    fn write_failure_aborts_model_notify() {
        let mut model = SimulationModel::new(0.1, OdorSource::default()).unwrap();
        model.attach(JsonLinesObserver::new(BrokenWriter));
        let result = model.notify(LarvaReport::default());
        assert!(matches!(
            result,
            Err(ModelError::ObserverBroadcast { index: 0, ref observer, .. }) if observer == "jsonl"
        ));
        assert_eq!(model.time(), 0.0);
    }

    #[test]
    fn tracing_observer_accepts_everything() {
        let mut observer = TracingObserver;
        assert!(observer.on_state(make_notification(0.0)).is_ok());
        assert_eq!(observer.name(), "tracing");
    }
}
