use log::warn;
use mpac_core::{Sink, SinkEvent};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Presentation options shared by the streaming commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub timestamps: bool,
    pub quiet: bool,
}

/// Writes events to the terminal: one line per message or unrecognized
/// byte on stdout, status notes on stderr.
#[derive(Debug)]
pub struct ConsoleSink {
    options: OutputOptions,
}

impl ConsoleSink {
    pub fn new(options: OutputOptions) -> Self {
        Self { options }
    }

    fn timestamp(&self) -> Option<String> {
        if !self.options.timestamps {
            return None;
        }
        OffsetDateTime::now_utc().format(&Rfc3339).ok()
    }

    fn json_line(&self, event: &SinkEvent) -> Option<String> {
        let mut value = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(err) => {
                warn!("event serialization failed: {err}");
                return None;
            }
        };
        if let (Some(ts), Some(object)) = (self.timestamp(), value.as_object_mut()) {
            object.insert("ts".to_string(), ts.into());
        }
        Some(value.to_string())
    }
}

impl Sink for ConsoleSink {
    fn emit(&mut self, event: SinkEvent) {
        if let SinkEvent::StatusNote(_) = event {
            if !self.options.quiet {
                eprintln!("{event}");
            }
            return;
        }
        if self.options.json {
            if let Some(line) = self.json_line(&event) {
                println!("{line}");
            }
            return;
        }
        match self.timestamp() {
            Some(ts) => println!("{ts}\t{event}"),
            None => println!("{event}"),
        }
    }
}
