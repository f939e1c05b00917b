//! Post Event Log
//!
//! JSONL file with one line per published post. Lines are numbered from 1
//! in the order posts are logged.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use feed_events::PostEvent;

use crate::content::Post;
use crate::simulation::Simulation;

/// Buffered JSONL writer for post events
pub struct EventLogger {
    sink: Option<BufWriter<File>>,
    written: u64,
}

impl EventLogger {
    /// Truncate `path` and log into it.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            sink: Some(BufWriter::new(File::create(path)?)),
            written: 0,
        })
    }

    /// Counts events without writing them anywhere.
    pub fn null() -> Self {
        Self {
            sink: None,
            written: 0,
        }
    }

    pub fn event_count(&self) -> u64 {
        self.written
    }

    /// Convert a published post and append it. Returns the record written.
    pub fn log_post(
        &mut self,
        sim: &Simulation,
        post: &Post,
        population_before: usize,
    ) -> std::io::Result<PostEvent> {
        let event = sim.post_event(post, self.written + 1, population_before);
        self.log(&event)?;
        Ok(event)
    }

    pub fn log(&mut self, event: &PostEvent) -> std::io::Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            writeln!(sink, "{}", event.to_jsonl()?)?;
        }
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "event log flush failed on drop");
        }
    }
}
