use std::fs::{File, create_dir_all};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Log event types that determine which receivers should log the message
/// Ordered from the most detailed (one line per user arrival) to the least detailed (pass/fail)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogEvent {
    /// Per-arrival trace (arrival time, chosen drop, effective probability, outcome)
    Arrival,
    /// Single run summary (one policy, one seed)
    Run,
    /// Policy comparison tables and means across seeds
    Comparison,
    /// Scenario-level data (checks performed by a scenario)
    Scenario,
    /// Validation results (pass/fail messages)
    Validation,
}

impl LogEvent {
    const ALL: [LogEvent; 5] = [
        LogEvent::Arrival,
        LogEvent::Run,
        LogEvent::Comparison,
        LogEvent::Scenario,
        LogEvent::Validation,
    ];

    /// This event and every less detailed one
    fn upward(self) -> impl Iterator<Item = LogEvent> {
        Self::ALL.into_iter().filter(move |evt| *evt >= self)
    }
}

/// Trait for log receivers that can receive log messages
pub trait LogReceiver {
    /// Check if this receiver should handle the given log event
    fn should_log(&self, event: LogEvent) -> bool;

    /// Write a string to this receiver
    fn write(&mut self, s: &str) -> io::Result<()>;

    /// Flush this receiver
    fn flush(&mut self) -> io::Result<()>;
}

/// Console log receiver (writes to stdout)
pub struct ConsoleReceiver {
    enabled_events: Vec<LogEvent>,
}

impl ConsoleReceiver {
    /// Returns a boxed receiver ready to be added to a logger
    pub fn new(enabled_events: Vec<LogEvent>) -> Box<dyn LogReceiver> {
        Box::new(Self { enabled_events })
    }
}

impl LogReceiver for ConsoleReceiver {
    fn should_log(&self, event: LogEvent) -> bool {
        self.enabled_events.contains(&event)
    }

    fn write(&mut self, s: &str) -> io::Result<()> {
        print!("{}", s);
        io::stdout().flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// File log receiver (writes to a file)
pub struct FileReceiver {
    file: File,
    enabled_events: Vec<LogEvent>,
}

impl FileReceiver {
    /// Create a new file receiver that writes to the specified path
    /// The file is truncated if it exists and parent directories are created if needed
    pub fn new(path: &Path, enabled_events: Vec<LogEvent>) -> io::Result<Box<dyn LogReceiver>> {
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Box::new(Self { file, enabled_events }))
    }
}

impl LogReceiver for FileReceiver {
    fn should_log(&self, event: LogEvent) -> bool {
        self.enabled_events.contains(&event)
    }

    fn write(&mut self, s: &str) -> io::Result<()> {
        write!(self.file, "{}", s)?;
        self.file.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// In-memory receiver, the buffer is shared so the caller can read it back after logging
pub struct MemoryReceiver {
    buffer: Arc<Mutex<String>>,
    enabled_events: Vec<LogEvent>,
}

impl MemoryReceiver {
    /// Returns the boxed receiver together with a handle to its buffer
    pub fn new(enabled_events: Vec<LogEvent>) -> (Box<dyn LogReceiver>, Arc<Mutex<String>>) {
        let buffer = Arc::new(Mutex::new(String::new()));
        let receiver = Box::new(Self { buffer: Arc::clone(&buffer), enabled_events });
        (receiver, buffer)
    }
}

impl LogReceiver for MemoryReceiver {
    fn should_log(&self, event: LogEvent) -> bool {
        self.enabled_events.contains(&event)
    }

    fn write(&mut self, s: &str) -> io::Result<()> {
        match self.buffer.lock() {
            Ok(mut buffer) => {
                buffer.push_str(s);
                Ok(())
            }
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "memory log buffer poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Unique identifier for a receiver
pub type ReceiverId = usize;

/// Global counter for generating unique receiver IDs
static RECEIVER_ID_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Main logger that manages multiple receivers
pub struct Logger {
    receivers: Vec<(ReceiverId, Box<dyn LogReceiver>)>,
}

impl Logger {
    /// Create a new logger with no receivers
    pub fn new() -> Self {
        Self {
            receivers: Vec::new(),
        }
    }

    /// Add a receiver to the logger and return its unique ID
    pub fn add_receiver(&mut self, receiver: Box<dyn LogReceiver>) -> ReceiverId {
        let id = RECEIVER_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.receivers.push((id, receiver));
        id
    }

    /// Remove a receiver by its ID
    pub fn remove_receiver(&mut self, id: ReceiverId) {
        self.receivers.retain(|(receiver_id, _)| *receiver_id != id);
    }

    /// Whether any receiver listens to this event
    /// Used to skip formatting of per-arrival traces nobody will read
    pub fn is_enabled(&self, event: LogEvent) -> bool {
        self.receivers.iter().any(|(_, receiver)| receiver.should_log(event))
    }

    /// Write a message with a specific log event type
    pub fn log(&mut self, event: LogEvent, message: &str) -> io::Result<()> {
        for (_, receiver) in &mut self.receivers {
            if receiver.should_log(event) {
                receiver.write(message)?;
            }
        }
        Ok(())
    }

    /// Write a message with newline
    pub fn logln(&mut self, event: LogEvent, message: &str) -> io::Result<()> {
        self.log(event, &format!("{}\n", message))
    }

    /// Write a prefixed message with newline to the specified event and all upward events
    /// Hierarchy: Arrival -> Run -> Comparison -> Scenario -> Validation
    /// Each receiver receives the message only once, even if it listens to multiple events
    fn log_with_prefix(&mut self, event: LogEvent, prefix: &str, message: &str) -> io::Result<()> {
        let formatted_message = format!("{} {}\n", prefix, message);
        for (_, receiver) in &mut self.receivers {
            if event.upward().any(|evt| receiver.should_log(evt)) {
                receiver.write(&formatted_message)?;
            }
        }
        Ok(())
    }

    /// Write an "ERROR" prefixed message to the specified event and all upward events
    pub fn errln(&mut self, event: LogEvent, message: &str) -> io::Result<()> {
        self.log_with_prefix(event, "ERROR", message)
    }

    /// Write a "WARNING" prefixed message to the specified event and all upward events
    pub fn warnln(&mut self, event: LogEvent, message: &str) -> io::Result<()> {
        self.log_with_prefix(event, "WARNING", message)
    }

    /// Flush all receivers
    pub fn flush(&mut self) -> io::Result<()> {
        for (_, receiver) in &mut self.receivers {
            receiver.flush()?;
        }
        Ok(())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}


/// Sanitize a string to be used as a filename
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Macro to log a formatted string (like println! but for logger)
#[macro_export]
macro_rules! logln {
    ($logger:expr, $event:expr, $($arg:tt)*) => {
        {
            let _ = $logger.logln($event, &format!($($arg)*));
        }
    };
}

/// Macro to log a formatted string without newline (like print! but for logger)
#[macro_export]
macro_rules! log {
    ($logger:expr, $event:expr, $($arg:tt)*) => {
        {
            let _ = $logger.log($event, &format!($($arg)*));
        }
    };
}

/// Macro to log an ERROR line to the specified event and all upward events
#[macro_export]
macro_rules! errln {
    ($logger:expr, $event:expr, $($arg:tt)*) => {
        {
            let _ = $logger.errln($event, &format!($($arg)*));
        }
    };
}

/// Macro to log a WARNING line to the specified event and all upward events
#[macro_export]
macro_rules! warnln {
    ($logger:expr, $event:expr, $($arg:tt)*) => {
        {
            let _ = $logger.warnln($event, &format!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(buffer: &Arc<Mutex<String>>) -> String {
        buffer.lock().unwrap().clone()
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("stock scarcity"), "stock_scarcity");
        assert_eq!(sanitize_filename("runs/42"), "runs_42");
        assert_eq!(sanitize_filename("seed:7"), "seed_7");
    }

    #[test]
    fn test_log_only_reaches_subscribed_receivers() {
        let mut logger = Logger::new();
        let (run_receiver, run_buffer) = MemoryReceiver::new(vec![LogEvent::Run]);
        let (validation_receiver, validation_buffer) = MemoryReceiver::new(vec![LogEvent::Validation]);
        logger.add_receiver(run_receiver);
        logger.add_receiver(validation_receiver);

        logln!(&mut logger, LogEvent::Run, "views={}", 10);

        assert_eq!(read(&run_buffer), "views=10\n");
        assert_eq!(read(&validation_buffer), "");
    }

    #[test]
    fn test_errln_propagates_upward_once() {
        let mut logger = Logger::new();
        let (receiver, buffer) = MemoryReceiver::new(vec![LogEvent::Scenario, LogEvent::Validation]);
        let (arrival_receiver, arrival_buffer) = MemoryReceiver::new(vec![LogEvent::Arrival]);
        logger.add_receiver(receiver);
        logger.add_receiver(arrival_receiver);

        errln!(&mut logger, LogEvent::Run, "stock went negative");

        // Received once although subscribed to two upward events
        assert_eq!(read(&buffer), "ERROR stock went negative\n");
        // Arrival is below Run, so it is not part of the upward chain
        assert_eq!(read(&arrival_buffer), "");
    }

    #[test]
    fn test_removed_receiver_gets_nothing() {
        let mut logger = Logger::new();
        let (receiver, buffer) = MemoryReceiver::new(vec![LogEvent::Comparison]);
        let id = logger.add_receiver(receiver);
        assert!(logger.is_enabled(LogEvent::Comparison));

        logger.remove_receiver(id);
        warnln!(&mut logger, LogEvent::Comparison, "ignored");

        assert!(!logger.is_enabled(LogEvent::Comparison));
        assert_eq!(read(&buffer), "");
    }
}
