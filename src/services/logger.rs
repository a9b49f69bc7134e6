use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn from_env() -> Self {
        match std::env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    fn rank(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
        }
    }

    fn allows(self, other: LogLevel) -> bool {
        other.rank() <= self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    error: u64,
    warn: u64,
    info: u64,
    debug: u64,
}

/// A log line kept in memory by a capturing logger.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub context: String,
    pub message: String,
    pub meta: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
    level: LogLevel,
    counters: Arc<Mutex<Counters>>,
    captured: Option<Arc<Mutex<Vec<LogEntry>>>>,
}

impl Logger {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
            level: LogLevel::from_env(),
            counters: Arc::new(Mutex::new(Counters::default())),
            captured: None,
        }
    }

    /// Logger that records every entry in memory instead of writing to stderr.
    pub fn capturing(context: &str) -> Self {
        Self {
            context: context.to_string(),
            level: LogLevel::Debug,
            counters: Arc::new(Mutex::new(Counters::default())),
            captured: Some(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    pub fn child(&self, suffix: &str) -> Self {
        let context = if suffix.is_empty() {
            self.context.clone()
        } else {
            format!("{}:{}", self.context, suffix)
        };
        Self {
            context,
            level: self.level,
            counters: self.counters.clone(),
            captured: self.captured.clone(),
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    fn log(&self, level: LogLevel, message: &str, meta: Option<&Value>) {
        if !self.level.allows(level) {
            return;
        }
        if let Ok(mut counters) = self.counters.lock() {
            match level {
                LogLevel::Error => counters.error += 1,
                LogLevel::Warn => counters.warn += 1,
                LogLevel::Info => counters.info += 1,
                LogLevel::Debug => counters.debug += 1,
            }
        }
        let meta = meta.filter(|m| !m.is_null());
        if let Some(captured) = &self.captured {
            if let Ok(mut entries) = captured.lock() {
                entries.push(LogEntry {
                    level,
                    context: self.context.clone(),
                    message: message.to_string(),
                    meta: meta.cloned(),
                });
            }
            return;
        }
        let timestamp = chrono::Utc::now().to_rfc3339();
        let meta_suffix = meta.map(|m| format!(" {}", m)).unwrap_or_default();
        eprintln!(
            "[{}] {} [{}] {}{}",
            timestamp,
            level.as_str(),
            self.context,
            message,
            meta_suffix
        );
    }

    pub fn error(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Error, message, meta);
    }

    pub fn warn(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Warn, message, meta);
    }

    pub fn info(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Info, message, meta);
    }

    pub fn debug(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Debug, message, meta);
    }

    /// Entries recorded so far; empty unless built with [`Logger::capturing`].
    pub fn entries(&self) -> Vec<LogEntry> {
        self.captured
            .as_ref()
            .and_then(|c| c.lock().ok().map(|entries| entries.clone()))
            .unwrap_or_default()
    }

    pub fn stats(&self) -> Value {
        let counters = self.counters.lock().unwrap_or_else(|err| err.into_inner());
        serde_json::json!({
            "level": format!("{:?}", self.level).to_lowercase(),
            "context": self.context,
            "error": counters.error,
            "warn": counters.warn,
            "info": counters.info,
            "debug": counters.debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capturing_logger_shares_entries_with_children() {
        let logger = Logger::capturing("root");
        let child = logger.child("auth");
        child.warn("no token", Some(&serde_json::json!({"strategy": "bearer"})));
        logger.info("done", None);

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[0].context, "root:auth");
        assert_eq!(entries[0].meta.as_ref().unwrap()["strategy"], "bearer");
        assert_eq!(entries[1].context, "root");
        assert_eq!(logger.stats()["warn"], 1);
    }

    #[test]
    fn level_filter_drops_verbose_entries() {
        let mut logger = Logger::capturing("root");
        logger.set_level(LogLevel::Warn);
        logger.debug("noise", None);
        logger.info("noise", None);
        logger.error("kept", None);
        assert_eq!(logger.entries().len(), 1);
        assert_eq!(logger.stats()["debug"], 0);
    }
}
