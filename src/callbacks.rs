//! Status notifications emitted by the sync engine
//!
//! The engine reports `(level, message)` events to a `StatusSink`. How they are
//! shown is up to the host: closures implement the trait directly, and
//! `DeferredStatus` renders them on a tokio task after a fixed delay.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Severity of a status event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
	Info,
	Warn,
	Error,
}

impl std::fmt::Display for StatusLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			StatusLevel::Info => write!(f, "info"),
			StatusLevel::Warn => write!(f, "warn"),
			StatusLevel::Error => write!(f, "error"),
		}
	}
}

/// Human-readable status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
	pub level: StatusLevel,
	pub message: String,
}

impl StatusEvent {
	pub fn info(message: impl Into<String>) -> Self {
		StatusEvent { level: StatusLevel::Info, message: message.into() }
	}

	pub fn warn(message: impl Into<String>) -> Self {
		StatusEvent { level: StatusLevel::Warn, message: message.into() }
	}

	pub fn error(message: impl Into<String>) -> Self {
		StatusEvent { level: StatusLevel::Error, message: message.into() }
	}
}

/// Receiver of status events; must not block the caller
pub trait StatusSink: Send + Sync {
	fn notify(&self, event: StatusEvent);
}

impl<T: Fn(StatusEvent) + Send + Sync> StatusSink for T {
	fn notify(&self, event: StatusEvent) {
		self(event);
	}
}

/// Sink that drops every event
pub struct NoStatus;

impl StatusSink for NoStatus {
	fn notify(&self, _event: StatusEvent) {}
}

/// Sink that queues events for a delayed renderer task
///
/// Each event is rendered `delay` after it was queued, in queue order. The
/// engine queues a copy notification only after the copy finished, so a
/// message never shows up before its file is in place.
#[derive(Clone)]
pub struct DeferredStatus {
	delay: Duration,
	tx: mpsc::UnboundedSender<(Instant, StatusEvent)>,
}

impl DeferredStatus {
	/// Spawn the renderer on the current tokio runtime
	///
	/// The task finishes once every `DeferredStatus` clone is dropped and the
	/// queue is drained; await the handle to flush pending messages.
	pub fn spawn<F>(delay: Duration, render: F) -> (Self, JoinHandle<()>)
	where
		F: Fn(StatusEvent) + Send + 'static,
	{
		let (tx, mut rx) = mpsc::unbounded_channel::<(Instant, StatusEvent)>();
		let handle = tokio::spawn(async move {
			while let Some((due, event)) = rx.recv().await {
				tokio::time::sleep_until(due).await;
				render(event);
			}
		});
		(DeferredStatus { delay, tx }, handle)
	}
}

impl StatusSink for DeferredStatus {
	fn notify(&self, event: StatusEvent) {
		// Renderer gone means nobody is listening any more
		let _ = self.tx.send((Instant::now() + self.delay, event));
	}
}


// vim: ts=4
