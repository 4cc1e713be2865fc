//! Session lifecycle events delivered to the hosting application.

// self
use crate::{_prelude::*, error::AuthFailure};

/// Lifecycle transitions of the gateway's session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	/// A credential pair was stored after login.
	SignedIn,
	/// The credential pair was rotated by the refresh endpoint.
	Refreshed,
	/// The session ended involuntarily; the user must sign in again.
	Invalidated {
		/// Why the session could not be recovered.
		reason: AuthFailure,
		/// Sign-in entry point to redirect to.
		sign_in: Url,
	},
	/// The user signed out.
	SignedOut,
}
impl SessionEvent {
	/// Returns `true` for events after which no credential pair is stored.
	pub fn ends_session(&self) -> bool {
		matches!(self, Self::Invalidated { .. } | Self::SignedOut)
	}
}

/// Receiver for [`SessionEvent`]s.
///
/// Listeners run inline on the task that triggered the transition; hand work off to a channel
/// if it may block.
pub trait SessionListener
where
	Self: Send + Sync,
{
	/// Handles a single lifecycle event.
	fn on_session_event(&self, event: &SessionEvent);
}
impl<F> SessionListener for F
where
	F: Send + Sync + Fn(&SessionEvent),
{
	fn on_session_event(&self, event: &SessionEvent) {
		self(event)
	}
}

/// Listener that buffers every event it receives.
#[derive(Clone, Debug, Default)]
pub struct EventLog(Arc<Mutex<Vec<SessionEvent>>>);
impl EventLog {
	/// Returns a copy of the events observed so far.
	pub fn events(&self) -> Vec<SessionEvent> {
		self.0.lock().clone()
	}

	/// Drains the buffered events.
	pub fn take(&self) -> Vec<SessionEvent> {
		std::mem::take(&mut *self.0.lock())
	}
}
impl SessionListener for EventLog {
	fn on_session_event(&self, event: &SessionEvent) {
		self.0.lock().push(event.clone());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn closures_and_logs_receive_events() {
		let seen = Arc::new(Mutex::new(0_usize));
		let counter = {
			let seen = seen.clone();

			move |event: &SessionEvent| {
				if event.ends_session() {
					*seen.lock() += 1;
				}
			}
		};
		let log = EventLog::default();
		let sign_in = Url::parse("https://panel.example.com/sign-in")
			.expect("Sign-in fixture URL should parse.");
		let invalidated =
			SessionEvent::Invalidated { reason: AuthFailure::MissingRefreshToken, sign_in };

		for event in [SessionEvent::Refreshed, invalidated.clone(), SessionEvent::SignedOut] {
			counter.on_session_event(&event);
			log.on_session_event(&event);
		}

		assert_eq!(*seen.lock(), 2);
		assert_eq!(log.take(), vec![SessionEvent::Refreshed, invalidated, SessionEvent::SignedOut]);
		assert!(log.events().is_empty());
	}
}
