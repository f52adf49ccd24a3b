use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use super::{SearchInput, SearchState, SearchTicket, Submission, UnifiedSearch};
use crate::debounce::{self, Debounced};

/// Live search bound to a changing input.
///
/// Inputs are debounced, settled queries run on their own tasks so a slow request never blocks a
/// newer one, and only the newest query's results reach subscribers. Dropping the session stops
/// the driver; requests already in flight finish but cannot commit once superseded.
pub struct SearchSession {
	engine: Arc<UnifiedSearch>,
	input: Debounced<SearchTicket>,
	driver: JoinHandle<()>,
}
impl SearchSession {
	pub fn spawn(engine: Arc<UnifiedSearch>) -> Self {
		let (input, mut debouncer) = debounce::channel::<SearchTicket>(engine.debounce_interval());
		let driver_engine = engine.clone();
		let driver = tokio::spawn(async move {
			while let Some(ticket) = debouncer.settled().await {
				let engine = driver_engine.clone();

				tracing::debug!(seq = ticket.seq(), "Query settled.");
				tokio::spawn(async move {
					engine.execute(ticket).await;
				});
			}
		});

		Self { engine, input, driver }
	}

	pub fn update(&self, input: SearchInput) {
		if let Submission::Pending(ticket) = self.engine.submit(input) {
			self.input.push(ticket);
		}
	}

	pub fn subscribe(&self) -> watch::Receiver<SearchState> {
		self.engine.subscribe()
	}

	pub fn state(&self) -> SearchState {
		self.engine.state()
	}
}
impl Drop for SearchSession {
	fn drop(&mut self) {
		self.driver.abort();
	}
}
