//! Trailing-edge debounce over a watch channel.
//!
//! Every push overwrites the pending value and restarts the quiet period. The receiving side
//! yields only values that stayed unchanged for the whole interval, so a burst of pushes costs
//! one emission.

use std::time::Duration;

use tokio::sync::watch;

pub fn channel<T>(interval: Duration) -> (Debounced<T>, Debouncer<T>)
where
	T: Clone,
{
	let (tx, rx) = watch::channel(None);

	(Debounced { tx }, Debouncer { interval, rx })
}

#[derive(Debug)]
pub struct Debounced<T> {
	tx: watch::Sender<Option<T>>,
}
impl<T> Debounced<T> {
	pub fn push(&self, value: T) {
		self.tx.send_replace(Some(value));
	}
}

#[derive(Debug)]
pub struct Debouncer<T> {
	interval: Duration,
	rx: watch::Receiver<Option<T>>,
}
impl<T> Debouncer<T>
where
	T: Clone,
{
	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Waits for the next settled value.
	///
	/// Returns `None` once the sender is gone and nothing is pending. A value pushed right before
	/// the sender dropped is still delivered, without waiting out the interval.
	pub async fn settled(&mut self) -> Option<T> {
		self.rx.changed().await.ok()?;

		loop {
			tokio::select! {
				_ = tokio::time::sleep(self.interval) => {
					return self.rx.borrow_and_update().clone();
				},
				changed = self.rx.changed() => {
					if changed.is_err() {
						return self.rx.borrow_and_update().clone();
					}
				},
			}
		}
	}
}
