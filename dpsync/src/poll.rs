use core::convert::Infallible;
use std::time::Instant;

use crate::{Device, Result, peripherals::Peripherals, session::Session, store::KvStore};

impl<S: Session, K: KvStore, P: Peripherals> Device<S, K, P> {
    /// Bring the session up, restore persisted state and queue a status report
    pub async fn start(&mut self) -> Result<()> {
        self.session.start().await?;

        if self.reset_guard.on_boot(&mut self.store, Instant::now()) {
            tracing::warn!("Rebooted too often in a row, dropping provisioning");
            self.session.reset_provisioning();
        }

        let state = self.report_status();
        self.peripherals.set_volume(state.volume);

        Ok(())
    }

    /// One turn of the loop: let the session make progress, then handle
    /// whatever it delivered
    pub async fn step(&mut self) {
        self.reset_guard.poll(&mut self.store, Instant::now());

        match self.session.poll().await {
            Ok(events) => {
                for event in events {
                    self.handle(event);
                }
            }
            Err(e) => tracing::warn!("Session poll failed: {e}"),
        }
    }

    pub async fn run(mut self) -> Infallible {
        loop {
            self.step().await;
        }
    }
}
