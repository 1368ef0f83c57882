//! The poll loop: ensure link, read, decode, emit, at a fixed interval.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::connection::SensorLink;
use crate::error::Error;
use crate::payload;
use crate::sink::Sink;

/// Polls a [`SensorLink`] at a fixed interval and feeds the decoded readings
/// to a [`Sink`].
pub struct Poller<L: SensorLink> {
    link: L,
    interval: Duration,
}

impl<L: SensorLink> Poller<L> {
    pub fn new(link: L, interval: Duration) -> Self {
        Poller { link, interval }
    }

    /// Run until the shutdown future completes.
    ///
    /// The first tick fires immediately, later ticks at the configured
    /// interval. A failed tick is reported and the loop continues, except for
    /// errors that cannot heal (see [`Error::is_fatal`]). Shutdown is also
    /// observed while a tick is in flight, a long running connect or read
    /// gets dropped instead of delaying the exit. The link and the sink are
    /// released on every exit path.
    pub async fn run<S: Sink>(
        &mut self,
        sink: &mut S,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => break Ok(()),
                _ = ticker.tick() => {}
            }
            tokio::select! {
                _ = &mut shutdown => break Ok(()),
                tick = Self::tick(&mut self.link, sink) => match tick {
                    Ok(()) => {}
                    Err(err) if err.is_fatal() => break Err(err),
                    Err(err) => warn!("tick failed: {}", err),
                },
            }
        };

        info!("stopping");
        self.link.disconnect().await;
        match result {
            Ok(()) => Ok(sink.close()?),
            Err(err) => {
                // the tick error is the interesting one
                let _ = sink.close();
                Err(err)
            }
        }
    }

    async fn tick<S: Sink>(link: &mut L, sink: &mut S) -> Result<(), Error> {
        let raw = link.read_current().await?;
        let reading = payload::decode(&raw)?;
        sink.emit(&reading)?;
        Ok(())
    }
}
