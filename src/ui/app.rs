use super::events::{Input, InputMultiplexer, KeySource};
use super::view::render;
use super::FrameSink;
use crate::art::{ArtSource, GlyphArt};
use crate::config::UiConfig;
use crate::spotify::PlaybackClient;
use crate::state::StateCache;
use anyhow::Result;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Interrupted,
}

/// The dashboard loop. Owns the cache, so every mutation happens on this one task.
pub struct App<C, A, K, S> {
    client: C,
    art: A,
    input: InputMultiplexer<K>,
    sink: S,
    cache: StateCache,
    tick_period: Duration,
    backoff: Duration,
}

impl<C, A, K, S> App<C, A, K, S>
where
    C: PlaybackClient,
    A: ArtSource,
    K: KeySource,
    S: FrameSink,
{
    pub fn new(client: C, art: A, keys: K, sink: S, ui: &UiConfig) -> Self {
        Self {
            client,
            art,
            input: InputMultiplexer::new(keys, ui.settle()),
            sink,
            cache: StateCache::new(),
            tick_period: ui.tick(),
            backoff: ui.backoff(),
        }
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run until Ctrl+C. A failing tick - error or panic - only costs a backoff.
    pub async fn run(&mut self) {
        info!("Dashboard loop started");

        loop {
            let result = AssertUnwindSafe(self.tick()).catch_unwind().await;
            match result {
                Ok(Ok(TickOutcome::Continue)) => sleep(self.tick_period).await,
                Ok(Ok(TickOutcome::Interrupted)) => {
                    info!("Interrupted, leaving dashboard");
                    break;
                }
                Ok(Err(e)) => {
                    warn!("Tick failed, backing off: {:#}", e);
                    sleep(self.backoff).await;
                }
                Err(_) => {
                    warn!("Tick panicked, backing off");
                    sleep(self.backoff).await;
                }
            }
        }
    }

    /// One pass: key -> fetch -> merge -> art -> render. No sleeping except the command settle.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let mut commanded = false;

        match self.input.poll()? {
            Some(Input::Interrupt) => return Ok(TickOutcome::Interrupted),
            Some(Input::Command(command)) => {
                let sink = &mut self.sink;
                self.input
                    .issue(command, &self.client, &mut self.cache, |cache| present(sink, cache))
                    .await?;
                commanded = true;
            }
            Some(Input::Ignored) | None => {}
        }

        if !commanded {
            self.cache.decay_status();
        }

        let latest = match self.client.query().await {
            Ok(latest) => latest,
            Err(e) => {
                debug!("Fetch failed, keeping last state: {}", e);
                None
            }
        };

        let merged = self.cache.merge(latest);
        if merged.needs_art_refresh {
            let art = match merged.artwork_url {
                Some(url) => self.art.convert(&url).await,
                None => GlyphArt::placeholder(),
            };
            self.cache.set_art(art);
        }

        present(&mut self.sink, &self.cache)?;
        Ok(TickOutcome::Continue)
    }
}

fn present<S: FrameSink>(sink: &mut S, cache: &StateCache) -> Result<()> {
    let view = render(cache.track(), cache.art(), cache.status(), cache.playback());
    sink.show(&view)
}
