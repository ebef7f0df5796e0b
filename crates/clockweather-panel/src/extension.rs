//! The panel extension: everything between the host's enable and disable.
//!
//! `start()` wires two periodic timers (weather refresh and display
//! alternation) plus a settings watcher, renders the label once and kicks off
//! an immediate weather refresh. `stop()` tears all of it down and leaves the
//! host label showing a plain clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clockweather_core::{AppError, Config, Settings, SettingsStore};
use clockweather_weather::{HttpSession, Observation, WeatherCache, WeatherProvider};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::alternation::{Alternator, DisplayMode};
use crate::label::{clock_text, compose_text, LabelRenderer, PanelLabel, TransitionTiming};
use crate::timer::{self, FirstTick, TimerSlot};
use crate::updater::WeatherUpdater;

/// Host-side knobs for the extension
#[derive(Debug, Clone)]
pub struct ExtensionOptions {
    pub forecast_url: String,
    pub user_agent: String,
    pub request_timeout: Option<Duration>,
    pub weather_refresh: Duration,
    pub transition: TransitionTiming,
}

impl Default for ExtensionOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ExtensionOptions {
    fn from(config: &Config) -> Self {
        Self {
            forecast_url: config.api.forecast_url.clone(),
            user_agent: config.api.user_agent.clone(),
            request_timeout: config.api.request_timeout(),
            weather_refresh: config.panel.weather_refresh(),
            transition: TransitionTiming::from(&config.panel),
        }
    }
}

/// State shared by the alternation timer and the settings watcher
struct Display {
    settings: Arc<dyn SettingsStore>,
    cache: Arc<WeatherCache>,
    renderer: LabelRenderer,
    alternator: Mutex<Alternator>,
    switch_timer: Mutex<TimerSlot>,
    teardown: CancellationToken,
}

impl Display {
    fn current_text(&self) -> String {
        let mode = self.alternator.lock().mode();
        let show_clock_icon = self.settings.get().show_clock_icon;
        compose_text(mode, &self.cache.snapshot(), show_clock_icon, &Local::now())
    }

    fn advance(&self) {
        let mode = self.alternator.lock().flip();
        tracing::debug!(?mode, "Display mode flipped");
        self.renderer.slide_to(self.current_text());
    }

    /// (Re)arm the alternation timer with the interval currently stored.
    ///
    /// Does nothing once torn down. The check runs under the slot lock, which
    /// `stop()` also takes after cancelling, so a late watcher cannot re-arm.
    fn restart_switch_timer(self: &Arc<Self>) {
        let interval = self.settings.get().clamped_interval();
        let mut slot = self.switch_timer.lock();
        if self.teardown.is_cancelled() {
            return;
        }

        let display = Arc::clone(self);
        slot.replace(timer::every(
            Duration::from_secs(u64::from(interval)),
            FirstTick::AfterPeriod,
            move || {
                display.advance();
                std::future::ready(())
            },
        ));
        tracing::debug!(interval, "Alternation timer armed");
    }
}

struct Running {
    session: Arc<HttpSession>,
    cache: Arc<WeatherCache>,
    display: Arc<Display>,
    teardown: CancellationToken,
    weather_timer: TimerSlot,
    settings_watch: TimerSlot,
}

/// Clock/weather panel bound to a host label and settings store
pub struct ClockWeather {
    settings: Arc<dyn SettingsStore>,
    label: Arc<dyn PanelLabel>,
    options: ExtensionOptions,
    running: Mutex<Option<Running>>,
}

impl ClockWeather {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        label: Arc<dyn PanelLabel>,
        options: ExtensionOptions,
    ) -> Self {
        Self {
            settings,
            label,
            options,
            running: Mutex::new(None),
        }
    }

    /// Enable the panel. Must be called from within a tokio runtime.
    ///
    /// Calling it again while running does nothing.
    pub fn start(&self) -> Result<(), AppError> {
        let mut running = self.running.lock();
        if running.is_some() {
            tracing::debug!("Panel already running");
            return Ok(());
        }

        let session = Arc::new(HttpSession::with_options(
            &self.options.user_agent,
            self.options.request_timeout,
        )?);
        let teardown = CancellationToken::new();
        let cache = Arc::new(WeatherCache::new());

        let display = Arc::new(Display {
            settings: Arc::clone(&self.settings),
            cache: Arc::clone(&cache),
            renderer: LabelRenderer::new(
                Arc::clone(&self.label),
                self.options.transition,
                teardown.clone(),
            ),
            alternator: Mutex::new(Alternator::new()),
            switch_timer: Mutex::new(TimerSlot::new("alternation")),
            teardown: teardown.clone(),
        });
        display.renderer.show(&display.current_text());

        let updater = Arc::new(WeatherUpdater::new(
            Arc::clone(&self.settings),
            Arc::clone(&session),
            WeatherProvider::with_base_url(self.options.forecast_url.clone()),
            Arc::clone(&cache),
            teardown.clone(),
        ));
        let mut weather_timer = TimerSlot::new("weather-refresh");
        weather_timer.replace(timer::every(
            self.options.weather_refresh,
            FirstTick::Immediate,
            move || {
                let updater = Arc::clone(&updater);
                async move {
                    updater.update().await;
                }
            },
        ));

        // Subscribe before arming so an interval change in between is not lost
        let changes = self.settings.subscribe();
        display.restart_switch_timer();
        let mut settings_watch = TimerSlot::new("settings-watch");
        settings_watch.replace(watch_interval(Arc::clone(&display), changes));

        *running = Some(Running {
            session,
            cache,
            display,
            teardown,
            weather_timer,
            settings_watch,
        });
        tracing::info!("Clock/weather panel started");
        Ok(())
    }

    /// Disable the panel and restore the label to a plain clock.
    ///
    /// Safe to call any number of times.
    pub fn stop(&self) {
        let Some(mut running) = self.running.lock().take() else {
            return;
        };

        running.teardown.cancel();
        running.weather_timer.cancel();
        running.settings_watch.cancel();
        running.display.switch_timer.lock().cancel();
        running.session.abort();
        running.display.renderer.show(&clock_text(&Local::now(), false));

        tracing::info!("Clock/weather panel stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Current display mode, `None` while stopped
    pub fn display_mode(&self) -> Option<DisplayMode> {
        self.running
            .lock()
            .as_ref()
            .map(|r| r.display.alternator.lock().mode())
    }

    /// Cached weather, `None` while stopped
    pub fn weather(&self) -> Option<Observation> {
        self.running.lock().as_ref().map(|r| r.cache.snapshot())
    }
}

impl Drop for ClockWeather {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Restart the alternation timer whenever `interval-seconds` changes.
fn watch_interval(display: Arc<Display>, mut changes: watch::Receiver<Settings>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = changes.borrow_and_update().clamped_interval();
        while changes.changed().await.is_ok() {
            let next = changes.borrow_and_update().clamped_interval();
            if next != interval {
                tracing::info!(from = interval, to = next, "Switch interval changed, restarting timer");
                interval = next;
                display.restart_switch_timer();
            }
        }
    })
}
