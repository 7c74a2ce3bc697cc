use chrono::Local;
use statum::{machine, state};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::controller::controller::{Controller, ControllerError, ControllerId, PollerSettings};
use crate::mapping::EventTranslator;

/// Outcome of a single tick
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub events: usize,
    /// Controllers dropped because their poll failed
    pub lost: Vec<ControllerId>,
}

/// Everything a tick touches, guarded by one lock
pub struct PollerCore {
    controllers: Vec<Box<dyn Controller>>,
    translator: EventTranslator,
}

impl PollerCore {
    pub fn new(translator: EventTranslator, controllers: Vec<Box<dyn Controller>>) -> Self {
        Self {
            controllers,
            translator,
        }
    }

    pub fn translator(&self) -> &EventTranslator {
        &self.translator
    }

    pub fn controller_ids(&self) -> Vec<ControllerId> {
        self.controllers.iter().map(|c| c.id()).collect()
    }

    /// Runs one polling cycle
    ///
    /// Armed continuous commands fire first, then every controller is polled
    /// and its queue drained in arrival order.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        self.translator.tick();

        let translator = &mut self.translator;
        self.controllers.retain_mut(|controller| {
            let id = controller.id();
            if !controller.poll() {
                warn!("Controller {} ({}) stopped responding, removing it", id, controller.name());
                translator.remove_controller(id);
                report.lost.push(id);
                return false;
            }

            for event in controller.drain_events() {
                report.events += 1;
                if let Err(e) = translator.on_event(id, &event) {
                    error!("Controller {} event {} could not be mapped: {}", id, event, e);
                }
            }
            true
        });

        report
    }

    /// Swaps in a new controller set, purging the entries of outgoing controllers
    pub fn replace_controllers(&mut self, controllers: Vec<Box<dyn Controller>>) {
        let incoming: Vec<ControllerId> = controllers.iter().map(|c| c.id()).collect();
        for old in &self.controllers {
            if !incoming.contains(&old.id()) {
                self.translator.remove_controller(old.id());
            }
        }
        for controller in &controllers {
            info!("Controller {} ({}) registered", controller.id(), controller.name());
        }
        self.controllers = controllers;
        info!("Polling {} controllers: {:?}", self.controllers.len(), incoming);
    }
}

/// Cloneable access to a poller's shared state
#[derive(Clone)]
pub struct PollerHandle {
    core: Arc<Mutex<PollerCore>>,
}

impl PollerHandle {
    /// Waits for any in-flight tick, then installs the new set
    pub async fn update_controllers(&self, controllers: Vec<Box<dyn Controller>>) {
        self.core.lock().await.replace_controllers(controllers);
    }

    pub async fn controller_ids(&self) -> Vec<ControllerId> {
        self.core.lock().await.controller_ids()
    }

    pub async fn active_count(&self) -> usize {
        self.core.lock().await.translator().active().len()
    }
}

// Define poller states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum PollerState {
    Idle,
    Running,
}

#[machine]
pub struct ControllerPoller<S: PollerState> {
    // Shared core, locked for a whole tick
    core: Arc<Mutex<PollerCore>>,

    settings: PollerSettings,

    // Cancels future ticks of the running task
    cancel: CancellationToken,

    task: Option<JoinHandle<()>>,
}

// Implementation of methods available in all states
impl<S: PollerState> ControllerPoller<S> {
    pub fn handle(&self) -> PollerHandle {
        PollerHandle {
            core: Arc::clone(&self.core),
        }
    }

    pub fn settings(&self) -> &PollerSettings {
        &self.settings
    }
}

impl ControllerPoller<Idle> {
    pub fn create(core: PollerCore, settings: Option<PollerSettings>) -> Self {
        let settings = settings.unwrap_or_default();
        info!("Creating Controller Poller with settings: {:?}", settings);
        Self::new(
            Arc::new(Mutex::new(core)),
            settings,
            CancellationToken::new(),
            None,
        )
    }

    pub fn start(mut self) -> ControllerPoller<Running> {
        // A cancelled token stays cancelled, every run gets a fresh one
        self.cancel = CancellationToken::new();

        info!("Spawning poller task");
        let task = tokio::spawn(run_poller_loop(
            Arc::clone(&self.core),
            self.settings.clone(),
            self.cancel.clone(),
        ));
        self.task = Some(task);
        self.transition()
    }
}

impl ControllerPoller<Running> {
    /// Prevents further ticks and waits for the task to wind down
    ///
    /// A tick already in progress runs to completion.
    pub async fn stop(mut self) -> Result<ControllerPoller<Idle>, ControllerError> {
        info!("Stopping poller");
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| ControllerError::TaskError(e.to_string()))?;
        }
        info!("Poller stopped");
        Ok(self.transition())
    }
}

async fn run_poller_loop(
    core: Arc<Mutex<PollerCore>>,
    settings: PollerSettings,
    cancel: CancellationToken,
) {
    let period = Duration::from_millis(settings.poll_interval_ms.max(1));
    info!("Starting poller loop with {}ms interval", period.as_millis());

    let mut interval_timer = tokio::time::interval_at(Instant::now() + period, period);
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Stats for performance monitoring
    let mut ticks: u64 = 0;
    let mut total_events: usize = 0;
    let mut last_stats_time = Local::now();
    let stats_interval = chrono::Duration::seconds(settings.stats_interval_secs);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval_timer.tick() => {}
        }

        let report = core.lock().await.tick();
        ticks += 1;
        total_events += report.events;
        if !report.lost.is_empty() {
            debug!("Tick lost controllers {:?}", report.lost);
        }

        let now = Local::now();
        if now - last_stats_time > stats_interval {
            let elapsed_seconds = (now - last_stats_time).num_seconds().max(1);
            info!(
                "Poller stats: {} ticks, {} events in {} seconds ({:.2} events/sec)",
                ticks,
                total_events,
                elapsed_seconds,
                total_events as f64 / elapsed_seconds as f64
            );
            ticks = 0;
            total_events = 0;
            last_stats_time = now;
        }
    }

    info!("Poller loop finished");
}
