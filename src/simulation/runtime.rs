//! Threaded runtime for the intersection actor
//!
//! The actor thread owns the [`Intersection`] and drains a message channel.
//! Each periodic task is a timer thread that sends its command on a fixed
//! period; dropping the timer's stop sender ends it at once.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::snapshot::Snapshot;
use super::types::SimTime;
use super::world::{Command, Intersection};

enum Message {
    Command(Command),
    Snapshot(Sender<Snapshot>),
    Shutdown,
}

/// Handle to a running intersection actor
pub struct IntersectionHandle {
    tx: Sender<Message>,
    actor: Option<JoinHandle<Intersection>>,
    timers: Vec<JoinHandle<()>>,
    stop: Vec<Sender<()>>,
}

/// Start the actor and its periodic tasks on background threads
pub fn spawn(intersection: Intersection) -> Result<IntersectionHandle> {
    let (tx, rx) = mpsc::channel();
    let config = intersection.config().clone();

    let actor = thread::Builder::new()
        .name("intersection-actor".into())
        .spawn(move || run_actor(intersection, rx))
        .context("Failed to spawn intersection actor thread")?;

    let mut handle = IntersectionHandle {
        tx,
        actor: Some(actor),
        timers: Vec::new(),
        stop: Vec::new(),
    };

    let periodic = [
        ("prune-sweep", config.prune_interval_ms, Command::PruneSweep),
        ("bridge-poll", config.ambulance_poll_interval_ms, Command::BridgePoll),
        ("scheduler", config.scheduler_tick_ms, Command::SchedulerTick),
    ];
    for (name, period_ms, command) in periodic {
        handle.spawn_timer(name, Duration::from_millis(period_ms.max(1)), command)?;
    }

    info!("Intersection runtime started");
    Ok(handle)
}

fn run_actor(mut intersection: Intersection, rx: Receiver<Message>) -> Intersection {
    let started = Instant::now();
    let base = intersection.now();

    for message in rx {
        intersection.set_time(elapsed_since(base, started));

        match message {
            Message::Command(command) => intersection.handle(command),
            Message::Snapshot(reply) => {
                // The requester may have given up waiting
                let _ = reply.send(intersection.snapshot());
            }
            Message::Shutdown => break,
        }
    }

    debug!("Intersection actor stopped at {}", intersection.now());
    intersection
}

impl IntersectionHandle {
    fn spawn_timer(&mut self, name: &str, period: Duration, command: Command) -> Result<()> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let tx = self.tx.clone();

        let timer = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tx.send(Message::Command(command)).is_err() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .with_context(|| format!("Failed to spawn {} timer thread", name))?;

        self.timers.push(timer);
        self.stop.push(stop_tx);
        Ok(())
    }

    /// Queue a command for the actor
    pub fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(Message::Command(command))
            .map_err(|_| anyhow!("Intersection actor has stopped"))
    }

    /// Ask the actor for a copy of its current state
    pub fn snapshot(&self) -> Result<Snapshot> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Message::Snapshot(reply_tx))
            .map_err(|_| anyhow!("Intersection actor has stopped"))?;
        reply_rx
            .recv()
            .context("Intersection actor stopped before answering")
    }

    /// Stop the timers and the actor, returning the final state
    pub fn shutdown(mut self) -> Result<Intersection> {
        self.stop_timers();
        self.tx
            .send(Message::Shutdown)
            .map_err(|_| anyhow!("Intersection actor has stopped"))?;

        let actor = self.actor.take().context("Intersection actor already joined")?;
        let intersection = actor
            .join()
            .map_err(|_| anyhow!("Intersection actor panicked"))?;
        info!("Intersection runtime stopped");
        Ok(intersection)
    }

    fn stop_timers(&mut self) {
        self.stop.clear();
        for timer in self.timers.drain(..) {
            let _ = timer.join();
        }
    }
}

impl Drop for IntersectionHandle {
    fn drop(&mut self) {
        self.stop_timers();
        if let Some(actor) = self.actor.take() {
            let _ = self.tx.send(Message::Shutdown);
            let _ = actor.join();
        }
    }
}

/// Logical time of an actor that started at `base`
fn elapsed_since(base: SimTime, started: Instant) -> SimTime {
    base.add_millis(started.elapsed().as_millis() as u64)
}
