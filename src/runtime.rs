// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite - Native Session Runtime

//! Timer-driven session on a single-threaded tokio `LocalSet`.
//!
//! The session lives in an `Rc<RefCell<_>>` and is only touched from tasks
//! on the same thread, so ticks, interventions and advisory completions are
//! serialized without locks. Borrows are never held across an `.await`.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tokio::sync::watch;
use tokio::task::{spawn_local, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::advisory::{Advisor, TextGenerator};
use crate::driver::{RunState, Snapshot};
use crate::session::GridSession;
use crate::types::{GridSummary, Operator};

/// Owns the repeating tick task. Dropping it cancels the timer.
struct TickerHandle {
    task: JoinHandle<()>,
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct SessionRuntime<G: TextGenerator + 'static> {
    session: Rc<RefCell<GridSession>>,
    advisor: Rc<Advisor<G>>,
    updates: Rc<watch::Sender<Snapshot>>,
    ticker: Option<TickerHandle>,
}

impl<G: TextGenerator + 'static> SessionRuntime<G> {
    /// Must be called from within a `LocalSet`. Starts ticking right away if
    /// the session is running.
    pub fn start(session: GridSession, advisor: Advisor<G>) -> Self {
        let (tx, _rx) = watch::channel(session.snapshot());
        let mut rt = Self {
            session: Rc::new(RefCell::new(session)),
            advisor: Rc::new(advisor),
            updates: Rc::new(tx),
            ticker: None,
        };
        if rt.session.borrow().is_running() {
            rt.spawn_ticker();
        }
        rt
    }

    fn spawn_ticker(&mut self) {
        let session = Rc::clone(&self.session);
        let updates = Rc::clone(&self.updates);
        let period = session.borrow().tick_period();

        let Some(start) = Instant::now().checked_add(period) else {
            tracing::warn!(period_ms = period.as_millis() as u64, "tick period out of timer range; not ticking");
            return;
        };

        let task = spawn_local(async move {
            let mut interval = time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let next = session.borrow_mut().tick();
                if let Some(snapshot) = next {
                    updates.send_replace(snapshot);
                }
            }
        });
        self.ticker = Some(TickerHandle { task });
    }

    /// Shared borrow of the session.
    ///
    /// Drop the guard before any `.await`: the ticker and advisory tasks
    /// borrow the session mutably and panic if a guard is still alive.
    /// Prefer [`snapshot`](Self::snapshot) and [`summary`](Self::summary)
    /// when the value has to outlive the current step.
    pub fn session(&self) -> Ref<'_, GridSession> {
        self.session.borrow()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.borrow().snapshot()
    }

    pub fn summary(&self) -> GridSummary {
        self.session.borrow().summary()
    }

    pub fn advisor(&self) -> &Advisor<G> {
        &self.advisor
    }

    /// Receives every new snapshot (ticks and interventions).
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    pub fn run_state(&self) -> RunState {
        self.session.borrow().run_state()
    }

    /// Pausing cancels the pending timer; resuming starts a fresh one whose
    /// first tick lands a full period later.
    pub fn toggle_running(&mut self) -> RunState {
        let state = self.session.borrow_mut().toggle_running();
        match state {
            RunState::Running => self.spawn_ticker(),
            RunState::Paused => self.ticker = None,
        }
        state
    }

    pub fn set_traffic_load(&self, load: f64) {
        self.session.borrow_mut().set_traffic_load(load);
    }

    pub fn apply_operator(&self, node_id: &str, operator: Operator) -> bool {
        let (matched, snapshot) = {
            let mut session = self.session.borrow_mut();
            let matched = session.apply_operator(node_id, operator);
            (matched, session.snapshot())
        };
        if matched {
            self.updates.send_replace(snapshot);
        }
        matched
    }

    /// Send the current snapshot for analysis without blocking ticks.
    ///
    /// Several requests may be in flight; whichever finishes last owns the
    /// visible text. The handle yields the same text that was stored.
    pub fn request_analysis(&self) -> JoinHandle<String> {
        let request = self.session.borrow_mut().begin_analysis();
        let session = Rc::clone(&self.session);
        let advisor = Rc::clone(&self.advisor);
        spawn_local(async move {
            let text = advisor.analyze(&request.snapshot).await;
            session.borrow_mut().complete_analysis(request.id, text.clone());
            text
        })
    }

    /// Stop the timer. In-flight analyses keep running until they finish.
    pub fn shutdown(mut self) {
        self.ticker = None;
        tracing::info!(ticks = self.session.borrow().tick_count(), "grid runtime stopped");
    }
}
