#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    use tokio::task::LocalSet;
    use tokio::time::sleep;

    use syntropic_grid::advisory::{Advisor, AdvisoryError, TextGenerator, ANALYZING_MESSAGE, FAILURE_MESSAGE};
    use syntropic_grid::clock::SystemClock;
    use syntropic_grid::log::LogRecorder;
    use syntropic_grid::runtime::SessionRuntime;
    use syntropic_grid::sampler::FixedSampler;
    use syntropic_grid::{GridConfig, GridSession, Operator, RunState};

    /// Replies after a per-call delay, in call order.
    struct Scripted {
        replies: RefCell<VecDeque<(Duration, Result<Option<String>, AdvisoryError>)>>,
        prompts: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<(Duration, Result<Option<String>, AdvisoryError>)>) -> Self {
            Self { replies: RefCell::new(replies.into()), prompts: RefCell::new(Vec::new()) }
        }
    }

    impl TextGenerator for Scripted {
        async fn generate(&self, prompt: &str) -> Result<Option<String>, AdvisoryError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            let next = self.replies.borrow_mut().pop_front();
            match next {
                Some((delay, reply)) => {
                    sleep(delay).await;
                    reply
                }
                None => Ok(None),
            }
        }
    }

    fn session() -> GridSession {
        GridSession::with_parts(
            &GridConfig::default(),
            Box::new(FixedSampler::quiet()),
            LogRecorder::seeded(3),
            Box::new(SystemClock),
        )
    }

    fn runtime(replies: Vec<(Duration, Result<Option<String>, AdvisoryError>)>) -> SessionRuntime<Scripted> {
        SessionRuntime::start(session(), Advisor::new(Scripted::new(replies)))
    }

    // ========== Timer ==========

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        LocalSet::new().run_until(async {
            let rt = runtime(vec![]);
            sleep(Duration::from_millis(3500)).await;
            assert_eq!(rt.session().tick_count(), 3);
            assert_eq!(rt.session().nodes()[0].latency_ms, 1.13);
            rt.shutdown();
        }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_cancels_timer_and_resume_does_not_replay() {
        LocalSet::new().run_until(async {
            let mut rt = runtime(vec![]);
            sleep(Duration::from_millis(2500)).await;
            assert_eq!(rt.session().tick_count(), 2);

            assert_eq!(rt.toggle_running(), RunState::Paused);
            sleep(Duration::from_secs(10)).await;
            assert_eq!(rt.session().tick_count(), 2, "ticked while paused");

            assert_eq!(rt.toggle_running(), RunState::Running);
            sleep(Duration::from_millis(900)).await;
            assert_eq!(rt.session().tick_count(), 2, "missed ticks replayed on resume");
            sleep(Duration::from_millis(200)).await;
            assert_eq!(rt.session().tick_count(), 3);
        }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_ticking() {
        LocalSet::new().run_until(async {
            let rt = runtime(vec![]);
            let mut updates = rt.subscribe();
            sleep(Duration::from_millis(1500)).await;
            assert!(updates.has_changed().unwrap());
            updates.borrow_and_update();
            rt.shutdown();
            sleep(Duration::from_secs(5)).await;
            // sender dropped with the runtime
            assert!(updates.changed().await.is_err());
        }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_change_waits_for_next_tick() {
        LocalSet::new().run_until(async {
            let rt = runtime(vec![]);
            sleep(Duration::from_millis(1100)).await;
            rt.set_traffic_load(100.0);
            assert_eq!(rt.session().nodes()[0].queue_depth, 1.3);
            sleep(Duration::from_millis(1000)).await;
            assert_eq!(rt.session().nodes()[0].queue_depth, 1.6);
        }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_owned_snapshot_survives_ticks() {
        LocalSet::new().run_until(async {
            let rt = runtime(vec![]);
            let held = rt.snapshot();
            sleep(Duration::from_millis(2500)).await;
            assert_eq!(held[0].latency_ms, 1.0);
            assert_eq!(rt.snapshot()[0].latency_ms, 1.13);
            assert_eq!(rt.summary().node_count, 9);
            assert_eq!(rt.session().tick_count(), 2);
        }).await;
    }

    // ========== Interventions ==========

    #[tokio::test(start_paused = true)]
    async fn test_intervention_publishes_snapshot() {
        LocalSet::new().run_until(async {
            let rt = runtime(vec![]);
            let mut updates = rt.subscribe();
            assert!(rt.apply_operator("n-02", Operator::R));
            assert!(updates.has_changed().unwrap());
            let snap = updates.borrow_and_update().clone();
            assert_eq!(snap[1].queue_depth, 0.0);
            assert_eq!(snap[1].last_operator, Operator::R);

            assert!(!rt.apply_operator("nope", Operator::C));
            assert!(!updates.has_changed().unwrap());
            assert_eq!(rt.session().logs().len(), 6);
        }).await;
    }

    // ========== Advisory ==========

    #[tokio::test(start_paused = true)]
    async fn test_analysis_runs_alongside_ticks() {
        LocalSet::new().run_until(async {
            let rt = runtime(vec![(Duration::from_millis(4200), Ok(Some("Hold steady.".into())))]);
            let handle = rt.request_analysis();
            assert!(rt.session().is_analyzing());
            assert_eq!(rt.session().analysis_text(), ANALYZING_MESSAGE);

            let text = handle.await.unwrap();
            assert_eq!(text, "Hold steady.");
            assert_eq!(rt.session().analysis_text(), "Hold steady.");
            assert!(!rt.session().is_analyzing());
            assert_eq!(rt.session().tick_count(), 4, "ticks stalled during analysis");

            // The prompt captured the snapshot at request time (pre-tick values).
            let prompts = rt_prompts(&rt);
            assert!(prompts[0].contains("\"syntropicPotential\": 43.27"));
        }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_completed_analysis_wins() {
        LocalSet::new().run_until(async {
            let rt = runtime(vec![
                (Duration::from_millis(3000), Ok(Some("slow".into()))),
                (Duration::from_millis(500), Ok(Some("fast".into()))),
            ]);
            let slow = rt.request_analysis();
            let fast = rt.request_analysis();

            assert_eq!(fast.await.unwrap(), "fast");
            assert_eq!(rt.session().analysis_text(), "fast");
            assert!(rt.session().is_analyzing());

            assert_eq!(slow.await.unwrap(), "slow");
            assert_eq!(rt.session().analysis_text(), "slow");
            assert!(!rt.session().is_analyzing());
        }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_analysis_shows_failure_string() {
        LocalSet::new().run_until(async {
            let rt = runtime(vec![(
                Duration::from_millis(10),
                Err(AdvisoryError::Status { status: 401, body: "bad key".into() }),
            )]);
            assert_eq!(rt.request_analysis().await.unwrap(), FAILURE_MESSAGE);
            assert_eq!(rt.session().analysis_text(), FAILURE_MESSAGE);
        }).await;
    }

    fn rt_prompts(rt: &SessionRuntime<Scripted>) -> Vec<String> {
        rt.advisor().generator().prompts.borrow().clone()
    }
}
