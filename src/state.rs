use crate::client::{ScheduleApi, TrackerApi};
use crate::dashboard::{TimetableView, TrackerView};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub schedule_api: ScheduleApi,
    pub tracker_api: TrackerApi,
    pub timetable: Arc<Mutex<TimetableView>>,
    pub tracker: Arc<Mutex<TrackerView>>,
    /// Schedule generations in flight.
    loading: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(schedule_api: ScheduleApi, tracker_api: TrackerApi) -> Self {
        Self {
            schedule_api,
            tracker_api,
            timetable: Arc::new(Mutex::new(TimetableView::default())),
            tracker: Arc::new(Mutex::new(TrackerView::default())),
            loading: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Counts a schedule request as in flight until the guard is dropped.
    pub fn begin_loading(&self) -> LoadingGuard {
        self.loading.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            flag: Arc::clone(&self.loading),
        }
    }
}

pub struct LoadingGuard {
    flag: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    fn state() -> AppState {
        AppState::new(
            ScheduleApi::new(Client::new(), "http://127.0.0.1:9/api"),
            TrackerApi::new(Client::new(), "http://127.0.0.1:9/api"),
        )
    }

    #[test]
    fn loading_flag_clears_when_guard_drops() {
        let state = state();
        assert!(!state.is_loading());
        {
            let _guard = state.begin_loading();
            assert!(state.is_loading());
        }
        assert!(!state.is_loading());
    }

    #[test]
    fn overlapping_requests_keep_loading_until_the_last_finishes() {
        let state = state();
        let first = state.begin_loading();
        let second = state.begin_loading();

        drop(first);
        assert!(state.is_loading());
        drop(second);
        assert!(!state.is_loading());
    }

    #[test]
    fn loading_flag_clears_on_early_return() {
        fn failing(state: &AppState) -> Result<(), &'static str> {
            let _guard = state.begin_loading();
            let call: Result<(), &'static str> = Err("backend down");
            call?;
            Ok(())
        }

        let state = state();
        assert!(failing(&state).is_err());
        assert!(!state.is_loading());
    }
}
