use std::sync::Arc;

use crate::{
    append_launcher_log,
    browser_host::UiControl,
    game_catalog::GameFamily,
    process_control::{ProcessLaunch, ProcessLauncher},
    property_store::PropertyStore,
    runtime_paths::LauncherPaths,
    termination_barrier::TerminationBarrier,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LaunchOutcome {
    UnknownToken,
    NotInstalled,
    InvalidArguments(String),
    /// Another launch already took the barrier.
    AlreadyTerminating,
    Launched { pid: u32 },
    /// The barrier stays taken; no further launch is attempted.
    SpawnFailed(String),
}

/// Turns a UI launch token into at most one game process per launcher
/// lifetime, then closes the UI.
pub(crate) struct LaunchCoordinator {
    paths: Arc<LauncherPaths>,
    barrier: Arc<TerminationBarrier>,
    properties: Arc<PropertyStore>,
    launcher: Arc<dyn ProcessLauncher>,
}

impl LaunchCoordinator {
    pub(crate) fn new(
        paths: Arc<LauncherPaths>,
        barrier: Arc<TerminationBarrier>,
        properties: Arc<PropertyStore>,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Self {
        Self {
            paths,
            barrier,
            properties,
            launcher,
        }
    }

    pub(crate) fn handle_launch_request(
        &self,
        family: &GameFamily,
        token: &str,
        ui: &dyn UiControl,
    ) -> LaunchOutcome {
        let Some(mapped_arg) = family.arg_mapping.resolve(token) else {
            append_launcher_log(&format!(
                "launch-{} ignored: unknown token '{token}'",
                family.id
            ));
            return LaunchOutcome::UnknownToken;
        };

        let Some(install_path) = self.properties.load(family.install_property) else {
            append_launcher_log(&format!(
                "launch-{} ignored: property '{}' is not set",
                family.id, family.install_property
            ));
            return LaunchOutcome::NotInstalled;
        };

        let launch = match ProcessLaunch::new(self.paths.game_executable(family.executable))
            .with_arg_line(mapped_arg)
        {
            Ok(launch) => launch.with_env(family.install_env, &install_path),
            Err(error) => {
                append_launcher_log(&format!("launch-{} ignored: {error}", family.id));
                return LaunchOutcome::InvalidArguments(error);
            }
        };

        if !self.barrier.try_acquire() {
            append_launcher_log(&format!(
                "launch-{} ignored: a launch is already in progress",
                family.id
            ));
            return LaunchOutcome::AlreadyTerminating;
        }

        let outcome = match self.launcher.launch_process(&launch) {
            Ok(pid) => {
                append_launcher_log(&format!(
                    "launched {:?} (pid {pid})",
                    launch.debug_command()
                ));
                LaunchOutcome::Launched { pid }
            }
            Err(error) => {
                append_launcher_log(&format!("launch-{} failed: {error}", family.id));
                LaunchOutcome::SpawnFailed(error)
            }
        };

        ui.close_browser();
        outcome
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingLauncher {
        pub(crate) launches: Mutex<Vec<ProcessLaunch>>,
        pub(crate) fail: bool,
    }

    impl RecordingLauncher {
        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub(crate) fn launch_count(&self) -> usize {
            self.launches.lock().expect("launches lock").len()
        }
    }

    impl ProcessLauncher for RecordingLauncher {
        fn launch_process(&self, launch: &ProcessLaunch) -> Result<u32, String> {
            self.launches
                .lock()
                .expect("launches lock")
                .push(launch.clone());
            if self.fail {
                Err("executable missing".to_string())
            } else {
                Ok(4242)
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingUi {
        pub(crate) closes: AtomicUsize,
        pub(crate) minimizes: AtomicUsize,
        pub(crate) shows: AtomicUsize,
        pub(crate) picked_folder: Option<String>,
    }

    impl RecordingUi {
        pub(crate) fn close_count(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }
    }

    impl UiControl for RecordingUi {
        fn close_browser(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }

        fn minimize_window(&self) {
            self.minimizes.fetch_add(1, Ordering::SeqCst);
        }

        fn show_window(&self) {
            self.shows.fetch_add(1, Ordering::SeqCst);
        }

        fn pick_folder(&self) -> Option<String> {
            self.picked_folder.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::{
        test_support::{RecordingLauncher, RecordingUi},
        *,
    };
    use crate::game_catalog::{ADVANCED_WARFARE, GHOSTS};

    struct Fixture {
        _dir: tempfile::TempDir,
        properties: Arc<PropertyStore>,
        launcher: Arc<RecordingLauncher>,
        coordinator: Arc<LaunchCoordinator>,
    }

    fn fixture_with(launcher: RecordingLauncher) -> Fixture {
        let dir = tempfile::tempdir().expect("create temp dir");
        let properties = Arc::new(PropertyStore::open(dir.path().join("properties.json")));
        let launcher = Arc::new(launcher);
        let coordinator = Arc::new(LaunchCoordinator::new(
            Arc::new(LauncherPaths::from_base(dir.path().to_path_buf())),
            Arc::new(TerminationBarrier::new()),
            Arc::clone(&properties),
            launcher.clone(),
        ));
        Fixture {
            _dir: dir,
            properties,
            launcher,
            coordinator,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingLauncher::default())
    }

    #[test]
    fn unknown_token_is_a_silent_no_op() {
        let fixture = fixture();
        fixture
            .properties
            .store("aw-install", "C:/AW")
            .expect("store install");
        let ui = RecordingUi::default();

        let outcome =
            fixture
                .coordinator
                .handle_launch_request(&ADVANCED_WARFARE, "unknown-token", &ui);

        assert_eq!(outcome, LaunchOutcome::UnknownToken);
        assert_eq!(fixture.launcher.launch_count(), 0);
        assert_eq!(ui.close_count(), 0);
    }

    #[test]
    fn missing_install_property_is_a_silent_no_op() {
        let fixture = fixture();
        let ui = RecordingUi::default();

        let outcome = fixture
            .coordinator
            .handle_launch_request(&GHOSTS, "ghosts-sp", &ui);

        assert_eq!(outcome, LaunchOutcome::NotInstalled);
        assert_eq!(fixture.launcher.launch_count(), 0);
        assert_eq!(ui.close_count(), 0);
    }

    #[test]
    fn launch_passes_mapped_arg_and_install_env_then_closes_ui() {
        let fixture = fixture();
        fixture
            .properties
            .store("aw-install", "C:/Games/AW")
            .expect("store install");
        let ui = RecordingUi::default();

        let outcome = fixture
            .coordinator
            .handle_launch_request(&ADVANCED_WARFARE, "aw-zm", &ui);

        assert_eq!(outcome, LaunchOutcome::Launched { pid: 4242 });
        assert_eq!(ui.close_count(), 1);
        let launches = fixture.launcher.launches.lock().expect("launches lock");
        let launch = &launches[0];
        assert!(launch.program.ends_with("data/s1x/s1x.exe"));
        assert_eq!(launch.args, vec!["-zombies"]);
        assert_eq!(
            launch.env,
            vec![("XLABS_AW_INSTALL".to_string(), "C:/Games/AW".to_string())]
        );
    }

    #[test]
    fn barrier_is_shared_across_families() {
        let fixture = fixture();
        fixture
            .properties
            .store("aw-install", "C:/AW")
            .expect("store aw");
        fixture
            .properties
            .store("ghosts-install", "C:/Ghosts")
            .expect("store ghosts");
        let ui = RecordingUi::default();

        let first = fixture
            .coordinator
            .handle_launch_request(&GHOSTS, "ghosts-mp", &ui);
        let second = fixture
            .coordinator
            .handle_launch_request(&ADVANCED_WARFARE, "aw-sp", &ui);

        assert_eq!(first, LaunchOutcome::Launched { pid: 4242 });
        assert_eq!(second, LaunchOutcome::AlreadyTerminating);
        assert_eq!(fixture.launcher.launch_count(), 1);
        assert_eq!(ui.close_count(), 1);
    }

    #[test]
    fn concurrent_requests_spawn_at_most_once() {
        let fixture = fixture();
        fixture
            .properties
            .store("aw-install", "C:/AW")
            .expect("store aw");
        fixture
            .properties
            .store("ghosts-install", "C:/Ghosts")
            .expect("store ghosts");
        let ui = Arc::new(RecordingUi::default());

        let handles: Vec<_> = (0..12)
            .map(|index| {
                let coordinator = Arc::clone(&fixture.coordinator);
                let ui = Arc::clone(&ui);
                thread::spawn(move || {
                    if index % 2 == 0 {
                        coordinator.handle_launch_request(&ADVANCED_WARFARE, "aw-mp", ui.as_ref())
                    } else {
                        coordinator.handle_launch_request(&GHOSTS, "ghosts-sp", ui.as_ref())
                    }
                })
            })
            .collect();
        let outcomes: Vec<LaunchOutcome> = handles
            .into_iter()
            .map(|handle| handle.join().expect("launch thread panicked"))
            .collect();

        let launched = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, LaunchOutcome::Launched { .. }))
            .count();
        assert_eq!(launched, 1);
        assert_eq!(fixture.launcher.launch_count(), 1);
        assert_eq!(ui.close_count(), 1);
    }

    #[test]
    fn failed_spawn_keeps_barrier_and_still_closes_ui() {
        let fixture = fixture_with(RecordingLauncher::failing());
        fixture
            .properties
            .store("aw-install", "C:/AW")
            .expect("store aw");
        let ui = RecordingUi::default();

        let first = fixture
            .coordinator
            .handle_launch_request(&ADVANCED_WARFARE, "aw-sp", &ui);
        let retry = fixture
            .coordinator
            .handle_launch_request(&ADVANCED_WARFARE, "aw-sp", &ui);

        assert_eq!(
            first,
            LaunchOutcome::SpawnFailed("executable missing".to_string())
        );
        assert_eq!(retry, LaunchOutcome::AlreadyTerminating);
        assert_eq!(fixture.launcher.launch_count(), 1);
        assert_eq!(ui.close_count(), 1);
    }
}
