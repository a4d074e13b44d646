use super::fixture::{fast_config, happy_result, photo, sad_result, Fixture};
use crate::config::Config;
use crate::controller::core::SubmissionState;
use crate::error::{PredictError, NO_FILE_MESSAGE};
use crate::predictor::impl_fake::ScriptedOutcome;
use crate::preview::impl_memory::tests::png_bytes;
use crate::preview::interface::{PreviewHandle, PreviewStore};
use crate::selected_file::SelectedFile;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_success_is_revealed_after_nominal_duration() {
    let f = Fixture::new(
        fast_config(),
        vec![ScriptedOutcome {
            delay: Duration::from_millis(10),
            result: Ok(happy_result()),
        }],
    );
    f.controller.select_file(Some(photo()));

    let started = Instant::now();
    let submission = f.controller.submit().unwrap();
    let model = f.wait_for_terminal(TIMEOUT);
    let elapsed = started.elapsed();

    assert_eq!(model.state(), SubmissionState::Succeeded);
    assert_eq!(model.result(), Some(&happy_result()));
    assert_eq!(model.progress, 100);
    assert!(elapsed >= f.config.nominal_duration);
    assert_eq!(f.predictor.calls(), 1);

    let views = f.result_display.views();
    let progress: Vec<u8> = views
        .iter()
        .skip_while(|view| view.state != SubmissionState::InFlight)
        .map(|view| view.progress)
        .collect();
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(views
        .iter()
        .filter(|view| view.state == SubmissionState::Succeeded)
        .all(|view| view.progress == 100 && view.label.as_deref() == Some("Happy")));
    assert_eq!(submission.0, 1);
}

#[test]
fn test_failure_is_shown_without_waiting() {
    let config = Config {
        nominal_duration: Duration::from_secs(5),
        ..Config::default()
    };
    let f = Fixture::new(
        config,
        vec![ScriptedOutcome {
            delay: Duration::ZERO,
            result: Err(PredictError::Service("model unavailable".to_string())),
        }],
    );
    f.controller.select_file(Some(photo()));

    let started = Instant::now();
    f.controller.submit().unwrap();
    let model = f.wait_for_terminal(TIMEOUT);

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(model.state(), SubmissionState::Failed);
    assert_eq!(model.error_message(), Some("model unavailable"));
    assert_eq!(model.progress, 100);

    std::thread::sleep(Duration::from_millis(700));
    assert_eq!(f.controller.model(), model);
}

#[test]
fn test_submit_without_file_never_calls_service() {
    let f = Fixture::new(fast_config(), vec![]);

    let result = f.controller.submit();

    assert_eq!(result, Err(PredictError::Validation));
    let model = f.controller.model();
    assert_eq!(model.state(), SubmissionState::Idle);
    assert_eq!(model.notice.as_deref(), Some(NO_FILE_MESSAGE));

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(f.predictor.calls(), 0);
}

#[test]
fn test_latest_submission_wins() {
    let f = Fixture::new(
        fast_config(),
        vec![
            ScriptedOutcome {
                delay: Duration::from_millis(300),
                result: Ok(happy_result()),
            },
            ScriptedOutcome {
                delay: Duration::ZERO,
                result: Ok(sad_result()),
            },
        ],
    );
    f.controller.select_file(Some(photo()));

    let first = f.controller.submit().unwrap();
    let deadline = Instant::now() + TIMEOUT;
    while f.predictor.calls() < 1 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    let second = f.controller.submit().unwrap();
    assert_ne!(first, second);

    let model = f.wait_for_terminal(TIMEOUT);
    assert_eq!(model.result(), Some(&sad_result()));

    std::thread::sleep(Duration::from_millis(500));
    let model = f.controller.model();
    assert_eq!(model.state(), SubmissionState::Succeeded);
    assert_eq!(model.result(), Some(&sad_result()));
    assert_eq!(f.predictor.calls(), 2);
}

#[test]
fn test_reselecting_replaces_preview() {
    let f = Fixture::new(fast_config(), vec![]);

    f.controller.select_file(Some(photo()));
    let deadline = Instant::now() + TIMEOUT;
    while f.preview_store.get(PreviewHandle(1)).is_none() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(f.preview_store.get(PreviewHandle(1)).is_some());

    f.controller.select_file(Some(photo()));
    let deadline = Instant::now() + TIMEOUT;
    while (f.preview_store.get(PreviewHandle(1)).is_some()
        || f.preview_store.get(PreviewHandle(2)).is_none())
        && Instant::now() < deadline
    {
        std::thread::sleep(Duration::from_millis(1));
    }

    assert!(f.preview_store.get(PreviewHandle(1)).is_none());
    assert!(f.preview_store.get(PreviewHandle(2)).is_some());
    assert_eq!(f.controller.model().preview(), Some(PreviewHandle(2)));
}

#[test]
fn test_close_drops_late_response() {
    let f = Fixture::new(
        fast_config(),
        vec![ScriptedOutcome {
            delay: Duration::from_millis(100),
            result: Ok(happy_result()),
        }],
    );
    f.controller.select_file(Some(photo()));
    f.controller.submit().unwrap();

    f.controller.close();
    std::thread::sleep(Duration::from_millis(300));

    let model = f.controller.model();
    assert!(model.closed);
    assert_eq!(model.state(), SubmissionState::Idle);
    assert!(model.result().is_none());
}

#[test]
fn test_transitions_are_logged() {
    let f = Fixture::new(fast_config(), vec![]);

    f.controller.select_file(Some(photo()));

    let lines = f.logger.lines();
    assert!(lines
        .iter()
        .any(|line| line.starts_with("INFO controller:") && line.contains("FileSelected")));
    assert!(lines.iter().all(|line| !line.contains("137, 80, 78, 71")));
}

#[test]
fn test_quick_reselection_leaves_no_preview_behind() {
    let f = Fixture::new(fast_config(), vec![]);
    let large = SelectedFile::new("large.png", "image/png", png_bytes(1200, 1200));

    f.controller.select_file(Some(large.clone()));
    f.controller.select_file(Some(large));
    f.controller.select_file(None);

    std::thread::sleep(Duration::from_secs(3));

    assert_eq!(f.controller.model().preview(), None);
    assert_eq!(f.preview_store.len(), 0);
}
