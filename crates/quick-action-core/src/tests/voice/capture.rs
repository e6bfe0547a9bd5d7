use crate::{
    CoreError, CoreResult,
    voice::{
        NumberWords, SourceFactory, Transcriber, UtteranceSource, VoiceCapture,
        VoiceCaptureConfig, transcribe_with_fallback,
    },
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use error_location::ErrorLocation;

/// Transcriber answering from a fixed per-language script.
struct ScriptedTranscriber {
    primary: CoreResult<String>,
    fallback: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTranscriber {
    fn new(primary: CoreResult<String>, fallback: &str) -> Self {
        Self {
            primary,
            fallback: fallback.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Transcriber for ScriptedTranscriber {
    fn transcribe(&mut self, _samples: &[f32], language: &str) -> CoreResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(language.to_string());

        if language == "de" {
            match &self.primary {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(failure()),
            }
        } else {
            Ok(self.fallback.clone())
        }
    }
}

fn failure() -> CoreError {
    CoreError::TranscriptionFailed {
        source: "no speech recognised".into(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Source producing an utterance every few milliseconds until stopped.
struct TickingSource {
    interval: Duration,
}

impl UtteranceSource for TickingSource {
    fn next_utterance(
        &mut self,
        running: &AtomicBool,
        _timeout: Duration,
    ) -> CoreResult<Option<Vec<f32>>> {
        std::thread::sleep(self.interval);
        if running.load(Ordering::Acquire) {
            Ok(Some(vec![0.1; 160]))
        } else {
            Ok(None)
        }
    }
}

fn ticking_source(interval: Duration, opened: Arc<AtomicUsize>) -> SourceFactory {
    Arc::new(move || {
        opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TickingSource { interval }) as Box<dyn UtteranceSource>)
    })
}

fn config() -> VoiceCaptureConfig {
    VoiceCaptureConfig {
        primary_language: "de".to_string(),
        fallback_language: "en".to_string(),
        listen_timeout: Duration::from_millis(50),
    }
}

fn wait_until(deadline: Duration, condition: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// WHAT: A successful primary transcription is used as-is
/// WHY: The fallback language must only be tried when needed
#[test]
fn given_primary_succeeds_when_transcribing_then_fallback_not_called() {
    // Given: A transcriber that recognises German
    let mut transcriber = ScriptedTranscriber::new(Ok("licht an".to_string()), "light on");
    let calls = Arc::clone(&transcriber.calls);

    // When: Transcribing with German first
    let text = transcribe_with_fallback(&mut transcriber, &[0.0; 16], "de", "en");

    // Then: German text, one call
    assert_eq!(text.as_deref(), Some("licht an"));
    assert_eq!(*calls.lock().unwrap_or_else(|e| e.into_inner()), vec!["de"]);
}

/// WHAT: A failed or empty primary falls back to the secondary language
/// WHY: Mixed-language users speak commands in either language
#[test]
fn given_primary_fails_or_is_empty_when_transcribing_then_fallback_used() {
    // Given: One transcriber that errors in German, one that returns blank
    let mut failing = ScriptedTranscriber::new(Err(failure()), "open browser");
    let mut blank = ScriptedTranscriber::new(Ok("   ".to_string()), "open mail");

    // When/Then: Both fall back to English
    assert_eq!(
        transcribe_with_fallback(&mut failing, &[0.0; 16], "de", "en").as_deref(),
        Some("open browser")
    );
    assert_eq!(
        transcribe_with_fallback(&mut blank, &[0.0; 16], "de", "en").as_deref(),
        Some("open mail")
    );
}

/// WHAT: Failure in both languages yields no text
/// WHY: An unrecognised utterance is "no event", never an error
#[test]
fn given_both_languages_fail_when_transcribing_then_none() {
    // Given: German fails and English is blank
    let mut transcriber = ScriptedTranscriber::new(Err(failure()), "");

    // When: Transcribing
    let text = transcribe_with_fallback(&mut transcriber, &[0.0; 16], "de", "en");

    // Then: Nothing
    assert!(text.is_none());
}

/// WHAT: Transcripts are normalized and delivered to the callback
/// WHY: The coordinator receives digits, not number words
#[test]
#[allow(clippy::unwrap_used)]
fn given_running_capture_when_utterances_arrive_then_normalized_text_delivered() {
    // Given: A capture loop over a ticking source
    let opened = Arc::new(AtomicUsize::new(0));
    let mut capture = VoiceCapture::new(
        config(),
        NumberWords::default(),
        ticking_source(Duration::from_millis(5), Arc::clone(&opened)),
        Box::new(ScriptedTranscriber::new(Ok("lautstärke zwei".to_string()), "")),
    );
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);

    // When: Starting and waiting for a result
    capture
        .start(move |text| sink.lock().unwrap_or_else(|e| e.into_inner()).push(text))
        .unwrap();
    let delivered = wait_until(Duration::from_secs(2), || {
        !received.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    });
    capture.stop();

    // Then: Normalized German text arrived
    assert!(delivered);
    let received = received.lock().unwrap_or_else(|e| e.into_inner());
    assert_eq!(received[0], "lautstärke 2");
    assert_eq!(opened.load(Ordering::SeqCst), 1);
}

/// WHAT: No results are delivered after stop returns
/// WHY: A hidden surface must never receive late transcripts
#[test]
#[allow(clippy::unwrap_used)]
fn given_running_capture_when_stopped_then_no_further_results() {
    // Given: A running capture loop counting results
    let mut capture = VoiceCapture::new(
        config(),
        NumberWords::default(),
        ticking_source(Duration::from_millis(2), Arc::new(AtomicUsize::new(0))),
        Box::new(ScriptedTranscriber::new(Ok("eins".to_string()), "")),
    );
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    capture
        .start(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || count.load(Ordering::SeqCst) > 0));

    // When: Stopping
    capture.stop();
    let at_stop = count.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(50));

    // Then: The count is frozen and the loop reports not running
    assert_eq!(count.load(Ordering::SeqCst), at_stop);
    assert!(!capture.is_running());
}

/// WHAT: Starting while running replaces the loop instead of adding one
/// WHY: Two loops would race on the same microphone
#[test]
#[allow(clippy::unwrap_used)]
fn given_running_capture_when_started_again_then_previous_loop_replaced() {
    // Given: A running capture loop
    let opened = Arc::new(AtomicUsize::new(0));
    let mut capture = VoiceCapture::new(
        config(),
        NumberWords::default(),
        ticking_source(Duration::from_millis(5), Arc::clone(&opened)),
        Box::new(ScriptedTranscriber::new(Ok("drei".to_string()), "")),
    );
    let first = Arc::new(AtomicUsize::new(0));
    let first_counter = Arc::clone(&first);
    capture
        .start(move |_| {
            first_counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    // When: Starting again with a new callback
    let second = Arc::new(AtomicUsize::new(0));
    let second_counter = Arc::clone(&second);
    capture
        .start(move |_| {
            second_counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    let first_at_restart = first.load(Ordering::SeqCst);
    assert!(wait_until(Duration::from_secs(2), || second.load(Ordering::SeqCst) > 0));
    capture.stop();

    // Then: The first callback stopped receiving, the source was reopened once
    assert_eq!(first.load(Ordering::SeqCst), first_at_restart);
    assert_eq!(opened.load(Ordering::SeqCst), 2);
}

/// WHAT: A source that cannot open ends the loop without delivering
/// WHY: A missing microphone degrades to typing only
#[test]
#[allow(clippy::unwrap_used)]
fn given_unavailable_source_when_starting_then_loop_exits_and_can_restart() {
    // Given: A source factory that always fails
    let factory: SourceFactory = Arc::new(|| {
        Err(CoreError::NoMicrophoneFound {
            location: ErrorLocation::from(Location::caller()),
        })
    });
    let mut capture = VoiceCapture::new(
        config(),
        NumberWords::default(),
        factory,
        Box::new(ScriptedTranscriber::new(Ok("eins".to_string()), "")),
    );

    // When: Starting
    capture
        .start(|_| {})
        .unwrap();

    // Then: The loop winds down by itself, and start works again afterwards
    assert!(wait_until(Duration::from_secs(1), || !capture.is_running()));
    capture.stop();
    assert!(capture.start(|_| {}).is_ok());
    capture.stop();
}
