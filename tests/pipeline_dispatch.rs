//! Dispatcher behavior under concurrency caps, fallback and partial failure.

use async_trait::async_trait;
use audioscribe::audio::extract::MockExtractor;
use audioscribe::error::AudioscribeError;
use audioscribe::pipeline::assembler::assemble;
use audioscribe::pipeline::dispatcher::Dispatcher;
use audioscribe::pipeline::planner::ChunkPlan;
use audioscribe::provider::transcriber::{
    MockProvider, SpeechProvider, TranscribeOptions, Transcription,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn ten_chunk_plan() -> ChunkPlan {
    ChunkPlan::build(100.0, 10.0, 0.0).unwrap()
}

fn as_providers(list: Vec<MockProvider>) -> Vec<Arc<dyn SpeechProvider>> {
    list.into_iter()
        .map(|p| Arc::new(p) as Arc<dyn SpeechProvider>)
        .collect()
}

/// Test provider that echoes segment content but refuses chunks whose
/// content contains a marker string.
struct RefusingProvider {
    name: String,
    refuse_marker: Option<String>,
}

impl RefusingProvider {
    fn refusing(name: &str, marker: &str) -> Self {
        Self {
            name: name.to_string(),
            refuse_marker: Some(marker.to_string()),
        }
    }
}

#[async_trait]
impl SpeechProvider for RefusingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        "test-whisper"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        _options: &TranscribeOptions,
    ) -> audioscribe::Result<Transcription> {
        let content = String::from_utf8_lossy(audio);
        if let Some(marker) = &self.refuse_marker
            && content.contains(marker.as_str())
        {
            return Err(AudioscribeError::Provider {
                provider: self.name.clone(),
                status: Some(500),
                message: format!("refusing {marker}"),
            });
        }
        Ok(Transcription {
            text: content.trim().to_string(),
            words: vec![],
        })
    }
}

/// Test provider that finishes later chunks first, to exercise out-of-order
/// completion. Parses the chunk index out of the mock segment content.
struct ReverseDelayProvider {
    total_chunks: usize,
}

#[async_trait]
impl SpeechProvider for ReverseDelayProvider {
    fn name(&self) -> &str {
        "reverse"
    }

    fn model(&self) -> &str {
        "test-whisper"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        _options: &TranscribeOptions,
    ) -> audioscribe::Result<Transcription> {
        let content = String::from_utf8_lossy(audio).trim().to_string();
        let index: usize = content
            .strip_prefix("segment-")
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);

        // Later chunks answer sooner
        let delay = (self.total_chunks - index) as u64 * 10;
        tokio::time::sleep(Duration::from_millis(delay)).await;

        Ok(Transcription {
            text: content,
            words: vec![],
        })
    }
}

#[tokio::test]
async fn concurrency_never_exceeds_the_cap() {
    let provider = MockProvider::new("groq")
        .with_echo()
        .with_delay(Duration::from_millis(40));
    let gauge = provider.clone();
    let dir = tempfile::tempdir().unwrap();

    let job = Dispatcher::new(3, Duration::from_secs(5))
        .dispatch(
            Path::new("book.mp3"),
            &ten_chunk_plan(),
            Arc::new(MockExtractor::new().with_temp_dir(dir.path())),
            &as_providers(vec![provider]),
            &TranscribeOptions::default(),
            100.0,
        )
        .await
        .unwrap();

    assert_eq!(job.completed_count, 10);
    assert_eq!(gauge.calls(), 10);
    assert!(
        gauge.max_in_flight() <= 3,
        "observed {} provider calls in flight under a cap of 3",
        gauge.max_in_flight()
    );
}

#[tokio::test]
async fn fallback_routes_every_chunk_to_the_second_provider() {
    let failing = MockProvider::new("groq").with_failure();
    let failing_gauge = failing.clone();
    let rescuing = MockProvider::new("openai").with_echo();
    let rescuing_gauge = rescuing.clone();
    let dir = tempfile::tempdir().unwrap();

    let job = Dispatcher::new(3, Duration::from_secs(5))
        .dispatch(
            Path::new("book.mp3"),
            &ten_chunk_plan(),
            Arc::new(MockExtractor::new().with_temp_dir(dir.path())),
            &as_providers(vec![failing, rescuing]),
            &TranscribeOptions::default(),
            100.0,
        )
        .await
        .unwrap();

    assert_eq!(job.failed_count, 0, "fallback must absorb primary failures");
    assert_eq!(job.completed_count, 10);
    assert_eq!(failing_gauge.calls(), 10);
    assert_eq!(rescuing_gauge.calls(), 10);
    for result in job.results.values() {
        assert_eq!(result.provider.as_deref(), Some("openai"));
    }
}

#[tokio::test]
async fn one_chunk_failing_all_providers_degrades_but_does_not_abort() {
    let primary = RefusingProvider::refusing("groq", "segment-4");
    let secondary = RefusingProvider::refusing("openai", "segment-4");
    let dir = tempfile::tempdir().unwrap();

    let job = Dispatcher::new(3, Duration::from_secs(5))
        .dispatch(
            Path::new("book.mp3"),
            &ten_chunk_plan(),
            Arc::new(MockExtractor::new().with_temp_dir(dir.path())),
            &[
                Arc::new(primary) as Arc<dyn SpeechProvider>,
                Arc::new(secondary) as Arc<dyn SpeechProvider>,
            ],
            &TranscribeOptions::default(),
            100.0,
        )
        .await
        .unwrap();

    assert_eq!(job.failed_count, 1);
    assert_eq!(job.completed_count, 9);

    let output = assemble(&job, "groq", "test-whisper", Duration::from_secs(1));
    assert_eq!(output.failed_count, 1);
    assert_eq!(output.chunks_processed, 9);
    assert!(!output.transcript.contains("segment-4"));
    for index in [0usize, 1, 2, 3, 5, 6, 7, 8, 9] {
        assert!(output.transcript.contains(&format!("segment-{index}")));
    }
}

#[tokio::test]
async fn assembly_is_invariant_to_completion_order() {
    let dir = tempfile::tempdir().unwrap();
    let plan = ChunkPlan::build(60.0, 10.0, 0.0).unwrap();

    // All six chunks run at once; completion order is reversed by the provider.
    let job = Dispatcher::new(6, Duration::from_secs(5))
        .dispatch(
            Path::new("book.mp3"),
            &plan,
            Arc::new(MockExtractor::new().with_temp_dir(dir.path())),
            &[Arc::new(ReverseDelayProvider { total_chunks: 6 }) as Arc<dyn SpeechProvider>],
            &TranscribeOptions::default(),
            60.0,
        )
        .await
        .unwrap();

    let output = assemble(&job, "reverse", "test-whisper", Duration::from_secs(1));
    let indices: Vec<usize> = output
        .transcript
        .split_whitespace()
        .filter_map(|piece| piece.strip_prefix("segment-"))
        .filter_map(|rest| rest.parse().ok())
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn timed_out_primary_falls_back_without_cancelling_siblings() {
    let slow = MockProvider::new("groq")
        .with_echo()
        .with_delay(Duration::from_secs(10));
    let quick = MockProvider::new("openai").with_echo();
    let dir = tempfile::tempdir().unwrap();
    let plan = ChunkPlan::build(30.0, 10.0, 0.0).unwrap();

    let job = Dispatcher::new(3, Duration::from_millis(100))
        .dispatch(
            Path::new("book.mp3"),
            &plan,
            Arc::new(MockExtractor::new().with_temp_dir(dir.path())),
            &as_providers(vec![slow, quick]),
            &TranscribeOptions::default(),
            30.0,
        )
        .await
        .unwrap();

    assert_eq!(job.failed_count, 0);
    assert_eq!(job.completed_count, 3);
    for result in job.results.values() {
        assert_eq!(result.provider.as_deref(), Some("openai"));
    }
}

#[tokio::test]
async fn temp_segments_are_gone_after_success_failure_and_timeout() {
    let dir = tempfile::tempdir().unwrap();

    // Chunk 2's extraction fails outright; chunk 4 fails on every provider;
    // the primary provider times out on everything else before the fallback
    // rescues it. Every path must clean its segment up.
    let slow = MockProvider::new("groq")
        .with_echo()
        .with_delay(Duration::from_secs(10));
    let picky = RefusingProvider::refusing("openai", "segment-4");

    let job = Dispatcher::new(3, Duration::from_millis(100))
        .dispatch(
            Path::new("book.mp3"),
            &ten_chunk_plan(),
            Arc::new(
                MockExtractor::new()
                    .with_temp_dir(dir.path())
                    .with_failure_on(2),
            ),
            &[
                Arc::new(slow) as Arc<dyn SpeechProvider>,
                Arc::new(picky) as Arc<dyn SpeechProvider>,
            ],
            &TranscribeOptions::default(),
            100.0,
        )
        .await
        .unwrap();

    assert_eq!(job.failed_count, 2);
    assert_eq!(job.completed_count, 8);
    assert_eq!(
        std::fs::read_dir(dir.path()).unwrap().count(),
        0,
        "every temporary segment must be deleted by job end"
    );
}

#[tokio::test]
async fn zero_available_providers_fail_before_spawning_work() {
    let dir = tempfile::tempdir().unwrap();

    let result = Dispatcher::new(3, Duration::from_secs(5))
        .dispatch(
            Path::new("book.mp3"),
            &ten_chunk_plan(),
            Arc::new(MockExtractor::new().with_temp_dir(dir.path())),
            &as_providers(vec![
                MockProvider::new("groq").with_unavailable(),
                MockProvider::new("openai").with_unavailable(),
            ]),
            &TranscribeOptions::default(),
            100.0,
        )
        .await;

    assert!(matches!(result, Err(AudioscribeError::NoProviderAvailable)));
    assert_eq!(
        std::fs::read_dir(dir.path()).unwrap().count(),
        0,
        "no segment may be extracted when no provider is available"
    );
}
