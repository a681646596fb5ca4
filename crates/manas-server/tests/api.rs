use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use manas_core::audio::Waveform;
use manas_core::capability::{
    Answer, AudioGenerator, IntentClassifier, IntentScores, QuestionAnswerer, SpeechRecognizer,
    SpeechSynthesizer, TextGenerator,
};
use manas_core::chat::ChatTurn;
use manas_core::config::ServerConfig;
use manas_core::geo::{Place, PlaceFinder};
use manas_core::{Error, ModelRegistry, Result};
use manas_server::api::create_router;
use manas_server::state::AppState;

// -- Fakes --

#[derive(Default)]
struct FakeLlm {
    calls: AtomicUsize,
    fail: bool,
    reply: String,
    prompts: Mutex<Vec<String>>,
    chats: Mutex<Vec<(Vec<ChatTurn>, String)>>,
}

impl FakeLlm {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            ..Default::default()
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    fn reply(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::LlmError("upstream quota exceeded for key sk-123".to_string()));
        }
        Ok(self.reply.clone())
    }
}

#[async_trait]
impl TextGenerator for FakeLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply()
    }

    async fn chat(&self, history: &[ChatTurn], message: &str) -> Result<String> {
        self.chats
            .lock()
            .unwrap()
            .push((history.to_vec(), message.to_string()));
        self.reply()
    }
}

/// 0.1 s of silence per chunk
#[derive(Default)]
struct FakeTts {
    chunks: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for FakeTts {
    async fn synthesize(&self, text: &str) -> Result<Waveform> {
        self.chunks.lock().unwrap().push(text.to_string());
        Ok(Waveform::silence(1_600, 16_000))
    }
}

#[derive(Default)]
struct FakeAudioGen {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl AudioGenerator for FakeAudioGen {
    async fn generate(&self, prompt: &str) -> Result<Waveform> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(Waveform::silence(3_200, 32_000))
    }
}

#[derive(Default)]
struct FakeStt {
    uploads: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl SpeechRecognizer for FakeStt {
    async fn transcribe(&self, wav_bytes: Vec<u8>) -> Result<String> {
        self.uploads.lock().unwrap().push(wav_bytes);
        Ok("  hello  ".to_string())
    }
}

#[derive(Default)]
struct FakeIntent {
    calls: AtomicUsize,
}

#[async_trait]
impl IntentClassifier for FakeIntent {
    async fn classify(&self, text: &str, candidate_labels: &[String]) -> Result<IntentScores> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(IntentScores {
            sequence: text.to_string(),
            labels: candidate_labels.to_vec(),
            scores: vec![1.0 / candidate_labels.len() as f32; candidate_labels.len()],
        })
    }
}

/// Answers with the first word of the context
struct FakeQa;

#[async_trait]
impl QuestionAnswerer for FakeQa {
    async fn answer(&self, _question: &str, context: &str) -> Result<Answer> {
        let answer = context.split_whitespace().next().unwrap_or_default();
        Ok(Answer {
            answer: answer.to_string(),
            score: 0.9,
            start: 0,
            end: answer.len(),
        })
    }
}

#[derive(Default)]
struct FakePlaces {
    calls: AtomicUsize,
}

#[async_trait]
impl PlaceFinder for FakePlaces {
    async fn nearby(&self, _latitude: f64, _longitude: f64) -> Result<Vec<Place>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Place {
            name: "Central Library".to_string(),
            kind: "Library".to_string(),
            vicinity: "Nearby".to_string(),
        }])
    }
}

// -- Helpers --

fn app(registry: ModelRegistry) -> Router {
    app_with_places(registry, Arc::new(FakePlaces::default()))
}

fn app_with_places(registry: ModelRegistry, places: Arc<FakePlaces>) -> Router {
    create_router(AppState::new(registry, places), &ServerConfig::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, body)
}

fn json_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap()
}

fn wav_bytes(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buffer = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
        for sample in samples {
            writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    buffer
}

fn wav_spec_and_len(bytes: &[u8]) -> (hound::WavSpec, u32) {
    let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    (reader.spec(), reader.len())
}

fn multipart_upload(field: &str, data: &[u8]) -> Request<Body> {
    let boundary = "manas-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"clip.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/transcribe")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// -- Tests --

#[tokio::test]
async fn health_reports_capabilities() {
    let registry = ModelRegistry::empty().with_llm(FakeLlm::replying("hi"));
    let request = Request::get("/api/health").body(Body::empty()).unwrap();

    let (status, _, body) = send(app(registry), request).await;
    let body = json_body(&body);

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["capabilities"]["llm"], true);
    assert_eq!(body["capabilities"]["tts"], false);
}

#[tokio::test]
async fn missing_field_is_client_error_without_llm_call() {
    let llm = FakeLlm::replying("unused");
    let registry = ModelRegistry::empty().with_llm(llm.clone());

    let (status, _, body) = send(
        app(registry.clone()),
        post_json("/api/generate-meditation", json!({ "topic": "sleep" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["type"], "invalid_request_error");

    let (status, _, _) = send(
        app(registry),
        post_json("/api/generate-soundscape", json!({ "word": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn absent_model_is_service_unavailable() {
    let (status, _, body) = send(
        app(ModelRegistry::empty()),
        post_json("/api/generate-poem", json!({ "prompt": "rain" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(&body);
    assert_eq!(body["detail"], "Gemini model not loaded.");
    assert_eq!(body["error"]["message"], "Gemini model not loaded.");
    assert_eq!(body["error"]["code"], 503);

    let (status, _, body) = send(
        app(ModelRegistry::empty()),
        post_json("/api/text-to-speech", json!({ "text": "Hello." })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(&body)["error"]["message"], "TTS model not loaded.");
}

#[tokio::test]
async fn llm_failure_hides_detail() {
    let registry = ModelRegistry::empty().with_llm(FakeLlm::failing());

    let (status, _, body) = send(
        app(registry),
        post_json("/api/coach-goal", json!({ "goal": "sleep earlier" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(&body);
    assert_eq!(body["detail"], "Failed to create a plan.");
    let message = body["error"]["message"].as_str().unwrap().to_string();
    assert_eq!(message, "Failed to create a plan.");
    assert!(!body.to_string().contains("sk-123"));
}

#[tokio::test]
async fn soundscape_failure_exposes_public_detail() {
    let audio = Arc::new(FakeAudioGen::default());
    let registry = ModelRegistry::empty()
        .with_llm(FakeLlm::failing())
        .with_audio_gen(audio.clone());

    let (status, _, body) = send(
        app(registry),
        post_json("/api/generate-soundscape", json!({ "word": "forest" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(&body);
    assert_eq!(body["detail"], "The cave's echoes are silent right now.");
    assert_eq!(body["error"]["type"], "server_error");
    assert!(audio.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn chat_sends_earlier_turns_as_context() {
    let llm = FakeLlm::replying("I'm here for you.");
    let registry = ModelRegistry::empty().with_llm(llm.clone());

    let history = json!({ "history": [
        { "role": "user", "parts": [{ "text": "I feel tired" }] },
        { "role": "model", "parts": [{ "text": "That sounds hard." }] },
        { "role": "user", "parts": [] },
        { "role": "user", "parts": [{ "text": "What can I do?" }] }
    ]});
    let (status, _, body) = send(app(registry), post_json("/api/chat", history)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["text"], "I'm here for you.");

    let chats = llm.chats.lock().unwrap();
    assert_eq!(chats.len(), 1);
    let (context, message) = &chats[0];
    assert_eq!(
        context,
        &vec![
            ChatTurn::user("I feel tired"),
            ChatTurn::model("That sounds hard.")
        ]
    );
    assert_eq!(message, "What can I do?");
}

#[tokio::test]
async fn chat_without_messages_is_client_error() {
    let llm = FakeLlm::replying("unused");
    let registry = ModelRegistry::empty().with_llm(llm.clone());

    let history = json!({ "history": [{ "role": "user", "parts": [{}] }] });
    let (status, _, _) = send(app(registry), post_json("/api/chat", history)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn summarize_renders_transcript() {
    let llm = FakeLlm::replying("You expressed tiredness.");
    let registry = ModelRegistry::empty().with_llm(llm.clone());

    let history = json!({ "history": [
        { "role": "user", "parts": [{ "text": "I feel tired" }] },
        { "role": "model", "parts": [{ "text": "Rest helps." }] }
    ]});
    let (status, _, body) = send(app(registry), post_json("/api/summarize-chat", history)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["summary"], "You expressed tiredness.");
    let prompts = llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("user: I feel tired\nManas: Rest helps."));
}

#[tokio::test]
async fn soundscape_calls_llm_then_audio_model_once() {
    let llm = FakeLlm::replying("  Soft rain on leaves,\ndistant chimes  ");
    let generator = Arc::new(FakeAudioGen::default());
    let registry = ModelRegistry::empty()
        .with_llm(llm.clone())
        .with_audio_gen(generator.clone());

    let (status, content_type, body) = send(
        app(registry),
        post_json("/api/generate-soundscape", json!({ "word": "Peace" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/wav"));
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    assert!(llm.prompts.lock().unwrap()[0].contains("'Peace'"));
    assert_eq!(
        *generator.prompts.lock().unwrap(),
        vec!["Soft rain on leaves, distant chimes".to_string()]
    );

    let (spec, len) = wav_spec_and_len(&body);
    assert_eq!(spec.sample_rate, 32_000);
    assert_eq!(len, 3_200);
}

#[tokio::test]
async fn soundscape_needs_both_models() {
    let llm = FakeLlm::replying("unused");
    let registry = ModelRegistry::empty().with_llm(llm.clone());

    let (status, _, body) = send(
        app(registry),
        post_json("/api/generate-soundscape", json!({ "word": "Peace" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        json_body(&body)["error"]["message"],
        "Audio generation model not loaded."
    );
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tts_concatenates_sentence_chunks() {
    let tts = Arc::new(FakeTts::default());
    let registry = ModelRegistry::empty().with_tts(tts.clone());

    let (status, content_type, body) = send(
        app(registry),
        post_json(
            "/api/text-to-speech",
            json!({ "text": "Breathe in slowly. Now breathe out!\nWell done." }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/wav"));
    assert_eq!(
        *tts.chunks.lock().unwrap(),
        vec!["Breathe in slowly.", "Now breathe out!", "Well done."]
    );

    let (spec, len) = wav_spec_and_len(&body);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.channels, 1);
    assert_eq!(len, 3 * 1_600);
}

#[tokio::test]
async fn transcribe_normalizes_upload_to_16khz() {
    let stt = Arc::new(FakeStt::default());
    let registry = ModelRegistry::empty().with_stt(stt.clone());
    let upload = wav_bytes(&[0.0; 8_000], 8_000);

    let (status, _, body) = send(app(registry), multipart_upload("audio_file", &upload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["text"], "hello");

    let uploads = stt.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    let (spec, len) = wav_spec_and_len(&uploads[0]);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert!((15_000..=17_000).contains(&len));
}

#[tokio::test]
async fn transcribe_without_file_is_client_error() {
    let stt = Arc::new(FakeStt::default());
    let registry = ModelRegistry::empty().with_stt(stt.clone());

    let (status, _, _) = send(app(registry), multipart_upload("other_field", b"data")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(stt.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn transcribe_rejects_oversized_upload() {
    let stt = Arc::new(FakeStt::default());
    let registry = ModelRegistry::empty().with_stt(stt.clone());
    let upload = vec![0u8; 26 * 1024 * 1024];

    let (status, _, body) = send(app(registry), multipart_upload("audio_file", &upload)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(&body)["error"]["code"], 413);
    assert!(stt.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn analyze_intent_requires_labels() {
    let intent = Arc::new(FakeIntent::default());
    let registry = ModelRegistry::empty().with_intent(intent.clone());

    let (status, _, _) = send(
        app(registry.clone()),
        post_json(
            "/api/analyze-intent",
            json!({ "text": "I can't sleep", "candidate_labels": [] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(intent.calls.load(Ordering::SeqCst), 0);

    let (status, _, body) = send(
        app(registry),
        post_json(
            "/api/analyze-intent",
            json!({ "text": "I can't sleep", "candidate_labels": ["sleep", "stress"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["sequence"], "I can't sleep");
    assert_eq!(body["labels"], json!(["sleep", "stress"]));
}

#[tokio::test]
async fn qa_returns_answer_span() {
    let registry = ModelRegistry::empty().with_qa(Arc::new(FakeQa));

    let (status, _, _) = send(
        app(registry.clone()),
        post_json("/api/qa", json!({ "context": "Walking helps.", "question": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(
        app(registry),
        post_json(
            "/api/qa",
            json!({ "context": "Walking helps.", "question": "What helps?" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["answer"], "Walking");
    assert_eq!(body["start"], 0);
    assert_eq!(body["end"], 7);
}

#[tokio::test]
async fn riddle_is_trimmed() {
    let registry =
        ModelRegistry::empty().with_llm(FakeLlm::replying("\n  What bends but never breaks?  \n"));

    let (status, _, body) = send(
        app(registry),
        post_json("/api/get-wisdom-riddle", json!({ "question": "How do I cope?" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["riddle"], "What bends but never breaks?");
}

#[tokio::test]
async fn detox_endpoints() {
    let llm = FakeLlm::replying(" Welcome back. ");
    let registry = ModelRegistry::empty().with_llm(llm.clone());

    let (status, _, body) = send(
        app(registry.clone()),
        post_json(
            "/api/generate-detox-pledge",
            json!({ "name": "Asha", "duration": "2 hours" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["pledge"], "Welcome back.");
    assert!(llm.prompts.lock().unwrap()[0].contains("2 hours"));

    let request = Request::get("/api/generate-detox-completion")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(registry), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["message"], "Welcome back.");
    assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn safe_zones_validates_coordinates() {
    let places = Arc::new(FakePlaces::default());

    let (status, _, _) = send(
        app_with_places(ModelRegistry::empty(), places.clone()),
        post_json("/api/safe-zones", json!({ "latitude": 120.0, "longitude": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(places.calls.load(Ordering::SeqCst), 0);

    let (status, _, body) = send(
        app_with_places(ModelRegistry::empty(), places.clone()),
        post_json("/api/safe-zones", json!({ "latitude": 51.5, "longitude": -0.12 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body)["places"],
        json!([{ "name": "Central Library", "type": "Library", "vicinity": "Nearby" }])
    );
    assert_eq!(places.calls.load(Ordering::SeqCst), 1);
}
